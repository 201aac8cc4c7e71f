//! # mzrange
//!
//! Random access to single spectra inside remote indexed mzML files using
//! HTTP Range requests.
//!
//! An indexed mzML file ends with a list of byte offsets, one per spectrum.
//! This crate reads only as much of that tail as it needs, keeps the offsets
//! per file for the rest of the session, and then fetches exactly the bytes of
//! the requested spectrum, so a single scan can be pulled out of a
//! multi-gigabyte file with a handful of small requests.
//!
//! ## Features
//!
//! - Targeted trailer discovery (stop once the scan's offset is seen) or full
//!   discovery (capture the whole index once)
//! - Per-file index cache that only ever moves to better coverage
//! - Repair of the last spectrum, whose range runs into the file footer
//! - Zenodo catalog and USI support, plus local directories and files
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mzrange::{HttpRangeFetcher, RepositorySession, SessionConfig, Usi, ZenodoCatalog};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let usi: Usi = "mzspec:ZENODO-10211590:D141_POS.mzML:scan:422".parse()?;
//!     let config = SessionConfig::default();
//!
//!     let catalog = ZenodoCatalog::new(config.request_timeout)?;
//!     let fetcher = Arc::new(HttpRangeFetcher::new(config.request_timeout)?);
//!     let session = RepositorySession::open(&catalog, &usi.repository_id, fetcher, config).await?;
//!
//!     let record = session.fetch_record(&usi.container, usi.scan).await?;
//!     println!("{} bytes of spectrum XML", record.bytes.len());
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod io;
pub mod mzml;
pub mod session;
pub mod usi;

pub use catalog::{Catalog, ContainerFile, LocalCatalog, ZenodoCatalog};
pub use cli::Cli;
pub use config::{IndexingMode, Markers, SessionConfig};
pub use decode::{RecordDecoder, ScalarValue, StructuredRecord};
pub use error::{Error, Result};
pub use io::{HttpRangeFetcher, LocalFileFetcher, MemoryFetcher, RangeFetch, RetryingFetcher};
pub use mzml::{OffsetIndex, RecordId, RecordSpan};
pub use session::{Record, RepositorySession};
pub use usi::Usi;
