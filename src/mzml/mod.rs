//! Offset-index discovery and record location for indexed mzML.
//!
//! ## Architecture
//!
//! - [`locator`]: backward probing for the trailer, full or targeted
//! - [`index`]: trailer parsing and the identifier → offset index
//! - [`span`]: scan identifiers and the byte span of one record
//! - [`repair`]: trimming the footer off the last record
//!
//! ## Indexed mzML layout
//!
//! ```text
//! <indexedmzML>
//!   <mzML> ... <spectrum>..</spectrum> <spectrum>..</spectrum> ... </mzML>
//!   <indexList>
//!     <index name="spectrum"> <offset idRef="... scan=N">BYTE</offset> ... </index>
//!     <index name="chromatogram"> ... </index>
//!   </indexList>
//!   <indexListOffset>..</indexListOffset>
//! </indexedmzML>
//! ```
//!
//! Everything needed to address one spectrum sits after `</mzML>`, so only the
//! tail of the file has to be read before the spectrum itself.

mod index;
mod locator;
mod repair;
mod span;

pub use index::{OffsetIndex, parse_trailer, spectrum_section};
pub use locator::{Discovery, DiscoveryMode, DiscoveryOutcome, TrailerLocator};
pub use repair::repair_tail;
pub use span::{RecordId, RecordSpan};
