//! Error types for index discovery and record retrieval.
//!
//! | Category | Errors |
//! |----------|--------|
//! | Transport | [`Transport`], [`HttpStatus`], [`ShortRead`], [`Io`] |
//! | Index | [`EmptyIndex`], [`IdentifierNotFound`], [`InsufficientCoverage`] |
//! | Lookup | [`UnknownIdentifier`], [`InvalidIdentifierFormat`], [`ContainerNotFound`] |
//!
//! None of these are retried or recovered from inside the crate. A caller that
//! wants resilience wraps its fetcher in [`RetryingFetcher`](crate::RetryingFetcher),
//! and a caller that hits [`InsufficientCoverage`] can rebuild with
//! [`RepositorySession::build_full_index`](crate::RepositorySession::build_full_index).
//!
//! [`Transport`]: Error::Transport
//! [`HttpStatus`]: Error::HttpStatus
//! [`ShortRead`]: Error::ShortRead
//! [`Io`]: Error::Io
//! [`EmptyIndex`]: Error::EmptyIndex
//! [`IdentifierNotFound`]: Error::IdentifierNotFound
//! [`InsufficientCoverage`]: Error::InsufficientCoverage
//! [`UnknownIdentifier`]: Error::UnknownIdentifier
//! [`InvalidIdentifierFormat`]: Error::InvalidIdentifierFormat
//! [`ContainerNotFound`]: Error::ContainerNotFound

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status other than the one expected.
    #[error("HTTP request to {url} failed with status: {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The server stopped sending bytes before the requested range was complete.
    #[error("short read from {url}: expected {expected} bytes, received {received}")]
    ShortRead {
        url: String,
        expected: u64,
        received: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Discovery finished but the trailer yielded no offset pairs.
    #[error("no spectrum offsets found in the index of {container}")]
    EmptyIndex { container: String },

    /// Targeted discovery captured the whole trailer without seeing the identifier.
    #[error("scan {id} not found in {container}")]
    IdentifierNotFound { container: String, id: u64 },

    /// The identifier is absent from the index it was looked up in.
    #[error("scan {id} is not in the index")]
    UnknownIdentifier { id: u64 },

    #[error("not a valid scan number: {0:?}")]
    InvalidIdentifierFormat(String),

    /// The index cannot prove which record follows `id`.
    #[error("index coverage starts at {coverage_start:?}; cannot bound scan {id}")]
    InsufficientCoverage {
        id: u64,
        coverage_start: Option<u64>,
    },

    #[error("container {0:?} not found in the repository")]
    ContainerNotFound(String),

    #[error("invalid byte range {start}-{end} for a container of {size} bytes")]
    InvalidRange { start: u64, end: u64, size: u64 },

    #[error("byte range {start}-{end} ends before it starts")]
    ReversedRange { start: u64, end: u64 },

    #[error("malformed catalog response from {url}: {source}")]
    Catalog {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid USI {0:?}")]
    InvalidUsi(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to decode record: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether the error came from moving bytes rather than from their content.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::HttpStatus { .. }
                | Error::ShortRead { .. }
                | Error::Io(_)
        )
    }

    /// Transport failures worth another attempt: timeouts, refused connections
    /// and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Error::HttpStatus { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            Error::ShortRead { .. } => true,
            _ => false,
        }
    }
}
