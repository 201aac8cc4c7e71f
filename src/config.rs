//! Session configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default width of one backward probe into the trailer.
pub const DEFAULT_WINDOW_SIZE: u64 = 250_000;

/// Bytes left between the end of a span and the start of the next record.
pub const DEFAULT_BOUNDARY_MARGIN: u64 = 10;

/// Default per-request timeout, same as the HTTP reader has always used.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How much of the trailer to capture when a container is first touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexingMode {
    /// Widen only until the requested scan shows up.
    #[default]
    Targeted,
    /// Capture the whole trailer before answering anything.
    Full,
}

/// Textual markers the locator and repairer look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Closes the mzML element; the index list follows it.
    pub trailer_start: String,
    /// Closes one record.
    pub record_end: String,
    /// Opens the spectrum index.
    pub spectrum_index: String,
    /// Opens the chromatogram index, which follows the spectrum index.
    pub chromatogram_index: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            trailer_start: "</mzML>".to_string(),
            record_end: "</spectrum>".to_string(),
            spectrum_index: "<index name=\"spectrum\"".to_string(),
            chromatogram_index: "<index name=\"chromatogram\"".to_string(),
        }
    }
}

/// Tunables for a [`RepositorySession`](crate::RepositorySession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub window_size: u64,
    pub boundary_margin: u64,
    pub indexing: IndexingMode,
    pub markers: Markers,
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            boundary_margin: DEFAULT_BOUNDARY_MARGIN,
            indexing: IndexingMode::default(),
            markers: Markers::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn with_window_size(mut self, window_size: u64) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_boundary_margin(mut self, margin: u64) -> Self {
        self.boundary_margin = margin;
        self
    }

    pub fn with_indexing(mut self, indexing: IndexingMode) -> Self {
        self.indexing = indexing;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("window size must be positive".into()));
        }
        if self.boundary_margin == 0 {
            // A span must end before the next record's first byte.
            return Err(Error::InvalidConfig("boundary margin must be at least 1".into()));
        }
        let markers = &self.markers;
        if [
            &markers.trailer_start,
            &markers.record_end,
            &markers.spectrum_index,
            &markers.chromatogram_index,
        ]
        .iter()
        .any(|m| m.is_empty())
        {
            return Err(Error::InvalidConfig("markers must not be empty".into()));
        }
        Ok(())
    }
}
