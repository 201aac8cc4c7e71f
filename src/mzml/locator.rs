//! Backward probing for the trailer of an indexed mzML file.
//!
//! The trailer's size is not known up front. The locator fetches a window at
//! the end of the file and widens it toward the start one window at a time,
//! prepending each new slice to what it already holds, until:
//!
//! - full mode: the `</mzML>` marker is captured, so the whole index list
//!   that follows it is in hand;
//! - targeted mode: the requested scan shows up in the parsed offsets, or the
//!   marker is captured without it (the scan does not exist).
//!
//! Reaching byte 0 also ends the search, since the whole file is then held.
//!
//! Every step rebuilds the index from the whole capture. Tags seen before the
//! capture reached an index opening tag are never trusted on their own, as
//! they may belong to the chromatogram index.

use memchr::memmem;
use tracing::{debug, info, warn};

use super::index::{OffsetIndex, parse_trailer, spectrum_section};
use crate::catalog::ContainerFile;
use crate::config::{Markers, SessionConfig};
use crate::error::{Error, Result};
use crate::io::{RangeFetch, fetch_clamped};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Capture the whole trailer.
    Full,
    /// Stop as soon as this scan's offset is known.
    Targeted(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Found,
    Exhausted,
}

/// State between two fetches.
enum Probe {
    Probing,
    Found,
    Exhausted,
}

/// Result of one discovery pass.
#[derive(Debug)]
pub struct Discovery {
    pub index: OffsetIndex,
    pub mode: DiscoveryMode,
    pub outcome: DiscoveryOutcome,
    /// Range requests issued, including the first window.
    pub fetches: usize,
    /// First byte of the final capture.
    pub window_start: u64,
}

impl Discovery {
    /// `IdentifierNotFound` if targeted discovery came up empty.
    pub fn ensure_found(&self, container: &str) -> Result<()> {
        match (self.outcome, self.mode) {
            (DiscoveryOutcome::Exhausted, DiscoveryMode::Targeted(id)) => {
                Err(Error::IdentifierNotFound {
                    container: container.to_string(),
                    id,
                })
            }
            _ => Ok(()),
        }
    }
}

pub struct TrailerLocator<'a, F: RangeFetch + ?Sized> {
    fetcher: &'a F,
    window_size: u64,
    markers: &'a Markers,
}

impl<'a, F: RangeFetch + ?Sized> TrailerLocator<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a SessionConfig) -> Self {
        Self {
            fetcher,
            window_size: config.window_size.max(1),
            markers: &config.markers,
        }
    }

    pub async fn discover(&self, container: &ContainerFile, mode: DiscoveryMode) -> Result<Discovery> {
        let size = container.size;
        if size == 0 {
            return Err(Error::EmptyIndex {
                container: container.name.clone(),
            });
        }

        let end = size - 1;
        let mut start = size.saturating_sub(self.window_size);
        let mut captured = fetch_clamped(self.fetcher, &container.url, size, start, end).await?;
        let mut fetches = 1;
        let mut index = OffsetIndex::new(size);

        let outcome = loop {
            let complete = start == 0
                || memmem::find(&captured, self.markers.trailer_start.as_bytes()).is_some();

            match self.probe(&captured, complete, mode, &mut index) {
                Probe::Found => break DiscoveryOutcome::Found,
                Probe::Exhausted => break DiscoveryOutcome::Exhausted,
                Probe::Probing => {}
            }

            let next_start = start.saturating_sub(self.window_size);
            debug!(
                container = %container.name,
                from = next_start,
                to = start - 1,
                known = index.len(),
                "widening trailer window"
            );
            let mut widened =
                fetch_clamped(self.fetcher, &container.url, size, next_start, start - 1).await?;
            widened.extend_from_slice(&captured);
            captured = widened;
            start = next_start;
            fetches += 1;
        };

        if index.is_empty() {
            return Err(Error::EmptyIndex {
                container: container.name.clone(),
            });
        }
        if !index.is_monotonic() {
            warn!(container = %container.name, "offsets do not increase with scan number");
        }

        info!(
            container = %container.name,
            scans = index.len(),
            min = ?index.min_id(),
            max = ?index.max_id(),
            complete = index.is_complete(),
            fetches,
            "trailer discovery finished"
        );

        Ok(Discovery {
            index,
            mode,
            outcome,
            fetches,
            window_start: start,
        })
    }

    fn probe(
        &self,
        captured: &[u8],
        complete: bool,
        mode: DiscoveryMode,
        index: &mut OffsetIndex,
    ) -> Probe {
        match mode {
            DiscoveryMode::Full if !complete => Probe::Probing,
            DiscoveryMode::Full => {
                *index = self.index_capture(captured, true, index.total_size());
                Probe::Found
            }
            DiscoveryMode::Targeted(id) => {
                *index = self.index_capture(captured, complete, index.total_size());
                if index.contains(id) {
                    Probe::Found
                } else if complete {
                    Probe::Exhausted
                } else {
                    Probe::Probing
                }
            }
        }
    }

    fn index_capture(&self, captured: &[u8], complete: bool, size: u64) -> OffsetIndex {
        let mut index = OffsetIndex::new(size);
        if let Some(section) = spectrum_section(captured, self.markers, complete) {
            index.absorb_tail(&parse_trailer(section, None), complete);
        }
        index
    }
}
