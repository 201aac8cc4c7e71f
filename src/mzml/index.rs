//! Identifier → byte offset index built from the indexed-mzML trailer.
//!
//! The trailer lists one `<offset idRef="...">` tag per spectrum in file
//! order. Any capture of the file that runs from some byte up to end-of-file
//! therefore contains an unbroken run of trailer tags ending at the last
//! spectrum. The index records the lowest identifier of that run as its
//! coverage start: for every key at or above it, the next known key is the
//! true next record.

use memchr::memmem;
use regex::bytes::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::warn;

use super::span::{RecordId, RecordSpan};
use crate::config::Markers;
use crate::error::{Error, Result};

fn offset_tag() -> &'static Regex {
    static OFFSET_TAG: OnceLock<Regex> = OnceLock::new();
    OFFSET_TAG.get_or_init(|| {
        // The lazy prefix leaves the rightmost digit run for the identifier.
        Regex::new(r#"(?-u)<offset idRef="[^"]*?(\d+)">(\d+)</offset>"#)
            .expect("offset tag pattern is valid")
    })
}

/// Extract every `(identifier, offset)` pair from trailer bytes, in file order.
///
/// Tags after `stop_marker` (the chromatogram index) are ignored. Values that
/// do not fit in a `u64` are dropped.
pub fn parse_trailer(text: &[u8], stop_marker: Option<&str>) -> Vec<(u64, u64)> {
    let text = match stop_marker.and_then(|m| memmem::find(text, m.as_bytes())) {
        Some(pos) => &text[..pos],
        None => text,
    };

    offset_tag()
        .captures_iter(text)
        .filter_map(|caps| {
            let id = parse_digits(&caps[1])?;
            let offset = parse_digits(&caps[2])?;
            Some((id, offset))
        })
        .collect()
}

/// The part of a trailer capture that can only hold spectrum offsets.
///
/// With the chromatogram index opening tag in view, everything before it is
/// spectrum index. With only the spectrum index opening tag in view there is
/// no chromatogram index, so everything after it counts. With neither, the
/// tags in view may belong to either index and nothing is returned until the
/// capture is complete.
pub fn spectrum_section<'t>(text: &'t [u8], markers: &Markers, complete: bool) -> Option<&'t [u8]> {
    let spectrum = memmem::find(text, markers.spectrum_index.as_bytes());
    let chromatogram = memmem::find(text, markers.chromatogram_index.as_bytes());
    match (spectrum, chromatogram) {
        (Some(s), Some(c)) if s > c => Some(&text[s..]),
        (s, Some(c)) => Some(&text[s.unwrap_or(0)..c]),
        (Some(s), None) => Some(&text[s..]),
        (None, None) => complete.then_some(text),
    }
}

fn parse_digits(digits: &[u8]) -> Option<u64> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Offset index for one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetIndex {
    offsets: BTreeMap<u64, u64>,
    total_size: u64,
    coverage_start: Option<u64>,
    complete: bool,
}

impl OffsetIndex {
    pub fn new(total_size: u64) -> Self {
        Self {
            offsets: BTreeMap::new(),
            total_size,
            coverage_start: None,
            complete: false,
        }
    }

    /// Absorb pairs parsed from a capture that ends at end-of-file.
    ///
    /// `complete` is set when the capture provably holds the whole trailer.
    /// Offsets already known win over new ones for the same identifier.
    pub fn absorb_tail(&mut self, pairs: &[(u64, u64)], complete: bool) {
        self.insert_all(pairs);
        if let Some(low) = pairs.iter().map(|&(id, _)| id).min() {
            self.coverage_start = Some(self.coverage_start.map_or(low, |c| c.min(low)));
        }
        if complete {
            self.complete = true;
            self.coverage_start = self.min_id();
        }
    }

    /// Absorb pairs from a capture with no proven relation to end-of-file.
    ///
    /// The keys become known, but coverage does not grow.
    pub fn absorb_fragment(&mut self, pairs: &[(u64, u64)]) {
        self.insert_all(pairs);
    }

    fn insert_all(&mut self, pairs: &[(u64, u64)]) {
        for &(id, offset) in pairs {
            let known = *self.offsets.entry(id).or_insert(offset);
            if known != offset {
                warn!(id, known, offset, "conflicting offsets for scan, keeping first");
            }
        }
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn min_id(&self) -> Option<u64> {
        self.offsets.keys().next().copied()
    }

    pub fn max_id(&self) -> Option<u64> {
        self.offsets.keys().next_back().copied()
    }

    pub fn coverage_start(&self) -> Option<u64> {
        self.coverage_start
    }

    /// Whether the whole trailer has been captured.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn contains(&self, id: u64) -> bool {
        self.offsets.contains_key(&id)
    }

    pub fn offset(&self, id: u64) -> Option<u64> {
        self.offsets.get(&id).copied()
    }

    pub fn offsets(&self) -> &BTreeMap<u64, u64> {
        &self.offsets
    }

    /// Smallest known identifier strictly greater than `id`, with its offset.
    pub fn next_after(&self, id: u64) -> Option<(u64, u64)> {
        self.offsets
            .range(id.saturating_add(1)..)
            .next()
            .map(|(&k, &v)| (k, v))
            .filter(|&(k, _)| k > id)
    }

    /// Whether every record at or above `id` in the file is known, so that an
    /// absent `id` does not exist.
    pub fn covers(&self, id: u64) -> bool {
        self.complete || self.coverage_start.is_some_and(|c| id >= c)
    }

    /// Whether offsets strictly increase with the identifier.
    pub fn is_monotonic(&self) -> bool {
        self.offsets
            .values()
            .zip(self.offsets.values().skip(1))
            .all(|(a, b)| a < b)
    }

    /// Whether `self` should replace `cached` in a session cache.
    ///
    /// Lower coverage start wins; at equal coverage only a complete index
    /// may replace an incomplete one.
    pub fn supersedes(&self, cached: &OffsetIndex) -> bool {
        match (self.coverage_start, cached.coverage_start) {
            (Some(_), None) => true,
            (None, _) => false,
            (Some(fresh), Some(old)) if fresh < old => true,
            (Some(fresh), Some(old)) if fresh == old => self.complete && !cached.complete,
            _ => false,
        }
    }

    /// Compute the byte span holding exactly one record.
    ///
    /// `margin` is subtracted from the next record's offset so the span stops
    /// short of its opening marker.
    pub fn locate(&self, id: RecordId, margin: u64) -> Result<RecordSpan> {
        let id = id.get();
        let (Some(min), Some(max)) = (self.min_id(), self.max_id()) else {
            return Err(Error::UnknownIdentifier { id });
        };
        if id < min || id > max {
            return Err(Error::UnknownIdentifier { id });
        }
        let start = self.offset(id).ok_or(Error::UnknownIdentifier { id })?;

        if !self.covers(id) {
            return Err(Error::InsufficientCoverage {
                id,
                coverage_start: self.coverage_start,
            });
        }

        let span = match self.next_after(id) {
            Some((_, next_offset)) => {
                let end = next_offset.saturating_sub(margin.max(1)).max(start);
                RecordSpan::bounded(id, start, end)
            }
            None => RecordSpan::to_end_of_file(id, start, self.total_size.saturating_sub(1)),
        };
        Ok(span)
    }
}
