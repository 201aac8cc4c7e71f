use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Integer scan identifier.
///
/// Parsing accepts leading zeros (`"007"` is scan 7) and nothing else but
/// ASCII digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidIdentifierFormat(s.to_string()));
        }
        let trimmed = s.trim_start_matches('0');
        if trimmed.is_empty() {
            return Ok(Self(0));
        }
        trimmed
            .parse()
            .map(Self)
            .map_err(|_| Error::InvalidIdentifierFormat(s.to_string()))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Inclusive byte range believed to hold exactly one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpan {
    id: u64,
    start: u64,
    end: u64,
    bounded: bool,
}

#[allow(clippy::len_without_is_empty)]
impl RecordSpan {
    /// Span whose end was derived from the next record's offset.
    pub(crate) fn bounded(id: u64, start: u64, end: u64) -> Self {
        Self {
            id,
            start,
            end,
            bounded: true,
        }
    }

    /// Span of the last record, running to the last byte of the file.
    pub(crate) fn to_end_of_file(id: u64, start: u64, end: u64) -> Self {
        Self {
            id,
            start,
            end,
            bounded: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte of the span, inclusive.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered; never zero.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// The fetched bytes carry trailer bytes after the record and must be
    /// repaired.
    pub fn needs_repair(&self) -> bool {
        !self.bounded
    }
}
