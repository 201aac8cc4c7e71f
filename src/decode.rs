//! Interface to the record-body decoder.
//!
//! Decoding spectrum XML (binary arrays, compression, controlled vocabulary)
//! is left to a dedicated mzML parser. This crate only promises that the bytes
//! handed over start at the record's opening tag and end at or after its
//! closing tag, or exactly at it for the last record.

use std::collections::BTreeMap;

use crate::error::Result;

/// Scalar names the decoder is expected to fill where it can.
pub mod scalars {
    pub const RETENTION_TIME: &str = "rt time";
    pub const CHARGE: &str = "charge";
    pub const COLLISION_ENERGY: &str = "collision energy";
    pub const MS_LEVEL: &str = "ms level";
    pub const PRECURSOR_MZ: &str = "precursor_mz";
}

/// Array names the decoder is expected to fill.
pub mod arrays {
    pub const MZ: &str = "mz";
    pub const INTENSITY: &str = "intensities";
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// A decoded spectrum. Absent scalars are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecord {
    pub arrays: BTreeMap<String, Vec<f64>>,
    pub scalars: BTreeMap<String, Option<ScalarValue>>,
}

impl StructuredRecord {
    pub fn array(&self, name: &str) -> Option<&[f64]> {
        self.arrays.get(name).map(Vec::as_slice)
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarValue> {
        self.scalars.get(name).and_then(Option::as_ref)
    }
}

/// Turns the bytes of one `<spectrum>` element into a [`StructuredRecord`].
pub trait RecordDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<StructuredRecord>;
}
