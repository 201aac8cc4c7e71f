use memchr::memmem;

/// Cut `bytes` right after the last occurrence of `record_end`.
///
/// Used for the last record, whose range runs to end-of-file and so carries
/// the index list and footer. Without the marker the bytes are returned
/// untouched and the decoder gets to fail on them.
pub fn repair_tail(mut bytes: Vec<u8>, record_end: &str) -> Vec<u8> {
    if let Some(pos) = memmem::rfind(&bytes, record_end.as_bytes()) {
        bytes.truncate(pos + record_end.len());
    }
    bytes
}
