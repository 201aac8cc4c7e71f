//! Synthetic indexed mzML files for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

pub struct BuiltContainer {
    pub bytes: Vec<u8>,
    pub offsets: BTreeMap<u64, u64>,
}

impl BuiltContainer {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Bytes of one spectrum, from `<spectrum` through `</spectrum>`.
    pub fn spectrum(&self, scan: u64) -> &[u8] {
        let start = self.offsets[&scan] as usize;
        let tail = &self.bytes[start..];
        let end = memchr::memmem::find(tail, b"</spectrum>").unwrap() + "</spectrum>".len();
        &tail[..end]
    }
}

/// Build an indexed mzML file holding `scans` in order, each spectrum padded
/// with roughly `filler` bytes.
pub fn build_mzml(scans: &[u64], filler: usize) -> BuiltContainer {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<indexedmzML xmlns=\"http://psi.hupo.org/ms/mzml\">\n");
    out.push_str("  <mzML>\n    <run id=\"run\">\n");
    out.push_str(&format!("      <spectrumList count=\"{}\">\n", scans.len()));

    let mut offsets = BTreeMap::new();
    for (i, scan) in scans.iter().enumerate() {
        out.push_str("        ");
        offsets.insert(*scan, out.len() as u64);
        out.push_str(&format!(
            "<spectrum index=\"{i}\" id=\"controllerType=0 controllerNumber=1 scan={scan}\" defaultArrayLength=\"0\">\n"
        ));
        out.push_str("          <cvParam name=\"ms level\" value=\"2\"/>\n");
        out.push_str(&format!("          <userParam value=\"{}\"/>\n", "x".repeat(filler)));
        out.push_str("        </spectrum>\n");
    }
    out.push_str("      </spectrumList>\n    </run>\n  </mzML>\n");

    let index_list_offset = out.len();
    out.push_str("  <indexList count=\"2\">\n    <index name=\"spectrum\">\n");
    for (scan, offset) in &offsets {
        out.push_str(&format!(
            "      <offset idRef=\"controllerType=0 controllerNumber=1 scan={scan}\">{offset}</offset>\n"
        ));
    }
    out.push_str("    </index>\n    <index name=\"chromatogram\">\n");
    out.push_str("      <offset idRef=\"TIC\">0</offset>\n");
    out.push_str("      <offset idRef=\"SRM SIC 1000000\">1</offset>\n");
    out.push_str("    </index>\n  </indexList>\n");
    out.push_str(&format!("  <indexListOffset>{index_list_offset}</indexListOffset>\n"));
    out.push_str("  <fileChecksum>0000000000000000000000000000000000000000</fileChecksum>\n");
    out.push_str("</indexedmzML>\n");

    BuiltContainer {
        bytes: out.into_bytes(),
        offsets,
    }
}

/// A file of exactly `size` bytes whose trailer text is `trailer`, placed so
/// that it starts `trailer_span` bytes before the end (whitespace around it).
pub fn pad_trailer(trailer: &str, size: usize, trailer_span: usize) -> Vec<u8> {
    assert!(trailer.len() <= trailer_span && trailer_span <= size);
    let mut bytes = vec![b' '; size - trailer_span];
    bytes.extend_from_slice(trailer.as_bytes());
    bytes.resize(size, b' ');
    bytes
}

/// `</mzML>` followed by a spectrum index with short idRefs.
pub fn trailer_text(pairs: &[(u64, u64)]) -> String {
    let mut text = String::from("</mzML>\n<indexList count=\"1\">\n<index name=\"spectrum\">\n");
    for (id, offset) in pairs {
        text.push_str(&format!("<offset idRef=\"scan={id}\">{offset}</offset>\n"));
    }
    text.push_str("</index>\n</indexList>\n");
    text
}
