//! Universal Spectrum Identifiers for Zenodo-hosted files.
//!
//! `mzspec:ZENODO-10211590:D141_POS.mzML:scan:422` names scan 422 of
//! `D141_POS.mzML` in Zenodo record 10211590. An optional interpretation may
//! follow the scan number and is ignored.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::mzml::RecordId;

const PREFIX: &str = "mzspec:";
const COLLECTION_PREFIX: &str = "ZENODO-";
const SCAN_SEPARATOR: &str = ":scan:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usi {
    pub repository_id: String,
    pub container: String,
    pub scan: RecordId,
}

impl FromStr for Usi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidUsi(s.to_string());

        let rest = s.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let (collection, rest) = rest.split_once(':').ok_or_else(invalid)?;
        let repository_id = collection
            .get(..COLLECTION_PREFIX.len())
            .filter(|p| p.eq_ignore_ascii_case(COLLECTION_PREFIX))
            .map(|_| &collection[COLLECTION_PREFIX.len()..])
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(invalid)?;

        let pos = rest.rfind(SCAN_SEPARATOR).ok_or_else(invalid)?;
        let container = &rest[..pos];
        if container.is_empty() {
            return Err(invalid());
        }
        let index = &rest[pos + SCAN_SEPARATOR.len()..];
        let scan = index.split(':').next().unwrap_or_default();

        Ok(Self {
            repository_id: repository_id.to_string(),
            container: container.to_string(),
            scan: scan.parse()?,
        })
    }
}

impl fmt::Display for Usi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}:{}{}{}",
            PREFIX, COLLECTION_PREFIX, self.repository_id, self.container, SCAN_SEPARATOR, self.scan
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zenodo_usi() {
        let usi: Usi = "mzspec:ZENODO-10211590:D141_POS.mzML:scan:422".parse().unwrap();
        assert_eq!(usi.repository_id, "10211590");
        assert_eq!(usi.container, "D141_POS.mzML");
        assert_eq!(usi.scan, RecordId::new(422));
        assert_eq!(usi.to_string(), "mzspec:ZENODO-10211590:D141_POS.mzML:scan:422");
    }

    #[test]
    fn ignores_interpretation_and_leading_zeros() {
        let usi: Usi = "mzspec:zenodo-1:run.mzML:scan:0042:PEPTIDE/2".parse().unwrap();
        assert_eq!(usi.repository_id, "1");
        assert_eq!(usi.scan, RecordId::new(42));
    }

    #[test]
    fn rejects_other_collections_and_shapes() {
        for bad in [
            "mzspec:PXD000561:run.mzML:scan:1",
            "mzspec:ZENODO-:run.mzML:scan:1",
            "mzspec:ZENODO-12:run.mzML:index:1",
            "mzspec:ZENODO-12::scan:1",
            "usi:ZENODO-12:run.mzML:scan:1",
        ] {
            assert!(matches!(bad.parse::<Usi>(), Err(Error::InvalidUsi(_))), "{bad}");
        }
    }

    #[test]
    fn bad_scan_number_is_an_identifier_error() {
        assert!(matches!(
            "mzspec:ZENODO-12:run.mzML:scan:abc".parse::<Usi>(),
            Err(Error::InvalidIdentifierFormat(_))
        ));
    }
}
