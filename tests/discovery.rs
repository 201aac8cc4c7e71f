mod common;

use common::{build_mzml, pad_trailer, trailer_text};
use mzrange::mzml::{DiscoveryMode, DiscoveryOutcome, TrailerLocator};
use mzrange::{ContainerFile, Error, MemoryFetcher, RecordId, SessionConfig};

const URL: &str = "mem://scenario.mzML";
const MB: usize = 1_000_000;

fn container(size: u64) -> ContainerFile {
    ContainerFile {
        name: "scenario.mzML".into(),
        size,
        url: URL.into(),
    }
}

/// Offsets 1 → 500, 2 → 900, ..., 500 → 998000.
fn scenario_pairs() -> Vec<(u64, u64)> {
    let mut pairs = vec![(1, 500), (2, 900)];
    pairs.extend((3..500).map(|k| (k, 900 + (k - 2) * 2000)));
    pairs.push((500, 998_000));
    pairs
}

/// Scans 1..=8000, trailer starting 600,000 bytes before the end of a 1 MB file.
fn wide_trailer_file(pairs: &[(u64, u64)], with_marker: bool) -> Vec<u8> {
    let mut text = trailer_text(pairs);
    if !with_marker {
        text = text.replace("</mzML>", "");
    }
    pad_trailer(&text, MB, 600_000)
}

fn wide_pairs(from: u64) -> Vec<(u64, u64)> {
    (from..=8000).map(|k| (k, k * 40)).collect()
}

#[tokio::test]
async fn full_discovery_within_one_window() {
    let fetcher = MemoryFetcher::new().with_container(URL, pad_trailer(&trailer_text(&scenario_pairs()), MB, 200_000));
    let config = SessionConfig::default();

    let discovery = TrailerLocator::new(&fetcher, &config)
        .discover(&container(MB as u64), DiscoveryMode::Full)
        .await
        .unwrap();
    let index = discovery.index;

    assert_eq!(discovery.fetches, 1);
    assert_eq!(index.min_id(), Some(1));
    assert_eq!(index.max_id(), Some(500));
    assert!(index.is_monotonic());

    let span = index.locate(RecordId::new(250), config.boundary_margin).unwrap();
    assert_eq!(span.start(), index.offset(250).unwrap());
    assert_eq!(span.end(), index.offset(251).unwrap() - 10);
}

#[tokio::test]
async fn full_discovery_widens_three_times_for_a_large_trailer() {
    let fetcher = MemoryFetcher::new().with_container(URL, wide_trailer_file(&wide_pairs(1), true));
    let config = SessionConfig::default();

    let discovery = TrailerLocator::new(&fetcher, &config)
        .discover(&container(MB as u64), DiscoveryMode::Full)
        .await
        .unwrap();

    assert_eq!(discovery.fetches, 3);
    assert_eq!(discovery.window_start, 250_000);
    assert_eq!(discovery.index.len(), 8000);
    assert!(discovery.index.is_complete());
    let ranges: Vec<_> = fetcher.requests().into_iter().map(|(_, s, e)| (s, e)).collect();
    assert_eq!(
        ranges,
        vec![(750_000, 999_999), (500_000, 749_999), (250_000, 499_999)]
    );
}

#[tokio::test]
async fn targeted_discovery_near_the_end_takes_one_fetch() {
    let scans: Vec<u64> = (1..=1000).collect();
    let built = build_mzml(&scans, 200);
    let fetcher = MemoryFetcher::new().with_container(URL, built.bytes.clone());
    let config = SessionConfig::default();

    let discovery = TrailerLocator::new(&fetcher, &config)
        .discover(&container(built.size()), DiscoveryMode::Targeted(422))
        .await
        .unwrap();

    assert_eq!(discovery.fetches, 1);
    assert_eq!(discovery.outcome, DiscoveryOutcome::Found);
    assert_eq!(discovery.index.offset(422), built.offsets.get(&422).copied());
    // The chromatogram index must not leak into the spectrum offsets.
    assert_eq!(discovery.index.max_id(), Some(1000));
}

#[tokio::test]
async fn targeted_discovery_near_the_start_widens_until_found() {
    let fetcher = MemoryFetcher::new().with_container(URL, wide_trailer_file(&wide_pairs(1), true));
    let config = SessionConfig::default();

    let discovery = TrailerLocator::new(&fetcher, &config)
        .discover(&container(MB as u64), DiscoveryMode::Targeted(5))
        .await
        .unwrap();

    assert_eq!(discovery.outcome, DiscoveryOutcome::Found);
    assert_eq!(discovery.fetches, 3);
    assert_eq!(discovery.index.offset(5), Some(200));
    assert!(discovery.ensure_found("scenario.mzML").is_ok());
}

#[tokio::test]
async fn targeted_discovery_of_a_missing_scan_fails() {
    let fetcher = MemoryFetcher::new().with_container(URL, wide_trailer_file(&wide_pairs(6), true));
    let config = SessionConfig::default();

    let discovery = TrailerLocator::new(&fetcher, &config)
        .discover(&container(MB as u64), DiscoveryMode::Targeted(5))
        .await
        .unwrap();

    assert_eq!(discovery.outcome, DiscoveryOutcome::Exhausted);
    assert!(matches!(
        discovery.ensure_found("scenario.mzML"),
        Err(Error::IdentifierNotFound { id: 5, .. })
    ));
}

#[tokio::test]
async fn targeted_discovery_without_marker_reads_to_byte_zero() {
    let fetcher = MemoryFetcher::new().with_container(URL, wide_trailer_file(&wide_pairs(6), false));
    let config = SessionConfig::default();

    let discovery = TrailerLocator::new(&fetcher, &config)
        .discover(&container(MB as u64), DiscoveryMode::Targeted(5))
        .await
        .unwrap();

    assert_eq!(discovery.outcome, DiscoveryOutcome::Exhausted);
    assert_eq!(discovery.fetches, 4);
    assert_eq!(discovery.window_start, 0);
    assert!(discovery.index.is_complete());
}

#[tokio::test]
async fn partial_capture_spans_match_full_capture_spans() {
    let scans: Vec<u64> = (1..=300).collect();
    let built = build_mzml(&scans, 50);
    let fetcher = MemoryFetcher::new().with_container(URL, built.bytes.clone());
    let config = SessionConfig::default().with_window_size(4_000);

    let partial = TrailerLocator::new(&fetcher, &config)
        .discover(&container(built.size()), DiscoveryMode::Targeted(280))
        .await
        .unwrap()
        .index;
    let full = TrailerLocator::new(&fetcher, &config)
        .discover(&container(built.size()), DiscoveryMode::Full)
        .await
        .unwrap()
        .index;

    assert!(!partial.is_complete());
    let low = partial.coverage_start().unwrap();
    assert!(low > 1 && low <= 280);
    for scan in low..=300 {
        let id = RecordId::new(scan);
        assert_eq!(
            partial.locate(id, 10).unwrap(),
            full.locate(id, 10).unwrap(),
            "scan {scan}"
        );
    }
}
