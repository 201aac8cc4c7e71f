mod http;
mod local;
mod memory;
mod retry;

pub use http::HttpRangeFetcher;
pub use local::LocalFileFetcher;
pub use memory::MemoryFetcher;
pub use retry::RetryingFetcher;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for byte-range reads from a container addressed by URL
#[async_trait]
pub trait RangeFetch: Send + Sync {
    /// Fetch bytes `start..=end` of the container at `url`
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>>;
}

/// Clamp `start..=end` to a container of `size` bytes and fetch it.
pub async fn fetch_clamped<F: RangeFetch + ?Sized>(
    fetcher: &F,
    url: &str,
    size: u64,
    start: u64,
    end: u64,
) -> Result<Vec<u8>> {
    let (start, end) = clamp_range(size, start, end)?;
    fetcher.fetch_range(url, start, end).await
}

pub(crate) fn clamp_range(size: u64, start: u64, end: u64) -> Result<(u64, u64)> {
    if size == 0 {
        return Err(Error::InvalidRange { start, end, size });
    }
    let end = end.min(size - 1);
    if start > end {
        return Err(Error::InvalidRange { start, end, size });
    }
    Ok((start, end))
}
