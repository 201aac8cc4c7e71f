use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::RangeFetch;
use crate::error::Result;

/// Wraps a fetcher with linear backoff for transient transport failures.
///
/// Fetchers themselves never retry; this is the caller-side policy.
pub struct RetryingFetcher<F: RangeFetch> {
    inner: Arc<F>,
    max_retry: u32,
    backoff: Duration,
}

impl<F: RangeFetch> RetryingFetcher<F> {
    pub fn new(inner: Arc<F>, max_retry: u32) -> Self {
        Self {
            inner,
            max_retry,
            backoff: Duration::from_millis(500),
        }
    }

    /// Base delay; attempt `n` sleeps `n * backoff`.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn inner(&self) -> &Arc<F> {
        &self.inner
    }
}

#[async_trait]
impl<F: RangeFetch> RangeFetch for RetryingFetcher<F> {
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let mut retry_count = 0;
        loop {
            match self.inner.fetch_range(url, start, end).await {
                Err(e) if e.is_retryable() && retry_count < self.max_retry => {
                    retry_count += 1;
                    warn!(
                        url,
                        "transport error, retry {}/{}: {}", retry_count, self.max_retry, e
                    );
                    tokio::time::sleep(self.backoff * retry_count).await;
                }
                result => return result,
            }
        }
    }
}
