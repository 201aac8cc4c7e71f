use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::RangeFetch;
use crate::error::{Error, Result};

/// HTTP Range fetcher for remote mzML files
///
/// One client is shared by every container of a session. Failed requests are
/// reported, never retried here.
pub struct HttpRangeFetcher {
    client: Client,
    transferred_bytes: AtomicU64,
}

impl HttpRangeFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Transport {
                url: String::new(),
                source,
            })?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            transferred_bytes: AtomicU64::new(0),
        }
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RangeFetch for HttpRangeFetcher {
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        if start > end {
            return Err(Error::ReversedRange { start, end });
        }
        let expected_size = (end - start + 1) as usize;
        let mut buf = Vec::with_capacity(expected_size);

        // A server may hand back less than asked for; continue from where it
        // stopped rather than failing the whole range.
        while buf.len() < expected_size {
            let current_start = start + buf.len() as u64;
            let range = format!("bytes={}-{}", current_start, end);
            debug!(url, range = %range, "range request");

            let resp = self
                .client
                .get(url)
                .header("Range", &range)
                .send()
                .await
                .map_err(|source| Error::Transport {
                    url: url.to_string(),
                    source,
                })?;

            let status = resp.status();
            let bytes = match status {
                StatusCode::PARTIAL_CONTENT => {
                    resp.bytes().await.map_err(|source| Error::Transport {
                        url: url.to_string(),
                        source,
                    })?
                }
                StatusCode::OK => {
                    // Range ignored: the body is the whole file.
                    warn!(url, "server ignored Range header, slicing full response");
                    let body = resp.bytes().await.map_err(|source| Error::Transport {
                        url: url.to_string(),
                        source,
                    })?;
                    let from = (current_start as usize).min(body.len());
                    let to = ((end + 1) as usize).min(body.len());
                    body.slice(from..to)
                }
                _ => {
                    return Err(Error::HttpStatus {
                        url: url.to_string(),
                        status,
                    });
                }
            };

            if bytes.is_empty() {
                return Err(Error::ShortRead {
                    url: url.to_string(),
                    expected: expected_size as u64,
                    received: buf.len() as u64,
                });
            }

            let chunk_len = bytes.len().min(expected_size - buf.len());
            buf.extend_from_slice(&bytes[..chunk_len]);
            self.transferred_bytes
                .fetch_add(chunk_len as u64, Ordering::Relaxed);
        }

        Ok(buf)
    }
}
