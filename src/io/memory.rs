use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::RangeFetch;
use crate::error::{Error, Result};

/// Serves byte ranges from in-memory containers and records every request.
#[derive(Default)]
pub struct MemoryFetcher {
    containers: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<(String, u64, u64)>>,
    transferred_bytes: AtomicU64,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.containers.insert(url.into(), bytes.into());
        self
    }

    /// Number of range requests served so far.
    pub fn fetch_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every `(url, start, end)` requested, in order.
    pub fn requests(&self) -> Vec<(String, u64, u64)> {
        self.requests.lock().clone()
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RangeFetch for MemoryFetcher {
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let data = self.containers.get(url).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory container at {url}"),
            ))
        })?;
        let size = data.len() as u64;
        if start > end || end >= size {
            return Err(Error::InvalidRange { start, end, size });
        }

        self.requests.lock().push((url.to_string(), start, end));
        let chunk = data[start as usize..=end as usize].to_vec();
        self.transferred_bytes
            .fetch_add(chunk.len() as u64, Ordering::Relaxed);
        Ok(chunk)
    }
}
