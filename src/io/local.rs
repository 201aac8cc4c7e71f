use async_trait::async_trait;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::RangeFetch;
use crate::error::{Error, Result};

/// Range reads from files on disk; the URL is a filesystem path
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileFetcher;

impl LocalFileFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RangeFetch for LocalFileFetcher {
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let mut file = File::open(url).await?;
        let size = file.metadata().await?.len();
        if start >= size || start > end {
            return Err(Error::InvalidRange { start, end, size });
        }
        let end = end.min(size - 1);

        file.seek(SeekFrom::Start(start)).await?;
        let mut buf = vec![0u8; (end - start + 1) as usize];
        file.read_exact(&mut buf).await?;
        Ok(buf)
    }
}
