//! Repository catalogs: where container files live and how big they are.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// One remote container file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFile {
    /// File name, unique within its repository.
    pub name: String,
    /// Total size in bytes.
    pub size: u64,
    pub url: String,
}

/// Lists the container files of a repository.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_containers(&self, repository_id: &str) -> Result<Vec<ContainerFile>>;
}

#[derive(Debug, Deserialize)]
struct RecordListing {
    #[serde(default)]
    files: Vec<FileDescriptor>,
}

#[derive(Debug, Deserialize)]
struct FileDescriptor {
    key: String,
    size: u64,
}

/// Catalog backed by the Zenodo records API.
pub struct ZenodoCatalog {
    client: Client,
    api_base: String,
    files_base: String,
    extension: String,
}

impl ZenodoCatalog {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Transport {
                url: String::new(),
                source,
            })?;
        Ok(Self {
            client,
            api_base: "https://zenodo.org/api/records".to_string(),
            files_base: "https://zenodo.org/record".to_string(),
            extension: ".mzML".to_string(),
        })
    }

    /// Set the records API base (`{api_base}/{repository_id}` is queried).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the download base (`{files_base}/{repository_id}/files/{name}`).
    pub fn with_files_base(mut self, files_base: impl Into<String>) -> Self {
        self.files_base = files_base.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    fn file_url(&self, repository_id: &str, name: &str) -> String {
        format!(
            "{}/{}/files/{}",
            self.files_base.trim_end_matches('/'),
            repository_id,
            name
        )
    }
}

#[async_trait]
impl Catalog for ZenodoCatalog {
    async fn list_containers(&self, repository_id: &str) -> Result<Vec<ContainerFile>> {
        let url = format!("{}/{}", self.api_base.trim_end_matches('/'), repository_id);
        debug!(url, "querying catalog");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.clone(),
                source,
            })?;
        if !resp.status().is_success() {
            return Err(Error::HttpStatus {
                url,
                status: resp.status(),
            });
        }
        let body = resp.bytes().await.map_err(|source| Error::Transport {
            url: url.clone(),
            source,
        })?;
        let listing: RecordListing =
            serde_json::from_slice(&body).map_err(|source| Error::Catalog {
                url: url.clone(),
                source,
            })?;

        Ok(listing
            .files
            .into_iter()
            .filter(|file| file.key.ends_with(&self.extension))
            .map(|file| ContainerFile {
                url: self.file_url(repository_id, &file.key),
                name: file.key,
                size: file.size,
            })
            .collect())
    }
}

/// Catalog over a directory on disk; the repository id is ignored.
pub struct LocalCatalog {
    dir: PathBuf,
    extension: String,
}

impl LocalCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: ".mzML".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

#[async_trait]
impl Catalog for LocalCatalog {
    async fn list_containers(&self, _repository_id: &str) -> Result<Vec<ContainerFile>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut containers = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(&self.extension) {
                continue;
            }
            containers.push(ContainerFile {
                url: entry.path().to_string_lossy().to_string(),
                name,
                size: metadata.len(),
            });
        }

        containers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(containers)
    }
}
