//! Per-repository session: catalog, cached indexes and record retrieval.
//!
//! The catalog is queried once when the session opens. Each container gets
//! its offset index lazily, on the first record requested from it. The cached
//! index is swapped, never edited, and only for one with better coverage of
//! low scan numbers (see [`OffsetIndex::supersedes`]). Locks are never held
//! across a fetch, so lookups for different scans or containers run in
//! parallel.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{Catalog, ContainerFile};
use crate::config::{IndexingMode, SessionConfig};
use crate::decode::{RecordDecoder, StructuredRecord};
use crate::error::{Error, Result};
use crate::io::{RangeFetch, fetch_clamped};
use crate::mzml::{DiscoveryMode, OffsetIndex, RecordId, RecordSpan, TrailerLocator, repair_tail};

/// Raw bytes of one record together with where they came from.
#[derive(Debug, Clone)]
pub struct Record {
    pub container: String,
    pub span: RecordSpan,
    pub bytes: Vec<u8>,
}

pub struct RepositorySession<F: RangeFetch> {
    repository_id: String,
    containers: BTreeMap<String, ContainerFile>,
    fetcher: Arc<F>,
    config: SessionConfig,
    indexes: RwLock<HashMap<String, Arc<OffsetIndex>>>,
}

impl<F: RangeFetch> RepositorySession<F> {
    /// List the repository's containers and start an empty session.
    pub async fn open<C: Catalog + ?Sized>(
        catalog: &C,
        repository_id: &str,
        fetcher: Arc<F>,
        config: SessionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let containers = catalog.list_containers(repository_id).await?;
        info!(
            repository = repository_id,
            containers = containers.len(),
            "opened repository"
        );
        Ok(Self::with_containers(repository_id, containers, fetcher, config))
    }

    /// Start a session over an already known set of containers.
    pub fn with_containers(
        repository_id: &str,
        containers: Vec<ContainerFile>,
        fetcher: Arc<F>,
        config: SessionConfig,
    ) -> Self {
        Self {
            repository_id: repository_id.to_string(),
            containers: containers
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
            fetcher,
            config,
            indexes: RwLock::new(HashMap::new()),
        }
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Containers sorted by name.
    pub fn containers(&self) -> impl Iterator<Item = &ContainerFile> {
        self.containers.values()
    }

    pub fn container(&self, name: &str) -> Result<&ContainerFile> {
        self.containers
            .get(name)
            .ok_or_else(|| Error::ContainerNotFound(name.to_string()))
    }

    /// The cached index of a container, if one has been built.
    pub fn cached_index(&self, name: &str) -> Option<Arc<OffsetIndex>> {
        self.indexes.read().get(name).cloned()
    }

    /// Capture the whole trailer of a container and cache the result.
    pub async fn build_full_index(&self, name: &str) -> Result<Arc<OffsetIndex>> {
        let container = self.container(name)?;
        let index = self.discover(container, DiscoveryMode::Full).await?;
        Ok(index)
    }

    /// Index able to answer for `id`: the cached one if it knows the scan or
    /// covers where it would be, otherwise the result of a fresh discovery.
    pub async fn index_for(&self, name: &str, id: RecordId) -> Result<Arc<OffsetIndex>> {
        let container = self.container(name)?;
        if let Some(cached) = self.cached_index(name) {
            if cached.contains(id.get()) || cached.covers(id.get()) {
                return Ok(cached);
            }
            debug!(container = name, scan = id.get(), "scan not in cached index");
        }

        let mode = match self.config.indexing {
            IndexingMode::Targeted => DiscoveryMode::Targeted(id.get()),
            IndexingMode::Full => DiscoveryMode::Full,
        };
        self.discover(container, mode).await
    }

    /// Byte span of one scan.
    pub async fn locate(&self, name: &str, id: RecordId) -> Result<RecordSpan> {
        let index = self.index_for(name, id).await?;
        index.locate(id, self.config.boundary_margin)
    }

    /// Fetch the bytes of one scan, trimmed to its closing tag if it is the
    /// last one in the file.
    pub async fn fetch_record(&self, name: &str, id: RecordId) -> Result<Record> {
        let container = self.container(name)?;
        let span = self.locate(name, id).await?;
        debug!(
            container = name,
            scan = span.id(),
            start = span.start(),
            end = span.end(),
            "fetching scan"
        );

        let mut bytes = fetch_clamped(
            self.fetcher.as_ref(),
            &container.url,
            container.size,
            span.start(),
            span.end(),
        )
        .await?;
        if span.needs_repair() {
            bytes = repair_tail(bytes, &self.config.markers.record_end);
        }

        Ok(Record {
            container: name.to_string(),
            span,
            bytes,
        })
    }

    /// Fetch one scan and hand it to `decoder`.
    pub async fn decode_record<D: RecordDecoder + ?Sized>(
        &self,
        name: &str,
        id: RecordId,
        decoder: &D,
    ) -> Result<StructuredRecord> {
        let record = self.fetch_record(name, id).await?;
        decoder.decode(&record.bytes)
    }

    async fn discover(&self, container: &ContainerFile, mode: DiscoveryMode) -> Result<Arc<OffsetIndex>> {
        let discovery = TrailerLocator::new(self.fetcher.as_ref(), &self.config)
            .discover(container, mode)
            .await?;
        // An exhausted search still captured the whole trailer; keep it.
        let found = discovery.ensure_found(&container.name);
        let fresh = Arc::new(discovery.index);
        self.install(&container.name, fresh.clone());
        found.map(|()| fresh)
    }

    /// Compare-and-replace under one write lock.
    fn install(&self, name: &str, fresh: Arc<OffsetIndex>) -> bool {
        let mut indexes = self.indexes.write();
        let replace = match indexes.get(name) {
            Some(cached) => fresh.supersedes(cached),
            None => true,
        };
        if replace {
            info!(
                container = name,
                coverage_start = ?fresh.coverage_start(),
                complete = fresh.is_complete(),
                "caching offset index"
            );
            indexes.insert(name.to_string(), fresh);
        }
        replace
    }
}
