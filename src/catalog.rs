//! The catalog: one view over every configured backend.
//!
//! The catalog owns no bytes. Each call recomputes its answer from the
//! backends, so there is no index to invalidate.
//!
//! # Orders
//!
//! | Operation | Backend order |
//! |-----------|---------------|
//! | [`resolve`](Catalog::resolve) / [`fetch`](Catalog::fetch) | Memory, Local, ObjectStore |
//! | [`store`](Catalog::store) (direct upload) | ObjectStore, Local, Memory |
//!
//! Reads check cheap local state before paying for a network round trip.
//! Direct uploads go to the most durable backend available; memory is the
//! last resort on deployments with no persistent storage.

use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::backend_memory::MemoryBackend;
use crate::config::Config;
use crate::error::StoreError;
use crate::models::{BackendKind, FileRecord, Retrieved};
use crate::sanitize::StorageKey;
use crate::sources::open_backends;
use crate::traits::Backend;

fn resolve_rank(kind: BackendKind) -> u8 {
    match kind {
        BackendKind::Memory => 0,
        BackendKind::Local => 1,
        BackendKind::ObjectStore => 2,
    }
}

pub struct Catalog {
    /// Sorted by resolution priority.
    backends: Vec<Arc<dyn Backend>>,
}

impl Catalog {
    /// Build a catalog over `backends`.
    ///
    /// Order of the input does not matter; backends are sorted into
    /// resolution priority. An in-memory backend is appended if none was
    /// given, so writes always have somewhere to go.
    pub fn new(mut backends: Vec<Arc<dyn Backend>>) -> Self {
        if !backends.iter().any(|b| b.kind() == BackendKind::Memory) {
            backends.push(Arc::new(MemoryBackend::new()));
        }
        backends.sort_by_key(|b| resolve_rank(b.kind()));
        Self { backends }
    }

    /// Backends in resolution order.
    pub fn backends(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    pub fn has(&self, kind: BackendKind) -> bool {
        self.backends.iter().any(|b| b.kind() == kind)
    }

    /// Every PDF key visible in any backend, deduplicated by exact
    /// (case-sensitive) name.
    ///
    /// A backend whose listing fails is logged and skipped; this never
    /// returns an error.
    pub async fn list_all(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for backend in &self.backends {
            match backend.list().await {
                Ok(keys) => names.extend(keys),
                Err(e) => {
                    tracing::warn!(backend = %backend.kind(), error = %format!("{:#}", e), "listing failed, skipping backend");
                }
            }
        }
        names
    }

    /// Case-insensitive substring search over [`list_all`](Self::list_all).
    /// An empty needle matches everything.
    pub async fn search(&self, needle: &str) -> Vec<String> {
        let needle = needle.to_lowercase();
        self.list_all()
            .await
            .into_iter()
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Find the backend that serves `key`.
    ///
    /// Backends are probed in resolution order and the first one holding
    /// the key wins. A probe that fails is logged and counts as a miss.
    pub async fn resolve(&self, key: &StorageKey) -> Result<FileRecord, StoreError> {
        self.resolve_backend(key)
            .await
            .map(|backend| FileRecord {
                name: key.to_string(),
                source: backend.kind(),
            })
    }

    async fn resolve_backend(&self, key: &StorageKey) -> Result<&Arc<dyn Backend>, StoreError> {
        for backend in &self.backends {
            match backend.contains(key.as_str()).await {
                Ok(true) => return Ok(backend),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(backend = %backend.kind(), key = %key, error = %format!("{:#}", e), "existence probe failed");
                }
            }
        }
        Err(StoreError::NotFound(key.to_string()))
    }

    /// Resolve `key` and read it from the winning backend.
    pub async fn fetch(&self, key: &StorageKey) -> Result<(FileRecord, Retrieved), StoreError> {
        let backend = self.resolve_backend(key).await?;
        let record = FileRecord {
            name: key.to_string(),
            source: backend.kind(),
        };
        match backend.get(key.as_str()).await {
            Ok(Some(retrieved)) => Ok((record, retrieved)),
            // Removed between probe and read.
            Ok(None) => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(StoreError::Transport(e)),
        }
    }

    /// The backend direct uploads are written to.
    pub fn write_target(&self) -> &Arc<dyn Backend> {
        for kind in [BackendKind::ObjectStore, BackendKind::Local] {
            if let Some(backend) = self.backends.iter().find(|b| b.kind() == kind) {
                return backend;
            }
        }
        // `new` guarantees a memory backend, which sorts first.
        &self.backends[0]
    }

    /// Write `bytes` under `key` to the [`write_target`](Self::write_target).
    ///
    /// Last write wins; writing the same key twice leaves one catalog entry.
    pub async fn store(&self, key: &StorageKey, bytes: &[u8]) -> Result<BackendKind, StoreError> {
        let backend = self.write_target();
        backend
            .put(key.as_str(), bytes, "application/pdf")
            .await
            .map_err(StoreError::Transport)?;
        tracing::info!(key = %key, backend = %backend.kind(), size = bytes.len(), "stored PDF");
        Ok(backend.kind())
    }
}

/// `pdfshelf list`: print the catalog of the configured backends.
pub async fn run_list(config: &Config) -> Result<()> {
    let catalog = open_backends(config)?.catalog();
    let names = catalog.list_all().await;
    if names.is_empty() {
        println!("No PDFs.");
        return Ok(());
    }
    for name in &names {
        println!("{}", name);
    }
    println!("{} PDF(s)", names.len());
    Ok(())
}

/// `pdfshelf search <needle>`.
pub async fn run_search(config: &Config, needle: &str) -> Result<()> {
    let catalog = open_backends(config)?.catalog();
    let results = catalog.search(needle).await;
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for name in &results {
        println!("{}", name);
    }
    Ok(())
}
