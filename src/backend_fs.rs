//! Local filesystem backend.
//!
//! Stores each PDF as a flat file under a single directory. The directory
//! is created on first write; until then the backend simply lists as empty.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::{BackendKind, Retrieved};
use crate::sanitize::is_listable;
use crate::traits::Backend;

pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl Backend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn describe(&self) -> String {
        format!("local ({})", self.root.display())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read PDF directory: {}", self.root.display())
                })
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            // Non-UTF-8 names cannot be requested back.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_listable(&name) {
                continue;
            }
            // Follows symlinks, matching `contains`.
            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => names.push(name),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(name, error = %e, "skipping unreadable entry");
                }
            }
        }

        names.sort();
        Ok(names)
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        match fs::metadata(self.path_for(key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to stat '{}'", key)),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Retrieved>> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(Retrieved::Bytes(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read '{}'", key)),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        fs::create_dir_all(&self.root).await.with_context(|| {
            format!("Failed to create PDF directory: {}", self.root.display())
        })?;
        fs::write(self.path_for(key), bytes)
            .await
            .with_context(|| format!("Failed to write '{}'", key))?;
        tracing::debug!(key, root = %self.root.display(), "wrote file to local storage");
        Ok(())
    }
}
