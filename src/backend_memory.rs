//! In-memory [`Backend`] for ephemeral deployments and tests.
//!
//! Payloads are kept base64-encoded in a `HashMap` behind
//! `std::sync::RwLock` and decoded on read. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::models::{BackendKind, Retrieved};
use crate::sanitize::is_pdf_name;
use crate::traits::Backend;

/// Process-lifetime PDF store.
pub struct MemoryBackend {
    files: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn describe(&self) -> String {
        "memory (process lifetime, lost on restart)".to_string()
    }

    async fn list(&self) -> Result<Vec<String>> {
        let files = self.files.read().map_err(poisoned)?;
        Ok(files.keys().filter(|k| is_pdf_name(k)).cloned().collect())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        let files = self.files.read().map_err(poisoned)?;
        Ok(files.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<Retrieved>> {
        let encoded = {
            let files = self.files.read().map_err(poisoned)?;
            match files.get(key) {
                Some(encoded) => encoded.clone(),
                None => return Ok(None),
            }
        };
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .with_context(|| format!("corrupt in-memory payload for '{}'", key))?;
        Ok(Some(Retrieved::Bytes(bytes)))
    }

    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        let encoded = STANDARD.encode(bytes);
        let mut files = self.files.write().map_err(poisoned)?;
        files.insert(key.to_string(), encoded);
        Ok(())
    }
}
