//! The storage backend trait.
//!
//! Every medium that can hold PDFs implements [`Backend`]. The
//! [`Catalog`](crate::catalog::Catalog) owns an ordered list of backends and
//! merges or resolves across them; it never branches on which concrete
//! backends happen to be configured.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 Catalog                  │
//! │  ┌─────────┐ ┌─────────┐ ┌────────────┐  │
//! │  │ Memory  │ │  Local  │ │ ObjectStore│  │
//! │  │ HashMap │ │  disk   │ │  S3 SigV4  │  │
//! │  └─────────┘ └─────────┘ └────────────┘  │
//! └──────────────┬───────────────────────────┘
//!                ▼
//!        list_all() / resolve() / store()
//! ```
//!
//! # Example
//!
//! ```rust
//! use anyhow::Result;
//! use async_trait::async_trait;
//! use pdfshelf::models::{BackendKind, Retrieved};
//! use pdfshelf::traits::Backend;
//!
//! /// A read-only backend that always holds one file.
//! pub struct FixtureBackend;
//!
//! #[async_trait]
//! impl Backend for FixtureBackend {
//!     fn kind(&self) -> BackendKind { BackendKind::Local }
//!
//!     async fn list(&self) -> Result<Vec<String>> {
//!         Ok(vec!["fixture.pdf".to_string()])
//!     }
//!
//!     async fn contains(&self, key: &str) -> Result<bool> {
//!         Ok(key == "fixture.pdf")
//!     }
//!
//!     async fn get(&self, key: &str) -> Result<Option<Retrieved>> {
//!         Ok((key == "fixture.pdf").then(|| Retrieved::Bytes(b"%PDF-1.4".to_vec())))
//!     }
//!
//!     async fn put(&self, _key: &str, _bytes: &[u8], _content_type: &str) -> Result<()> {
//!         anyhow::bail!("fixture backend is read-only")
//!     }
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{BackendKind, Retrieved};

/// A storage medium holding PDFs keyed by sanitized filename.
///
/// Keys passed in are already sanitized; implementations may join them onto
/// a base path or bucket without further checks.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which medium this backend represents.
    fn kind(&self) -> BackendKind;

    /// Returns a one-line description for `pdfshelf sources`.
    fn describe(&self) -> String {
        self.kind().to_string()
    }

    /// Enumerate the PDF keys currently stored.
    ///
    /// Only keys ending in `.pdf` (any case) are returned. A medium that
    /// does not exist yet lists as empty rather than failing.
    async fn list(&self) -> Result<Vec<String>>;

    /// Report whether `key` is currently stored.
    async fn contains(&self, key: &str) -> Result<bool>;

    /// Read `key`. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Retrieved>>;

    /// Write `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;
}
