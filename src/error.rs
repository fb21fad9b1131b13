//! Error taxonomy for catalog and transfer operations.
//!
//! Adapters report I/O problems as `anyhow::Error`; the catalog folds them
//! into [`StoreError::Transport`]. The HTTP layer maps each variant to a
//! status code in `server.rs`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No configured backend holds the key.
    #[error("PDF not found: {0}")]
    NotFound(String),

    /// Missing filename or payload, wrong suffix, undecodable data.
    #[error("{0}")]
    Validation(String),

    /// The upload secret did not match.
    #[error("Forbidden")]
    Forbidden,

    /// Object storage was needed but is not configured.
    #[error("S3 not configured")]
    NotConfigured,

    /// A backend failed while reading or writing.
    #[error("storage backend failure: {0}")]
    Transport(anyhow::Error),
}

impl StoreError {
    /// Machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::Validation(_) => "bad_request",
            StoreError::Forbidden => "forbidden",
            StoreError::NotConfigured => "not_configured",
            StoreError::Transport(_) => "internal",
        }
    }
}
