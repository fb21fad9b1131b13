//! Presigned transfer negotiation.
//!
//! When object storage is configured, clients move bytes straight to and
//! from the bucket using short-lived URLs instead of streaming through the
//! service. A handle grants one operation on one key and needs no further
//! authorization once issued.

use std::sync::Arc;
use std::time::Duration;

use crate::backend_s3::{S3Backend, GET_URL_EXPIRY};
use crate::error::StoreError;
use crate::models::{TransferHandle, TransferMethod};
use crate::sanitize::StorageKey;

/// Upload URLs stay valid for five minutes.
pub const PUT_URL_EXPIRY: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

#[derive(Clone, Default)]
pub struct TransferNegotiator {
    s3: Option<Arc<S3Backend>>,
}

impl TransferNegotiator {
    pub fn new(s3: Option<Arc<S3Backend>>) -> Self {
        Self { s3 }
    }

    pub fn is_configured(&self) -> bool {
        self.s3.is_some()
    }

    fn backend(&self) -> Result<&S3Backend, StoreError> {
        self.s3.as_deref().ok_or(StoreError::NotConfigured)
    }

    /// Issue an upload URL for `key`.
    ///
    /// `content_type` defaults to `application/pdf` and is signed into the
    /// URL, so the upload must use the same type.
    pub fn negotiate_put(
        &self,
        key: &StorageKey,
        content_type: Option<&str>,
    ) -> Result<TransferHandle, StoreError> {
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let handle = self.backend()?.presign(
            TransferMethod::Put,
            key.as_str(),
            PUT_URL_EXPIRY,
            Some(content_type),
        );
        tracing::info!(key = %key, content_type, expires_at = %handle.expires_at, "issued upload URL");
        Ok(handle)
    }

    /// Issue a download URL for `key`.
    pub fn negotiate_get(&self, key: &StorageKey) -> Result<TransferHandle, StoreError> {
        Ok(self
            .backend()?
            .presign(TransferMethod::Get, key.as_str(), GET_URL_EXPIRY, None))
    }
}
