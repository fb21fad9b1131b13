//! Core data types shared by the backends, the catalog, and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// The storage medium a backend writes to.
///
/// Variant order is not the resolution order; see
/// [`Catalog::resolve`](crate::catalog::Catalog::resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Local,
    ObjectStore,
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::ObjectStore => "object_store",
            BackendKind::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A stored PDF and the backend that serves it.
///
/// Not persisted anywhere: a record exists exactly as long as the backend
/// holds the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub source: BackendKind,
}

/// Which operation a [`TransferHandle`] grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMethod {
    Put,
    Get,
}

impl TransferMethod {
    pub fn as_http(&self) -> &'static str {
        match self {
            TransferMethod::Put => "PUT",
            TransferMethod::Get => "GET",
        }
    }
}

/// A presigned, time-boxed URL for one operation on one object-store key.
#[derive(Debug, Clone)]
pub struct TransferHandle {
    pub key: String,
    pub method: TransferMethod,
    pub url: String,
    pub expires_in: Duration,
    pub expires_at: DateTime<Utc>,
}

/// What a backend hands back for a read.
///
/// Local and in-memory backends return the bytes; the object store returns
/// a short-lived download URL so the bytes never pass through the service.
#[derive(Debug, Clone)]
pub enum Retrieved {
    Bytes(Vec<u8>),
    Redirect(TransferHandle),
}
