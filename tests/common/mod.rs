//! A tiny S3-compatible bucket served by axum on an ephemeral port.
//!
//! Answers path-style `ListObjectsV2` (paged by a fixed page size) and
//! `HeadObject`. Signatures are not checked.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, head};
use axum::Router;
use pdfshelf::backend_s3::{AwsCredentials, S3Backend};
use pdfshelf::config::S3Config;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const BUCKET: &str = "shelf";

pub struct MockBucket {
    keys: Vec<String>,
    page_size: usize,
    list_status: StatusCode,
    head_status: HashMap<String, StatusCode>,
    list_calls: AtomicUsize,
}

impl MockBucket {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            page_size: 1000,
            list_status: StatusCode::OK,
            head_status: HashMap::new(),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Every listing request fails with `500`.
    pub fn failing_list(mut self) -> Self {
        self.list_status = StatusCode::INTERNAL_SERVER_ERROR;
        self
    }

    /// Answer `HEAD` for `key` with `status` regardless of contents.
    pub fn head_status(mut self, key: &str, status: StatusCode) -> Self {
        self.head_status.insert(key.to_string(), status);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Serve the bucket; returns the endpoint URL and a handle for
    /// inspecting request counts.
    pub async fn spawn(self) -> (String, Arc<MockBucket>) {
        let bucket = Arc::new(self);
        let app = Router::new()
            .route("/{bucket}", get(list_objects))
            .route("/{bucket}/{key}", head(head_object))
            .with_state(bucket.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), bucket)
    }
}

/// An `S3Backend` pointed at `endpoint` with throwaway credentials.
pub fn s3_backend(endpoint: &str) -> S3Backend {
    S3Backend::new(
        S3Config {
            region: "us-east-1".to_string(),
            bucket: BUCKET.to_string(),
            endpoint_url: Some(endpoint.to_string()),
        },
        AwsCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        },
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

async fn list_objects(
    State(bucket): State<Arc<MockBucket>>,
    Path(_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    bucket.list_calls.fetch_add(1, Ordering::SeqCst);
    if bucket.list_status != StatusCode::OK {
        return (bucket.list_status, "<Error><Code>InternalError</Code></Error>").into_response();
    }

    let start = params
        .get("continuation-token")
        .and_then(|t| t.strip_prefix("page-"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0)
        .min(bucket.keys.len());
    let end = (start + bucket.page_size).min(bucket.keys.len());
    let truncated = end < bucket.keys.len();

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ListBucketResult>",
    );
    xml.push_str(&format!("<Name>{}</Name>", BUCKET));
    xml.push_str(&format!("<IsTruncated>{}</IsTruncated>", truncated));
    for key in &bucket.keys[start..end] {
        xml.push_str(&format!(
            "<Contents><Key>{}</Key><Size>1</Size></Contents>",
            xml_escape(key)
        ));
    }
    if truncated {
        xml.push_str(&format!(
            "<NextContinuationToken>page-{}</NextContinuationToken>",
            end
        ));
    }
    xml.push_str("</ListBucketResult>");

    (StatusCode::OK, [("content-type", "application/xml")], xml).into_response()
}

async fn head_object(
    State(bucket): State<Arc<MockBucket>>,
    Path((_name, key)): Path<(String, String)>,
) -> StatusCode {
    if let Some(status) = bucket.head_status.get(&key) {
        return *status;
    }
    if bucket.keys.contains(&key) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}
