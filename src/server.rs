//! HTTP server.
//!
//! A thin JSON layer over the [`Catalog`], the [`UploadGate`], and the
//! [`TransferNegotiator`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/pdfs` | Full catalog |
//! | `GET`  | `/api/search?name=<substr>` | Case-insensitive substring search |
//! | `POST` | `/api/chat` | Keyword match a message against the catalog |
//! | `GET`  | `/pdf/{filename}` | PDF bytes, or a `302` to a presigned URL |
//! | `POST` | `/api/upload` | Direct upload of a base64 payload |
//! | `POST` | `/api/presign` | Presigned upload URL (object storage only) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Anything else is served from `server.static_dir` when one is configured.
//!
//! # Error Contract
//!
//! JSON routes answer errors with
//!
//! ```json
//! { "error": "Only PDF files allowed", "code": "bad_request" }
//! ```
//!
//! Codes: `bad_request` (400), `forbidden` (403), `not_found` (404),
//! `not_configured` (500), `internal` (500). The file route answers with
//! plain text instead.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser UI on
//! another origin can call the API.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{Authorization, UploadGate};
use crate::backend_s3::uri_encode;
use crate::catalog::Catalog;
use crate::chat::{self, ChatReply};
use crate::config::{Config, ServerConfig};
use crate::error::StoreError;
use crate::models::{BackendKind, Retrieved};
use crate::presign::TransferNegotiator;
use crate::sanitize::StorageKey;
use crate::sources::open_backends;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    negotiator: TransferNegotiator,
    gate: UploadGate,
}

impl AppState {
    pub fn new(catalog: Catalog, negotiator: TransferNegotiator, gate: UploadGate) -> Self {
        Self {
            catalog: Arc::new(catalog),
            negotiator,
            gate,
        }
    }

    /// Build every backend `config` asks for.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backends = open_backends(config)?;
        Ok(Self::new(
            backends.catalog(),
            TransferNegotiator::new(backends.s3.clone()),
            UploadGate::new(config.auth.upload_key.clone()),
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Assemble the router. Separate from [`run_server`] so tests can serve it
/// on an ephemeral port.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/pdfs", get(handle_list))
        .route("/api/search", get(handle_search))
        .route("/api/chat", post(handle_chat))
        .route("/api/upload", post(handle_upload))
        .route("/api/presign", post(handle_presign))
        .route("/pdf/{filename}", get(handle_pdf))
        .route("/health", get(handle_health));

    if let Some(ref dir) = server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(server.body_limit_mb.saturating_mul(1024 * 1024)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server and runs until Ctrl+C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;

    for backend in state.catalog.backends() {
        tracing::info!(backend = %backend.kind(), details = %backend.describe(), "storage backend ready");
    }
    tracing::info!(
        target_backend = %state.catalog.write_target().kind(),
        "direct uploads will be written here"
    );
    if state.gate.is_enforced() {
        tracing::warn!("UPLOAD_KEY protects /api/presign only; /api/upload accepts writes without it");
    }

    let app = router(state, &config.server);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Internal error type that converts into a JSON HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::Forbidden => StatusCode::FORBIDDEN,
            StoreError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            StoreError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match err {
            StoreError::Transport(ref e) => {
                tracing::error!(error = %format!("{:#}", e), "storage operation failed");
                "Server error".to_string()
            }
            ref other => other.to_string(),
        };
        AppError {
            status,
            code: err.code(),
            message,
        }
    }
}

/// Catalog link for a file, matching the `/pdf/{filename}` route.
fn pdf_url(name: &str) -> String {
    format!("/pdf/{}", uri_encode(name))
}

#[derive(Serialize)]
struct PdfLink {
    name: String,
    url: String,
}

impl PdfLink {
    fn new(name: String) -> Self {
        let url = pdf_url(&name);
        Self { name, url }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ GET /api/pdfs ============

#[derive(Serialize)]
struct ListResponse {
    pdfs: Vec<String>,
}

async fn handle_list(State(state): State<AppState>) -> Json<ListResponse> {
    let pdfs = state.catalog.list_all().await.into_iter().collect();
    Json(ListResponse { pdfs })
}

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    name: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<PdfLink>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let results = state
        .catalog
        .search(&params.name)
        .await
        .into_iter()
        .map(PdfLink::new)
        .collect();
    Json(SearchResponse { results })
}

// ============ POST /api/chat ============

#[derive(Deserialize, Default)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ChatResponse {
    Pdf { results: Vec<PdfLink> },
    Text { reply: String },
}

async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;
    let message = req.message.unwrap_or_default();
    let names = state.catalog.list_all().await;

    let response = match chat::respond(&message, &names) {
        ChatReply::Pdf(matches) => ChatResponse::Pdf {
            results: matches.into_iter().map(PdfLink::new).collect(),
        },
        ChatReply::Text(reply) => ChatResponse::Text { reply },
    };
    Ok(Json(response))
}

// ============ GET /pdf/{filename} ============

/// `attachment` disposition; non-ASCII names also get an RFC 5987
/// `filename*` parameter.
fn content_disposition(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if ascii == name {
        format!("attachment; filename=\"{}\"", name)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii,
            uri_encode(name)
        )
    }
}

fn plain(status: StatusCode, body: &'static str) -> Response {
    (status, body).into_response()
}

async fn handle_pdf(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let Some(key) = StorageKey::parse(&filename) else {
        return plain(StatusCode::BAD_REQUEST, "Invalid filename");
    };

    match state.catalog.fetch(&key).await {
        Ok((_, Retrieved::Bytes(bytes))) => {
            let disposition = HeaderValue::from_str(&content_disposition(key.as_str()))
                .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Ok((_, Retrieved::Redirect(handle))) => match HeaderValue::from_str(&handle.url) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "presigned URL is not a valid header");
                plain(StatusCode::NOT_FOUND, "PDF not found")
            }
        },
        Err(StoreError::NotFound(_)) => plain(StatusCode::NOT_FOUND, "PDF not found"),
        Err(e) => {
            tracing::error!(key = %key, error = %e, "failed to serve PDF");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

// ============ POST /api/upload ============

#[derive(Deserialize, Default)]
struct UploadRequest {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    message: String,
    filename: String,
}

/// Decode the upload payload. A `data:...;base64,` prefix is tolerated.
fn decode_payload(data: &str) -> Result<Vec<u8>, StoreError> {
    let data = data.trim();
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    STANDARD
        .decode(encoded)
        .map_err(|_| StoreError::Validation("Invalid base64 data".to_string()))
}

async fn handle_upload(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;

    let (filename, data) = match (req.filename, req.data) {
        (Some(f), Some(d)) if !f.is_empty() && !d.is_empty() => (f, d),
        _ => return Err(bad_request("Missing filename or data")),
    };
    let key = StorageKey::for_upload(Some(&filename))?;
    let bytes = decode_payload(&data)?;

    let stored_in = state.catalog.store(&key, &bytes).await?;
    let message = match stored_in {
        BackendKind::ObjectStore => format!("{} uploaded to S3", key),
        BackendKind::Local => format!("{} saved locally", key),
        BackendKind::Memory => format!("{} uploaded successfully (in-memory)", key),
    };

    Ok(Json(UploadResponse {
        success: true,
        message,
        filename: key.into_string(),
    }))
}

// ============ POST /api/presign ============

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PresignRequest {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignResponse {
    upload_url: String,
    key: String,
    expires_at: String,
}

async fn handle_presign(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PresignRequest>, JsonRejection>,
) -> Result<Json<PresignResponse>, AppError> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();

    let provided = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .or(req.api_key.as_deref());
    if state.gate.authorize(provided) == Authorization::Deny {
        return Err(StoreError::Forbidden.into());
    }

    if !state.negotiator.is_configured() {
        tracing::error!("presign requested but S3 is not configured");
        return Err(StoreError::NotConfigured.into());
    }

    let key = StorageKey::for_upload(req.filename.as_deref())?;
    let handle = state
        .negotiator
        .negotiate_put(&key, req.content_type.as_deref())?;

    Ok(Json(PresignResponse {
        upload_url: handle.url,
        key: handle.key,
        expires_at: handle.expires_at.to_rfc3339(),
    }))
}
