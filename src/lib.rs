//! # pdfshelf
//!
//! A small PDF storage and retrieval service.
//!
//! PDFs live in up to three backends at once: the local filesystem, an
//! S3-compatible bucket, and process memory. The [`catalog`] presents them as
//! one flat namespace of file names and decides which backend serves a read
//! and which one takes a write. When a bucket is configured, clients can also
//! move bytes directly to and from it through presigned URLs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────────────────┐
//! │   HTTP   │──▶│ Catalog  │──▶│ Memory / Local / S3  │
//! │  (axum)  │   │ resolve  │   │  (Backend trait)     │
//! └────┬─────┘   └──────────┘   └──────────────────────┘
//!      │         ┌──────────┐             ▲
//!      └────────▶│ Presign  │─────────────┘
//!                │ + Gate   │   (SigV4 query signing)
//!                └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pdfshelf serve                          # in-memory + ./pdfs
//! S3_BUCKET=docs AWS_REGION=eu-west-1 pdfshelf serve
//! pdfshelf list                           # print the merged catalog
//! pdfshelf sources                        # show backends in resolution order
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML + environment configuration |
//! | [`models`] | Core data types |
//! | [`sanitize`] | Filename sanitization and storage keys |
//! | [`traits`] | The `Backend` trait |
//! | [`backend_fs`] | Local directory backend |
//! | [`backend_s3`] | S3-compatible backend and SigV4 signing |
//! | [`backend_memory`] | In-process backend |
//! | [`catalog`] | Merged listing, resolution, write target |
//! | [`presign`] | Presigned upload/download URLs |
//! | [`auth`] | Shared-secret gate for presigned uploads |
//! | [`chat`] | Keyword matcher for the chat endpoint |
//! | [`server`] | HTTP server |
//! | [`sources`] | Backend construction from configuration |

pub mod auth;
pub mod backend_fs;
pub mod backend_memory;
pub mod backend_s3;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod presign;
pub mod sanitize;
pub mod server;
pub mod sources;
pub mod traits;
