//! Turning configuration into backends.
//!
//! Configuration is validated once, here, at startup: each persistent
//! backend is either fully built or absent. Nothing is initialized lazily on
//! first use.

use anyhow::Result;
use std::sync::Arc;

use crate::backend_fs::LocalBackend;
use crate::backend_memory::MemoryBackend;
use crate::backend_s3::S3Backend;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::traits::Backend;

/// The backends configured for this process.
pub struct Backends {
    pub memory: Arc<MemoryBackend>,
    pub local: Option<Arc<LocalBackend>>,
    pub s3: Option<Arc<S3Backend>>,
}

impl Backends {
    /// A catalog over these backends, sharing the same instances.
    pub fn catalog(&self) -> Catalog {
        let mut backends: Vec<Arc<dyn Backend>> = vec![self.memory.clone()];
        if let Some(ref local) = self.local {
            backends.push(local.clone());
        }
        if let Some(ref s3) = self.s3 {
            backends.push(s3.clone());
        }
        Catalog::new(backends)
    }
}

/// Build the backends `config` asks for.
///
/// Fails if object storage is configured but AWS credentials are missing.
pub fn open_backends(config: &Config) -> Result<Backends> {
    let local = config
        .local
        .enabled
        .then(|| Arc::new(LocalBackend::new(config.local.dir.clone())));

    let s3 = match config.s3_config() {
        Some(s3_config) => Some(Arc::new(S3Backend::from_env(s3_config)?)),
        None => None,
    };

    Ok(Backends {
        memory: Arc::new(MemoryBackend::new()),
        local,
        s3,
    })
}

/// `pdfshelf sources`: print configured backends in resolution order.
pub fn list_sources(config: &Config) -> Result<()> {
    let backends = open_backends(config)?;
    let catalog = backends.catalog();

    println!("{:<6} {:<14} DETAILS", "ORDER", "BACKEND");
    for (i, backend) in catalog.backends().iter().enumerate() {
        println!("{:<6} {:<14} {}", i + 1, backend.kind(), backend.describe());
    }

    let target = catalog.write_target();
    println!();
    println!("direct uploads -> {}", target.kind());
    println!(
        "presigned uploads -> {}",
        if backends.s3.is_some() {
            "enabled"
        } else {
            "disabled (S3 not configured)"
        }
    );
    println!(
        "upload key -> {}",
        if config.auth.upload_key.is_some() {
            "required for presign"
        } else {
            "not required"
        }
    );

    Ok(())
}
