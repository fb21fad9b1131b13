//! Configuration loading.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional TOML file, and the process environment (`.env` is loaded
//! into the environment by `main` before this runs).
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! static_dir = "public"
//!
//! [local]
//! enabled = true
//! dir = "pdfs"
//!
//! [s3]
//! region = "eu-west-1"
//! bucket = "acme-pdfs"
//!
//! [auth]
//! upload_key = "change-me"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub s3: ObjectStoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
/// Upper bound for `server.body_limit_mb` (4 GiB).
pub const MAX_BODY_LIMIT_MB: usize = 4096;

fn default_body_limit_mb() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_pdf_dir")]
    pub dir: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_pdf_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_pdf_dir() -> PathBuf {
    PathBuf::from("pdfs")
}

/// Raw `[s3]` section. Object storage is only enabled when both region
/// and bucket end up set; see [`Config::s3_config`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ObjectStoreConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

/// Resolved object-store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub upload_key: Option<String>,
}

impl Config {
    /// Object-store settings, if both region and bucket are configured.
    pub fn s3_config(&self) -> Option<S3Config> {
        match (&self.s3.region, &self.s3.bucket) {
            (Some(region), Some(bucket)) => Some(S3Config {
                region: region.clone(),
                bucket: bucket.clone(),
                endpoint_url: self.s3.endpoint_url.clone(),
            }),
            _ => None,
        }
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay values from `lookup`. Empty values count as unset.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }
        if let Some(dir) = var("STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = var("LOCAL_STORAGE") {
            self.local.enabled = parse_flag(&flag)
                .with_context(|| format!("LOCAL_STORAGE must be true or false, got '{}'", flag))?;
        }
        if let Some(dir) = var("PDF_DIR") {
            self.local.dir = PathBuf::from(dir);
        }
        if let Some(region) = var("AWS_REGION") {
            self.s3.region = Some(region);
        }
        if let Some(bucket) = var("S3_BUCKET") {
            self.s3.bucket = Some(bucket);
        }
        if let Some(endpoint) = var("S3_ENDPOINT_URL") {
            self.s3.endpoint_url = Some(endpoint);
        }
        if let Some(key) = var("UPLOAD_KEY") {
            self.auth.upload_key = Some(key);
        }
        Ok(())
    }

    fn normalize(&mut self) {
        fn blank_to_none(value: &mut Option<String>) {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
        blank_to_none(&mut self.s3.region);
        blank_to_none(&mut self.s3.bucket);
        blank_to_none(&mut self.s3.endpoint_url);
        blank_to_none(&mut self.auth.upload_key);
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be > 0");
        }
        if self.server.body_limit_mb == 0 || self.server.body_limit_mb > MAX_BODY_LIMIT_MB {
            bail!("server.body_limit_mb must be between 1 and {}", MAX_BODY_LIMIT_MB);
        }
        if self.local.enabled && self.local.dir.as_os_str().is_empty() {
            bail!("local.dir must not be empty when local storage is enabled");
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a TOML config file without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

/// Load configuration: defaults, then `path` if given, then environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    config.apply_env()?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(config.local.enabled);
        assert_eq!(config.local.dir, PathBuf::from("pdfs"));
        assert!(config.s3_config().is_none());
        assert!(config.auth.upload_key.is_none());
        assert_eq!(config.server.body_limit_mb, 50);
    }

    #[test]
    fn test_toml_sections() {
        let config = parse_config(
            r#"
[server]
host = "127.0.0.1"
port = 8080
static_dir = "public"

[local]
enabled = false

[s3]
region = "eu-west-1"
bucket = "docs"
endpoint_url = "http://localhost:9000"

[auth]
upload_key = "secret"
"#,
        )
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.server.static_dir, Some(PathBuf::from("public")));
        assert!(!config.local.enabled);
        assert_eq!(
            config.s3_config(),
            Some(S3Config {
                region: "eu-west-1".to_string(),
                bucket: "docs".to_string(),
                endpoint_url: Some("http://localhost:9000".to_string()),
            })
        );
        assert_eq!(config.auth.upload_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_s3_requires_region_and_bucket() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[("S3_BUCKET", "docs")]))
            .unwrap();
        assert!(config.s3_config().is_none());

        config
            .apply_env_from(env(&[("AWS_REGION", "us-east-1")]))
            .unwrap();
        assert_eq!(config.s3_config().unwrap().bucket, "docs");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = parse_config("[server]\nport = 8080\n").unwrap();
        config
            .apply_env_from(env(&[
                ("PORT", "9090"),
                ("HOST", "127.0.0.1"),
                ("PDF_DIR", "/srv/pdfs"),
                ("LOCAL_STORAGE", "off"),
                ("UPLOAD_KEY", "k"),
                ("AWS_REGION", ""),
            ]))
            .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.local.dir, PathBuf::from("/srv/pdfs"));
        assert!(!config.local.enabled);
        assert_eq!(config.auth.upload_key.as_deref(), Some("k"));
        assert!(config.s3.region.is_none());
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = Config::default();
        assert!(config.apply_env_from(env(&[("PORT", "http")])).is_err());
        assert!(config
            .apply_env_from(env(&[("LOCAL_STORAGE", "maybe")]))
            .is_err());
    }

    #[test]
    fn test_validation() {
        assert!(parse_config("[server]\nport = 0\n").is_err());
        assert!(parse_config("[server]\nbody_limit_mb = 0\n").is_err());
        assert!(parse_config("[local]\ndir = \"\"\n").is_err());
        assert!(parse_config("[local]\nenabled = false\ndir = \"\"\n").is_ok());
    }

    #[test]
    fn test_blank_strings_are_unset() {
        let config = parse_config("[s3]\nregion = \"\"\nbucket = \"b\"\n[auth]\nupload_key = \" \"\n").unwrap();
        assert!(config.s3_config().is_none());
        assert!(config.auth.upload_key.is_none());
    }

    #[test]
    fn test_body_limit_bounds() {
        assert!(parse_config("[server]\nbody_limit_mb = 0\n").is_err());
        assert!(parse_config("[server]\nbody_limit_mb = 4096\n").is_ok());
        let err = parse_config("[server]\nbody_limit_mb = 1000000\n").unwrap_err();
        assert!(format!("{:#}", err).contains("body_limit_mb"));
    }
}
