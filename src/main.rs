//! # pdfshelf CLI
//!
//! ## Usage
//!
//! ```bash
//! pdfshelf [--config ./pdfshelf.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfshelf serve` | Start the HTTP server |
//! | `pdfshelf list` | Print every PDF across all backends |
//! | `pdfshelf search <needle>` | Case-insensitive substring search |
//! | `pdfshelf sources` | Show configured backends in resolution order |
//!
//! Settings come from the optional TOML file, then from environment
//! variables (a `.env` file in the working directory is loaded first).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pdfshelf::catalog::{run_list, run_search};
use pdfshelf::config::load_config;
use pdfshelf::server::run_server;
use pdfshelf::sources::list_sources;

/// pdfshelf: store PDFs locally, in S3, or in memory, and serve them over HTTP.
#[derive(Parser)]
#[command(name = "pdfshelf", version)]
struct Cli {
    /// Path to a TOML configuration file.
    ///
    /// Optional. Environment variables (`PORT`, `S3_BUCKET`, `UPLOAD_KEY`, ...)
    /// override values from the file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve,

    /// List every PDF across all configured backends.
    List,

    /// Search PDF names by case-insensitive substring.
    Search {
        /// Substring to look for.
        needle: String,
    },

    /// Show configured storage backends in resolution order.
    Sources,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pdfshelf=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => run_server(&config).await?,
        Commands::List => run_list(&config).await?,
        Commands::Search { needle } => run_search(&config, &needle).await?,
        Commands::Sources => list_sources(&config)?,
    }

    Ok(())
}
