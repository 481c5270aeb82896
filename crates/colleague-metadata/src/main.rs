//! `colleague-metadata-server`: serves the metadata endpoints.
//!
//! ```text
//! colleague-metadata-server --config colleague-metadata.yaml
//! colleague-metadata-server --catalog catalog.yaml --bind 0.0.0.0:8080 --publish-dir docs
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use colleague_metadata::{build_router, AppState};
use colleague_metadata_core::Catalog;
use colleague_metadata_openapi::ProjectConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// HTTP service for Colleague Web API OpenAPI metadata.
#[derive(Parser)]
#[command(name = "colleague-metadata-server", version, about)]
struct Args {
    /// Path to a project config YAML file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the descriptor catalog. Overrides `catalog` from the config file.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Listen address. Overrides `bind_addr`.
    #[arg(long)]
    bind: Option<String>,

    /// Root directory for published files. Overrides `publish_dir`.
    #[arg(long)]
    publish_dir: Option<PathBuf>,

    /// Cache entry lifetime in seconds. Overrides `cache_ttl_secs`.
    #[arg(long)]
    cache_ttl_secs: Option<u64>,

    /// List bulk representations in resource discovery.
    #[arg(long)]
    bulk_load_supported: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let Some(path) = config.catalog.clone() else {
        bail!("No catalog specified. Use --catalog or set `catalog` in the config file.");
    };
    let catalog = Catalog::load(&path)
        .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
    tracing::info!(
        catalog = %path.display(),
        routes = catalog.routes.len(),
        configurations = catalog.configurations.len(),
        "catalog loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let app = build_router(AppState::new(catalog, config));
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;
    tracing::info!("colleague-metadata-server listening on {bind_addr}");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<ProjectConfig> {
    let mut config = match &args.config {
        Some(path) => ProjectConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ProjectConfig::default(),
    };
    if let Some(catalog) = &args.catalog {
        config.catalog = Some(catalog.clone());
    }
    if let Some(bind) = &args.bind {
        config.bind_addr.clone_from(bind);
    }
    if let Some(dir) = &args.publish_dir {
        config.publish_dir.clone_from(dir);
    }
    if let Some(ttl) = args.cache_ttl_secs {
        config.cache_ttl_secs = ttl;
    }
    if args.bulk_load_supported {
        config.bulk_load_supported = true;
    }
    Ok(config)
}
