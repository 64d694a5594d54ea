//! jfed-search - federated journal search service
//!
//! Serves `POST /api/journals/search` over a directory of read-only SQLite
//! stores, one file per publisher or registry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use jfed_common::config::{
    load_toml_config, locate_config_file, ConfigOverrides, Environment, ServiceConfig,
    DEFAULT_LOG_LEVEL,
};
use jfed_search::db::SqliteExecutor;
use jfed_search::federation::FederationEngine;
use jfed_search::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "jfed-search")]
#[command(about = "Federated journal search over per-publisher SQLite stores")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "JFED_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the store files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Runtime environment (production or development)
    #[arg(short, long)]
    environment: Option<Environment>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise the config file's level, otherwise info
    let log_level = locate_config_file(args.config.as_deref())
        .and_then(|path| load_toml_config(&path).ok())
        .and_then(|toml| toml.log_level)
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    // Build identification first, before any store is touched
    info!(
        "Starting jfed-search v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = ServiceConfig::resolve(&ConfigOverrides {
        config_file: args.config,
        data_dir: args.data_dir,
        host: args.host,
        port: args.port,
        environment: args.environment,
    });
    info!(
        data_dir = %config.data_dir.display(),
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        environment = ?config.environment,
        "Configuration resolved"
    );

    let executor = SqliteExecutor::open_dir(&config.data_dir, config.store_timeout).await;
    let engine = FederationEngine::new(Arc::new(executor), config.store_timeout);
    let app = build_router(AppState::new(engine, config.environment));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("jfed-search listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
