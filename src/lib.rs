pub mod api; // HTTP surface
pub mod config;
pub mod db; // Local record store
pub mod ingest; // Wire JSON → PrescriptionRecord
pub mod models;
pub mod reconcile; // Reconciliation engine
pub mod source; // RecordSource seam

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::source::{HttpRecordSource, RecordSource, SqliteRecordSource};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Record store error: {0}")]
    Database(#[from] db::DatabaseError),

    #[error("Record source error: {0}")]
    Source(#[from] source::SourceError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = try_run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Load config, prepare the store, serve until Ctrl-C.
pub fn try_run() -> Result<(), RunError> {
    let config = config::AppConfig::from_env()?;

    {
        let conn = db::open_database(&config.database_path)?;
        if config.seed_on_start {
            db::seed::seed_demo_data(&conn)?;
        }
    }
    tracing::info!(path = %config.database_path.display(), "Record store ready");

    // The blocking HTTP client must be built, and finally dropped, outside
    // the async runtime; this clone outlives it.
    let source: Arc<dyn RecordSource> = match &config.upstream_url {
        Some(url) => {
            tracing::info!(%url, "Timeline records served by upstream record service");
            Arc::new(HttpRecordSource::new(url, config.upstream_timeout_secs)?)
        }
        None => Arc::new(SqliteRecordSource::new(config.database_path.clone())),
    };

    let ctx = ApiContext::new(Arc::clone(&source), config.database_path.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(ctx, config.bind_addr))?;
    drop(runtime);

    drop(source);
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

async fn serve(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<()> {
    let server = api::start_api_server(ctx, addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {e}");
    }
    server.stop().await;
    Ok(())
}
