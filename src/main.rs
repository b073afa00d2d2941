//! Banner click counter
//!
//! Accepts clicks over HTTP, aggregates them per banner in memory and writes
//! per-minute counts to ClickHouse:
//! - Bounded intake queue with backpressure
//! - Periodic flush, plus a final flush on shutdown
//! - Stats and banner reads straight from ClickHouse

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use validator::Validate;

use api::{router, AppState};
use clickhouse_client::{ClickHouseClient, ClickHouseConfig, ClickHouseStore};
use telemetry::{init_tracing_from_env, metrics};
use worker::{ClickPipeline, PipelineConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Validate)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    #[validate(nested)]
    pipeline: PipelineConfig,

    #[serde(default)]
    #[validate(nested)]
    clickhouse: ClickHouseConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            pipeline: PipelineConfig::default(),
            clickhouse: ClickHouseConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting banner click counter v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    config.validate().context("Invalid configuration")?;

    info!(
        url = %config.clickhouse.url,
        database = %config.clickhouse.database,
        queue_capacity = config.pipeline.queue_capacity,
        flush_interval_ms = config.pipeline.flush_interval_ms,
        "Loaded config"
    );

    let client = ClickHouseClient::new(config.clickhouse.clone())
        .context("Failed to create ClickHouse client")?;

    clickhouse_client::init_schema(&client)
        .await
        .context("Failed to initialize ClickHouse schema")?;

    let store = Arc::new(ClickHouseStore::new(client));
    if store.ping().await {
        info!("ClickHouse connection: healthy");
    } else {
        warn!("ClickHouse connection: unhealthy");
    }

    let pipeline = ClickPipeline::start(&config.pipeline, store.clone())
        .context("Failed to start click pipeline")?;

    let state = AppState::new(&pipeline, store.clone(), store.clone(), &config.pipeline);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    info!("Shutting down...");

    // Final flush happens whether or not the server exited cleanly
    match pipeline.stop().await {
        Ok(report) => info!(
            received = report.clicks_received,
            flushed = report.clicks_flushed,
            dropped = report.clicks_dropped,
            "Click pipeline stopped"
        ),
        Err(e) => error!("Failed to stop click pipeline: {}", e),
    }

    let snapshot = metrics().snapshot();
    info!(metrics = ?snapshot, "Final metrics");

    served?;
    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("CLICKER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("CLICKER_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Ok(database) = std::env::var("CLICKER_CLICKHOUSE_DATABASE") {
        config.clickhouse.database = database;
    }
    if let Ok(username) = std::env::var("CLICKER_CLICKHOUSE_USERNAME") {
        config.clickhouse.username = Some(username);
    }
    if let Ok(password) = std::env::var("CLICKER_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
