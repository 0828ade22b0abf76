//! Asset Indexer Main Entry Point
//!
//! Consumes asset events from Kafka and reconciles them into the asset
//! inventory graph until interrupted.

use std::env;

use asset_indexer::{shutdown, Dependencies, IndexingError};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL`. `LOG_FORMAT=json` switches
/// to JSON output.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())))
        .map_err(|e| IndexingError::config(format!("Invalid log level: {}", e)))?;

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
    };
    result.map_err(|e| IndexingError::config(format!("Failed to initialize tracing: {}", e)))?;

    info!(
        service_name = "asset-indexer",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting asset indexer");

    let mut deps = match Dependencies::new() {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let (trigger, shutdown) = shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                trigger.trigger();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    match deps.orchestrator.run(&shutdown).await {
        Ok(()) => {
            info!("Asset indexer stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Asset indexer failed");
            Err(e.into())
        }
    }
}
