//! Orchestrator module for the asset indexer.
//!
//! Drives the reliable consumer with the asset handler and restarts it after
//! failures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::consumer::{Message, MessageBroker, MessageHandler, ReliableConsumer};
use crate::errors::IngestError;
use crate::loader::GraphLoader;
use crate::processor::{AssetEvent, AssetEventProcessor, ASSETS_ENTITY_NAME};
use crate::shutdown::Shutdown;

/// Default delay before restarting a failed processing run.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Stream entity to consume.
    pub entity: String,
    /// Delay before restarting after an error. Zero disables retries.
    pub retry_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            entity: ASSETS_ENTITY_NAME.to_string(),
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Counters updated by [`AssetHandler`].
#[derive(Debug, Default)]
pub struct IngestStats {
    handled: AtomicU64,
    skipped: AtomicU64,
    upserts: AtomicU64,
    retirements: AtomicU64,
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Messages handled successfully, skipped ones included.
    pub handled: u64,
    /// Messages skipped for an unsupported schema version.
    pub skipped: u64,
    pub upserts: u64,
    pub retirements: u64,
}

impl IngestStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            handled: self.handled.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            upserts: self.upserts.load(Ordering::Relaxed),
            retirements: self.retirements.load(Ordering::Relaxed),
        }
    }
}

/// Message handler decoding asset events and loading them into the graph.
pub struct AssetHandler {
    processor: AssetEventProcessor,
    loader: GraphLoader,
    stats: Arc<IngestStats>,
}

impl AssetHandler {
    pub fn new(processor: AssetEventProcessor, loader: GraphLoader) -> Self {
        Self {
            processor,
            loader,
            stats: Arc::new(IngestStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<IngestStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl MessageHandler for AssetHandler {
    async fn handle(&self, message: &Message) -> Result<(), IngestError> {
        match self.processor.process(message)? {
            None => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Some(event) => {
                self.loader.load(&event).await?;
                let counter = match event {
                    AssetEvent::Upsert(_) => &self.stats.upserts,
                    AssetEvent::Retire(_) => &self.stats.retirements,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.stats.handled.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Orchestrator that runs the ingest until shutdown.
///
/// A failed run is logged and, unless retries are disabled, restarted after
/// the retry interval from the last stored position.
pub struct Orchestrator<B> {
    consumer: ReliableConsumer<B>,
    handler: AssetHandler,
    config: OrchestratorConfig,
}

impl<B: MessageBroker> Orchestrator<B> {
    /// Create a new orchestrator with the given components.
    pub fn new(
        consumer: ReliableConsumer<B>,
        handler: AssetHandler,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            consumer,
            handler,
            config,
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.handler.stats.snapshot()
    }

    /// Run the orchestrator.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - `shutdown` was triggered
    /// * `Err(IngestError)` - A run failed and retries are disabled
    #[instrument(skip_all, fields(entity = %self.config.entity))]
    pub async fn run(&mut self, shutdown: &Shutdown) -> Result<(), IngestError> {
        info!(
            retry_interval_ms = self.config.retry_interval.as_millis() as u64,
            "Starting asset indexer orchestrator"
        );

        loop {
            let result = self
                .consumer
                .process(shutdown, &self.config.entity, &self.handler)
                .await;
            self.log_stats();

            let error = match result {
                Ok(()) => {
                    info!("Asset indexer orchestrator stopped");
                    return Ok(());
                }
                Err(e) => e,
            };

            error!(error = %error, "Stream processing failed");
            if self.config.retry_interval.is_zero() {
                return Err(error);
            }

            warn!(
                retry_interval_ms = self.config.retry_interval.as_millis() as u64,
                "Restarting stream processing after delay"
            );
            tokio::select! {
                _ = shutdown.triggered() => {
                    info!("Shutdown requested while waiting to retry");
                    return Ok(());
                }
                _ = sleep(self.config.retry_interval) => {}
            }
        }
    }

    fn log_stats(&self) {
        let stats = self.stats();
        info!(
            handled = stats.handled,
            skipped = stats.skipped,
            upserts = stats.upserts,
            retirements = stats.retirements,
            "Processing run ended"
        );
    }
}
