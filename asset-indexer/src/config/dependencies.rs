//! Dependency initialization and wiring for the asset indexer.

use std::sync::Arc;

use tracing::info;

use asset_indexer_repository::InventoryClient;

use crate::config::Settings;
use crate::consumer::{KafkaBroker, ReliableConsumer};
use crate::loader::GraphLoader;
use crate::orchestrator::{AssetHandler, Orchestrator, OrchestratorConfig};
use crate::processor::{AssetEventProcessor, ASSETS_ENTITY_NAME, SUPPORTED_MAJOR_VERSION};
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator<KafkaBroker>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    pub fn new() -> Result<Self, IndexingError> {
        Self::from_settings(Settings::from_env()?)
    }

    /// Initialize all dependencies from `settings`.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the inventory client or the Kafka consumer cannot be created
    pub fn from_settings(settings: Settings) -> Result<Self, IndexingError> {
        info!(
            kafka_brokers = %settings.kafka.brokers,
            kafka_group_id = %settings.kafka.group_id,
            inventory_endpoint = %settings.inventory.endpoint,
            insecure_skip_verify = settings.inventory.insecure_skip_verify,
            retry_interval_secs = settings.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let store = InventoryClient::new(settings.inventory).map_err(|e| {
            IndexingError::config(format!("Failed to create inventory client: {}", e))
        })?;

        let broker = KafkaBroker::new(&settings.kafka).map_err(|e| {
            IndexingError::config(format!("Failed to create Kafka consumer: {}", e))
        })?;

        let loader = GraphLoader::new(Arc::new(store), settings.aws_account_annotation_key);
        let handler = AssetHandler::new(AssetEventProcessor::new(SUPPORTED_MAJOR_VERSION), loader);
        let consumer = ReliableConsumer::with_poll_timeout(broker, settings.poll_timeout);

        let orchestrator = Orchestrator::new(
            consumer,
            handler,
            OrchestratorConfig {
                entity: ASSETS_ENTITY_NAME.to_string(),
                retry_interval: settings.retry_interval,
            },
        );

        Ok(Self { orchestrator })
    }
}
