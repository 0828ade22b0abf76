//! Kafka consumer configuration for the asset indexer.
//!
//! This crate builds consumers set up for at-least-once delivery: offsets are
//! committed automatically in the background, but only offsets explicitly
//! stored by the application are eligible for commit. A message whose offset
//! was never stored is redelivered after a restart or rebalance.
//!
//! ## Usage
//!
//! ```ignore
//! use asset_indexer_kafka::{create_consumer_with_config, ConsumerConfig};
//!
//! let config = ConsumerConfig::new("localhost:9092", "asset-indexer")
//!     .with_credentials("user".to_string(), "secret".to_string());
//! let consumer = create_consumer_with_config(&config)?;
//! ```

use anyhow::Result;
use rdkafka::config::ClientConfig;

/// Default consumer group.
pub const DEFAULT_GROUP_ID: &str = "asset-indexer";

/// Default SASL mechanism used when credentials are provided.
pub const DEFAULT_SASL_MECHANISM: &str = "SCRAM-SHA-256";

/// Default interval between background commits of stored offsets.
pub const DEFAULT_AUTO_COMMIT_INTERVAL_MS: u32 = 5000;

/// Configuration for creating a Kafka consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Comma-separated bootstrap servers (e.g., "localhost:9092")
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// SASL username (enables SASL/SSL if set)
    pub username: Option<String>,
    /// SASL password (required if username is set)
    pub password: Option<String>,
    /// SASL mechanism, SCRAM-SHA-256 unless overridden
    pub sasl_mechanism: String,
    /// Custom CA certificate in PEM format
    pub ssl_ca_pem: Option<String>,
    pub auto_commit_interval_ms: u32,
}

impl ConsumerConfig {
    /// Create a new ConsumerConfig with the given brokers and group.
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            username: None,
            password: None,
            sasl_mechanism: DEFAULT_SASL_MECHANISM.to_string(),
            ssl_ca_pem: None,
            auto_commit_interval_ms: DEFAULT_AUTO_COMMIT_INTERVAL_MS,
        }
    }

    /// Set SASL credentials.
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    /// Set custom CA certificate.
    pub fn with_ssl_ca(mut self, ca_pem: String) -> Self {
        self.ssl_ca_pem = Some(ca_pem);
        self
    }

    /// Build the rdkafka client configuration.
    ///
    /// Sets:
    /// - background commits of stored offsets only
    /// - `earliest` reset for groups without a committed offset
    /// - SASL/SSL authentication if credentials are provided
    pub fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .set(
                "auto.commit.interval.ms",
                self.auto_commit_interval_ms.to_string(),
            )
            .set("auto.offset.reset", "earliest");

        // Plaintext for local development
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            client_config
                .set("security.protocol", "SASL_SSL")
                .set("sasl.mechanisms", &self.sasl_mechanism)
                .set("sasl.username", username)
                .set("sasl.password", password);

            if let Some(ca_pem) = &self.ssl_ca_pem {
                client_config.set("ssl.ca.pem", ca_pem);
            }
        }

        client_config
    }
}

/// Create a stream consumer with the given configuration.
///
/// The consumer is not subscribed to any topic yet.
pub fn create_consumer_with_config(config: &ConsumerConfig) -> Result<StreamConsumer> {
    Ok(config.client_config().create()?)
}

// Re-export commonly used rdkafka types for convenience
pub use rdkafka::consumer::{Consumer, StreamConsumer};
pub use rdkafka::error::KafkaError;
pub use rdkafka::message::{BorrowedMessage, Headers, Message as KafkaMessage};
pub use rdkafka::{Offset, TopicPartitionList};
