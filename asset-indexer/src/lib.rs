//! # Asset Indexer
//!
//! Consumes asset lifecycle events from Kafka and reconciles them into the
//! temporal asset graph kept by the asset inventory.
//!
//! ## Architecture
//!
//! The indexer follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Reads messages with at-least-once delivery
//! 2. **Processor**: Decodes messages into asset upserts and retirements
//! 3. **Loader**: Applies them to the graph store
//! 4. **Orchestrator**: Runs the ingest and retries failed runs
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`consumer`]: Brokers and the reliable stream processor
//! - [`processor`]: Asset event decoding and version gating
//! - [`loader`]: Graph reconciliation
//! - [`orchestrator`]: Driver loop and message handler
//! - [`shutdown`]: Cancellation signal
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod shutdown;

pub use config::{Dependencies, Settings};
pub use errors::IngestError;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
