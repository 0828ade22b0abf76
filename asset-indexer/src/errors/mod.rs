//! Error types for the asset indexer ingest.

use thiserror::Error;

use crate::consumer::Position;
use asset_indexer_repository::GraphStoreError;

/// Errors that can occur in the asset indexer ingest.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// A required metadata entry is absent or empty.
    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    /// Error parsing or decoding data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// An account annotation is neither a bare account ID nor an account ARN.
    #[error("Invalid AWS account: {0}")]
    InvalidAwsAccount(String),

    /// More than one entity matched a key that must be unique.
    #[error("Duplicated {kind}: {key}")]
    Duplicated { kind: &'static str, key: String },

    /// Error from the graph store.
    #[error("Graph store error: {0}")]
    GraphStore(#[from] GraphStoreError),

    /// A message handler failed.
    #[error("Error processing message at {position}: {source}")]
    Processing {
        position: Position,
        source: Box<IngestError>,
    },
}

impl IngestError {
    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }

    /// Create a missing metadata error.
    pub fn missing_metadata(key: impl Into<String>) -> Self {
        Self::MissingMetadata(key.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a duplicated entity error.
    pub fn duplicated(kind: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicated {
            kind,
            key: key.into(),
        }
    }

    /// Wrap a handler error with the position of the message that caused it.
    pub fn processing(position: Position, source: IngestError) -> Self {
        Self::Processing {
            position,
            source: Box::new(source),
        }
    }
}

impl From<asset_indexer_kafka::KafkaError> for IngestError {
    fn from(err: asset_indexer_kafka::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}
