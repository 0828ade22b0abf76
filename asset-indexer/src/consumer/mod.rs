//! Consumer module for the asset indexer.
//!
//! Provides the reliable at-least-once stream processor and the brokers it
//! reads from.

mod broker;
mod kafka_broker;
mod memory_broker;
mod message;
mod reliable_consumer;

pub use broker::MessageBroker;
pub use kafka_broker::KafkaBroker;
pub use memory_broker::MemoryBroker;
pub use message::{Message, MetadataEntry, Position};
pub use reliable_consumer::{MessageHandler, ReliableConsumer, DEFAULT_POLL_TIMEOUT};
