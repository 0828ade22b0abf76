//! Broker abstraction consumed by the reliable stream processor.

use std::time::Duration;

use async_trait::async_trait;

use crate::consumer::{Message, Position};
use crate::errors::IngestError;

/// Abstracts the underlying message broker (Kafka, in-memory, etc.).
///
/// Implementations are injected into [`ReliableConsumer`](crate::consumer::ReliableConsumer)
/// to enable easy testing with an in-memory broker.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Subscribe to `entity`, replacing any existing subscription.
    ///
    /// Reading resumes from the last committed position of the consumer group.
    fn subscribe(&self, entity: &str) -> Result<(), IngestError>;

    /// Wait up to `timeout` for the next message.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Message))` - The next message in delivery order
    /// * `Ok(None)` - No message arrived within `timeout`
    /// * `Err(IngestError)` - A broker error other than a timeout
    async fn poll(&self, timeout: Duration) -> Result<Option<Message>, IngestError>;

    /// Mark `position` as handled so it is included in the next commit.
    ///
    /// Storing does not commit synchronously; a crash before the commit is
    /// flushed causes redelivery.
    fn store_position(&self, position: &Position) -> Result<(), IngestError>;
}
