//! At-least-once stream processing.
//!
//! A message's position is stored only after its handler returns `Ok`, so a
//! failed or interrupted message is always delivered again.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::consumer::{Message, MessageBroker};
use crate::errors::IngestError;
use crate::shutdown::Shutdown;

/// Default bounded wait for a single poll.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Handles one message at a time, in delivery order.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &Message) -> Result<(), IngestError>;
}

/// Reliable stream processor on top of a [`MessageBroker`].
pub struct ReliableConsumer<B> {
    broker: B,
    poll_timeout: Duration,
}

impl<B: MessageBroker> ReliableConsumer<B> {
    pub fn new(broker: B) -> Self {
        Self::with_poll_timeout(broker, DEFAULT_POLL_TIMEOUT)
    }

    pub fn with_poll_timeout(broker: B, poll_timeout: Duration) -> Self {
        Self {
            broker,
            poll_timeout,
        }
    }

    /// Subscribe to `entity` and feed every message to `handler` until
    /// `shutdown` is triggered or an error occurs.
    ///
    /// The signal is checked before every poll and never interrupts a running
    /// handler, so shutdown latency is bounded by the poll timeout plus the
    /// handler in flight.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The signal was triggered
    /// * `Err(IngestError::Processing)` - The handler failed; the message's
    ///   position was not stored
    /// * `Err(IngestError)` - The broker failed
    #[instrument(skip(self, shutdown, handler))]
    pub async fn process<H>(
        &mut self,
        shutdown: &Shutdown,
        entity: &str,
        handler: &H,
    ) -> Result<(), IngestError>
    where
        H: MessageHandler + ?Sized,
    {
        self.broker
            .subscribe(entity)
            .map_err(|e| broker_error("failed to subscribe", entity, e))?;

        loop {
            if shutdown.is_triggered() {
                info!(entity = %entity, "Stopping stream processing");
                return Ok(());
            }

            let polled = self
                .broker
                .poll(self.poll_timeout)
                .await
                .map_err(|e| broker_error("error reading message", entity, e))?;
            let Some(message) = polled else {
                continue;
            };

            debug!(
                position = %message.position,
                tombstone = message.is_tombstone(),
                "Handling message"
            );

            handler
                .handle(&message)
                .await
                .map_err(|e| IngestError::processing(message.position.clone(), e))?;

            self.broker
                .store_position(&message.position)
                .map_err(|e| broker_error("error storing offset", entity, e))?;
        }
    }
}

/// Prefix a broker failure with the step and entity it happened on.
fn broker_error(step: &str, entity: &str, err: IngestError) -> IngestError {
    let reason = match err {
        IngestError::KafkaError(reason) => reason,
        other => other.to_string(),
    };
    IngestError::kafka(format!("{} on {}: {}", step, entity, reason))
}
