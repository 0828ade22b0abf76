//! In-memory [`MessageBroker`] for tests and local runs.
//!
//! Models a single-partition topic per entity with consumer-group commit
//! semantics: a subscription starts reading at the last stored position.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::consumer::{Message, MessageBroker, MetadataEntry, Position};
use crate::errors::IngestError;
use crate::shutdown::ShutdownTrigger;

#[derive(Debug, Default)]
struct BrokerState {
    topics: HashMap<String, Vec<Message>>,
    subscription: Option<String>,
    cursor: usize,
    /// Next offset to read per topic, as committed by the group.
    committed: HashMap<String, i64>,
    poll_failures: VecDeque<String>,
    store_failures: VecDeque<String>,
    subscriptions: usize,
    on_drained: Option<ShutdownTrigger>,
}

/// Ordered in-memory topics. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message to `topic` and return its position.
    pub fn publish(
        &self,
        topic: &str,
        key: impl Into<Vec<u8>>,
        value: Option<Vec<u8>>,
        metadata: Vec<MetadataEntry>,
    ) -> Position {
        let mut state = self.state();
        let messages = state.topics.entry(topic.to_string()).or_default();
        let position = Position::new(topic, 0, messages.len() as i64);
        messages.push(Message {
            key: key.into(),
            value,
            metadata,
            position: position.clone(),
        });
        position
    }

    /// Make the next poll fail with a broker error.
    pub fn fail_next_poll(&self, reason: impl Into<String>) {
        self.state().poll_failures.push_back(reason.into());
    }

    /// Make the next position store fail with a broker error.
    pub fn fail_next_store(&self, reason: impl Into<String>) {
        self.state().store_failures.push_back(reason.into());
    }

    /// Fire `trigger` the first time a poll finds no message left.
    pub fn stop_when_drained(&self, trigger: ShutdownTrigger) {
        self.state().on_drained = Some(trigger);
    }

    /// Next offset the group would read from `topic`.
    pub fn committed(&self, topic: &str) -> Option<i64> {
        self.state().committed.get(topic).copied()
    }

    /// Move the committed position of `topic` back to `next_offset`, as if
    /// later commits were lost in a crash.
    pub fn rewind(&self, topic: &str, next_offset: i64) {
        self.state().committed.insert(topic.to_string(), next_offset);
    }

    /// Number of times a subscription was made.
    pub fn subscriptions(&self) -> usize {
        self.state().subscriptions
    }
}

#[async_trait]
impl MessageBroker for MemoryBroker {
    fn subscribe(&self, entity: &str) -> Result<(), IngestError> {
        let mut state = self.state();
        state.cursor = state.committed.get(entity).copied().unwrap_or(0) as usize;
        state.subscription = Some(entity.to_string());
        state.subscriptions += 1;
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Result<Option<Message>, IngestError> {
        {
            let mut state = self.state();
            if let Some(reason) = state.poll_failures.pop_front() {
                return Err(IngestError::kafka(reason));
            }

            let topic = state
                .subscription
                .clone()
                .ok_or_else(|| IngestError::kafka("poll without subscription"))?;
            let cursor = state.cursor;
            let next = state
                .topics
                .get(&topic)
                .and_then(|messages| messages.get(cursor))
                .cloned();

            if let Some(message) = next {
                state.cursor += 1;
                return Ok(Some(message));
            }

            if let Some(trigger) = state.on_drained.take() {
                trigger.trigger();
            }
        }

        tokio::time::sleep(timeout).await;
        Ok(None)
    }

    fn store_position(&self, position: &Position) -> Result<(), IngestError> {
        let mut state = self.state();
        if let Some(reason) = state.store_failures.pop_front() {
            return Err(IngestError::kafka(reason));
        }
        state
            .committed
            .insert(position.topic.clone(), position.offset + 1);
        Ok(())
    }
}
