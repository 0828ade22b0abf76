//! Kafka-backed [`MessageBroker`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use asset_indexer_kafka::{
    create_consumer_with_config, BorrowedMessage, Consumer, ConsumerConfig, Headers, KafkaMessage,
    Offset, StreamConsumer, TopicPartitionList,
};

use crate::consumer::{Message, MessageBroker, MetadataEntry, Position};
use crate::errors::IngestError;

/// Broker reading from a Kafka consumer group.
///
/// The consumer stores offsets explicitly and lets librdkafka commit them in
/// the background, see [`asset_indexer_kafka`].
pub struct KafkaBroker {
    consumer: StreamConsumer,
}

impl KafkaBroker {
    /// Create a new Kafka broker.
    ///
    /// # Arguments
    ///
    /// * `config` - Brokers, consumer group and credentials
    ///
    /// # Returns
    ///
    /// * `Ok(KafkaBroker)` - A new broker, not yet subscribed
    /// * `Err(IngestError)` - If consumer creation fails
    pub fn new(config: &ConsumerConfig) -> Result<Self, IngestError> {
        let consumer =
            create_consumer_with_config(config).map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            sasl = config.username.is_some(),
            "Created Kafka consumer"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageBroker for KafkaBroker {
    fn subscribe(&self, entity: &str) -> Result<(), IngestError> {
        // Dropping the assignment makes a resubscription restart from the
        // committed offsets instead of the local fetch position.
        self.consumer.unsubscribe();
        self.consumer.subscribe(&[entity])?;

        info!(entity = %entity, "Subscribed to Kafka topic");
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Result<Option<Message>, IngestError> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Ok(received) => Ok(Some(to_message(&received?))),
            Err(_) => Ok(None),
        }
    }

    fn store_position(&self, position: &Position) -> Result<(), IngestError> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &position.topic,
            position.partition,
            Offset::Offset(position.offset + 1),
        )?;
        self.consumer.store_offsets(&tpl)?;

        debug!(position = %position, "Stored offset");
        Ok(())
    }
}

fn to_message(msg: &BorrowedMessage<'_>) -> Message {
    let metadata = msg
        .headers()
        .map(|headers| {
            headers
                .iter()
                .map(|header| MetadataEntry::new(header.key, header.value.unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default();

    Message {
        key: msg.key().map(<[u8]>::to_vec).unwrap_or_default(),
        value: msg.payload().map(<[u8]>::to_vec),
        metadata,
        position: Position::new(msg.topic(), msg.partition(), msg.offset()),
    }
}
