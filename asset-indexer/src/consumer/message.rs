//! Message types exchanged between brokers and handlers.

use std::fmt;

/// A key/value metadata entry attached to a message (a Kafka header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Where a message lives in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl Position {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]@{}", self.topic, self.partition, self.offset)
    }
}

/// A message read from the stream.
///
/// `value == None` is a tombstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
    /// Metadata entries in the order the broker delivered them.
    pub metadata: Vec<MetadataEntry>,
    pub position: Position,
}

impl Message {
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }

    /// Value of the last metadata entry named `key`, if any.
    pub fn metadata_value(&self, key: &str) -> Option<&[u8]> {
        self.metadata
            .iter()
            .rev()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_slice())
    }
}
