//! Asset event decoding.
//!
//! Validates message metadata, applies the version gate, and turns the
//! message into an upsert (JSON payload) or a retirement (tombstone).

use std::str;

use tracing::{debug, instrument};

use asset_indexer_shared::AssetPayload;

use crate::consumer::Message;
use crate::errors::IngestError;
use crate::processor::is_supported_version;

/// Major schema version this indexer understands.
pub const SUPPORTED_MAJOR_VERSION: u64 = 0;

/// Stream entity carrying asset events.
pub const ASSETS_ENTITY_NAME: &str = "assets-v0";

pub const VERSION_METADATA_KEY: &str = "version";
pub const TYPE_METADATA_KEY: &str = "type";
pub const IDENTIFIER_METADATA_KEY: &str = "identifier";

/// A decoded asset event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    /// The asset exists and is owned by the payload's team.
    Upsert(AssetPayload),
    /// The asset is no longer owned by the team named in the message key.
    Retire(Retirement),
}

/// Identity carried by a tombstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retirement {
    pub asset_type: String,
    pub identifier: String,
    /// Business identifier of the team giving up the asset.
    pub team_id: String,
    /// Upstream asset ID.
    pub asset_id: String,
}

/// Processor that decodes stream messages into asset events.
#[derive(Debug, Clone)]
pub struct AssetEventProcessor {
    supported_major: u64,
}

impl Default for AssetEventProcessor {
    fn default() -> Self {
        Self::new(SUPPORTED_MAJOR_VERSION)
    }
}

impl AssetEventProcessor {
    pub fn new(supported_major: u64) -> Self {
        Self { supported_major }
    }

    /// Decode a single message.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(AssetEvent))` - The event to reconcile
    /// * `Ok(None)` - The schema version is not supported; skip the message
    /// * `Err(IngestError)` - Missing metadata, or a malformed payload or key
    #[instrument(skip(self, message), fields(position = %message.position))]
    pub fn process(&self, message: &Message) -> Result<Option<AssetEvent>, IngestError> {
        let version = required_metadata(message, VERSION_METADATA_KEY)?;
        let asset_type = required_metadata(message, TYPE_METADATA_KEY)?;
        let identifier = required_metadata(message, IDENTIFIER_METADATA_KEY)?;

        if !is_supported_version(version, self.supported_major) {
            debug!(
                version = %version,
                supported_major = self.supported_major,
                "Skipping message with unsupported version"
            );
            return Ok(None);
        }

        let event = match &message.value {
            Some(value) => {
                let payload: AssetPayload = serde_json::from_slice(value).map_err(|e| {
                    IngestError::parse(format!(
                        "could not decode asset {} {}: {}",
                        asset_type, identifier, e
                    ))
                })?;
                validate_payload(&payload)?;
                AssetEvent::Upsert(payload)
            }
            None => {
                let (team_id, asset_id) = parse_message_key(&message.key)?;
                AssetEvent::Retire(Retirement {
                    asset_type: asset_type.to_string(),
                    identifier: identifier.to_string(),
                    team_id,
                    asset_id,
                })
            }
        };

        Ok(Some(event))
    }
}

/// The fields that key graph entities must be present.
fn validate_payload(payload: &AssetPayload) -> Result<(), IngestError> {
    let fields = [
        ("asset_type", &payload.asset_type),
        ("identifier", &payload.identifier),
        ("team.id", &payload.team.id),
    ];
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some((field, _)) => Err(IngestError::parse(format!(
            "asset payload without {}",
            field
        ))),
        None => Ok(()),
    }
}

/// Last non-empty value of the metadata entry `key`.
fn required_metadata<'a>(message: &'a Message, key: &str) -> Result<&'a str, IngestError> {
    let value = message
        .metadata_value(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| IngestError::missing_metadata(key))?;

    str::from_utf8(value)
        .map_err(|e| IngestError::parse(format!("metadata {} is not UTF-8: {}", key, e)))
}

/// Split a tombstone key of the form `<team_id>/<asset_id>`.
fn parse_message_key(key: &[u8]) -> Result<(String, String), IngestError> {
    let key = str::from_utf8(key)
        .map_err(|e| IngestError::parse(format!("message key is not UTF-8: {}", e)))?;

    let mut parts = key.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(team_id), Some(asset_id), None) => Ok((team_id.to_string(), asset_id.to_string())),
        _ => Err(IngestError::parse(format!("invalid message key: {:?}", key))),
    }
}
