//! Helpers shared by the integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use asset_indexer::consumer::{MemoryBroker, MetadataEntry, Position, ReliableConsumer};
use asset_indexer::errors::IngestError;
use asset_indexer::loader::GraphLoader;
use asset_indexer::orchestrator::{AssetHandler, Orchestrator, OrchestratorConfig};
use asset_indexer::processor::{
    AssetEventProcessor, ASSETS_ENTITY_NAME, IDENTIFIER_METADATA_KEY, TYPE_METADATA_KEY,
    VERSION_METADATA_KEY,
};
use asset_indexer::shutdown;
use asset_indexer_repository::{GraphStore, InMemoryGraphStore};

pub const ACCOUNT_KEY: &str = "discovery/aws/account";

pub const FIXTURE: &str = include_str!("../testdata/asset_events.json");

pub fn metadata(version: &str, asset_type: &str, identifier: &str) -> Vec<MetadataEntry> {
    vec![
        MetadataEntry::new(VERSION_METADATA_KEY, version),
        MetadataEntry::new(TYPE_METADATA_KEY, asset_type),
        MetadataEntry::new(IDENTIFIER_METADATA_KEY, identifier),
    ]
}

/// Tombstone key for `identifier`, which stands in for the upstream asset ID.
fn message_key(team_id: &str, identifier: &str) -> String {
    format!("{}/{}", team_id, identifier.replace('/', "_"))
}

/// Publish an upsert for `identifier` owned by `team_id`.
pub fn publish_upsert(
    broker: &MemoryBroker,
    asset_type: &str,
    identifier: &str,
    team_id: &str,
    accounts: &[&str],
) -> Position {
    let annotations: Vec<Value> = accounts
        .iter()
        .map(|account| serde_json::json!({"key": ACCOUNT_KEY, "value": account}))
        .collect();
    let payload = serde_json::json!({
        "id": identifier,
        "team": {"id": team_id, "name": format!("Team {}", team_id)},
        "asset_type": asset_type,
        "identifier": identifier,
        "annotations": annotations,
    });

    broker.publish(
        ASSETS_ENTITY_NAME,
        message_key(team_id, identifier),
        Some(serde_json::to_vec(&payload).unwrap()),
        metadata("0.1.0", asset_type, identifier),
    )
}

/// Publish a tombstone ending `team_id`'s ownership of `identifier`.
pub fn publish_retirement(
    broker: &MemoryBroker,
    asset_type: &str,
    identifier: &str,
    team_id: &str,
) -> Position {
    broker.publish(
        ASSETS_ENTITY_NAME,
        message_key(team_id, identifier),
        None,
        metadata("0.1.0", asset_type, identifier),
    )
}

/// Publish the fixture events, optionally only a range of them.
pub fn publish_fixture(broker: &MemoryBroker, range: std::ops::Range<usize>) {
    let events: Vec<Value> = serde_json::from_str(FIXTURE).unwrap();
    for event in &events[range] {
        let value = match &event["value"] {
            Value::Null => None,
            payload => Some(serde_json::to_vec(payload).unwrap()),
        };
        broker.publish(
            ASSETS_ENTITY_NAME,
            event["key"].as_str().unwrap(),
            value,
            metadata(
                event["version"].as_str().unwrap(),
                event["type"].as_str().unwrap(),
                event["identifier"].as_str().unwrap(),
            ),
        );
    }
}

pub fn fixture_len() -> usize {
    serde_json::from_str::<Vec<Value>>(FIXTURE).unwrap().len()
}

pub fn orchestrator(
    broker: &MemoryBroker,
    store: Arc<dyn GraphStore>,
    retry_interval: Duration,
) -> Orchestrator<MemoryBroker> {
    let loader = GraphLoader::new(store, ACCOUNT_KEY);
    let handler = AssetHandler::new(AssetEventProcessor::default(), loader);
    let consumer = ReliableConsumer::with_poll_timeout(broker.clone(), Duration::from_millis(10));

    Orchestrator::new(
        consumer,
        handler,
        OrchestratorConfig {
            entity: ASSETS_ENTITY_NAME.to_string(),
            retry_interval,
        },
    )
}

/// Run until every published message has been consumed.
pub async fn run_until_drained(
    orchestrator: &mut Orchestrator<MemoryBroker>,
    broker: &MemoryBroker,
) -> Result<(), IngestError> {
    let (trigger, shutdown) = shutdown::channel();
    broker.stop_when_drained(trigger);
    orchestrator.run(&shutdown).await
}

/// Graph state without IDs or timestamps, sorted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    /// `(type, identifier, live)`
    pub assets: Vec<(String, String, bool)>,
    /// `(identifier, name)`
    pub teams: Vec<(String, String)>,
    /// `(team identifier, asset identifier, active)`
    pub owns: Vec<(String, String, bool)>,
    /// `(child identifier, parent identifier, live)`
    pub parents: Vec<(String, String, bool)>,
}

pub async fn snapshot(store: &InMemoryGraphStore) -> GraphSnapshot {
    let assets = store.all_assets().await;
    let teams = store.all_teams().await;
    let asset_names: HashMap<_, _> = assets
        .iter()
        .map(|a| (a.id.clone(), a.identifier.clone()))
        .collect();
    let team_names: HashMap<_, _> = teams
        .iter()
        .map(|t| (t.id.clone(), t.identifier.clone()))
        .collect();

    let mut snapshot = GraphSnapshot {
        assets: assets
            .iter()
            .map(|a| (a.asset_type.clone(), a.identifier.clone(), a.is_unexpired()))
            .collect(),
        teams: teams
            .iter()
            .map(|t| (t.identifier.clone(), t.name.clone()))
            .collect(),
        owns: store
            .all_owns()
            .await
            .iter()
            .map(|o| {
                (
                    team_names[&o.team_id].clone(),
                    asset_names[&o.asset_id].clone(),
                    o.is_active(),
                )
            })
            .collect(),
        parents: store
            .all_parents()
            .await
            .iter()
            .map(|p| {
                (
                    asset_names[&p.child_id].clone(),
                    asset_names[&p.parent_id].clone(),
                    p.expiration == asset_indexer_shared::unexpired(),
                )
            })
            .collect(),
    };
    snapshot.assets.sort();
    snapshot.teams.sort();
    snapshot.owns.sort();
    snapshot.parents.sort();
    snapshot
}

pub fn entry<A: Into<String>, B: Into<String>>(a: A, b: B, flag: bool) -> (String, String, bool) {
    (a.into(), b.into(), flag)
}
