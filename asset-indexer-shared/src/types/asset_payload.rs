//! Asset payload published on the upstream asset stream.
//!
//! Only `asset_type`, `identifier`, `team` and `annotations` drive graph
//! mutations. The remaining fields are decoded so that the payload can be
//! logged in full.

use serde::{Deserialize, Serialize};

/// The body of a non-tombstone asset event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssetPayload {
    /// Upstream asset ID. Unrelated to the graph store's internal IDs.
    pub id: String,
    pub team: PayloadTeam,
    pub alias: String,
    pub rolfp: String,
    pub scannable: bool,
    pub asset_type: String,
    pub identifier: String,
    pub annotations: Vec<Annotation>,
}

impl AssetPayload {
    /// Annotations whose key equals `key`, in payload order.
    pub fn annotations_with_key<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.annotations.iter().filter(move |a| a.key == key)
    }
}

/// The team that owns the asset, as described by the upstream stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PayloadTeam {
    /// Business identifier of the team.
    pub id: String,
    pub name: String,
    pub description: String,
    pub tag: String,
}

/// A free-form key/value annotation attached to an asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}
