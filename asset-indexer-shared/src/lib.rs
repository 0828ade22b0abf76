//! # Asset Indexer Shared
//!
//! Data structures shared across the asset indexer crates: the temporal graph
//! entities stored in the asset inventory and the asset payload published by
//! the upstream asset stream.

pub mod types;

pub use types::asset_payload::{Annotation, AssetPayload, PayloadTeam};
pub use types::graph::{unexpired, Asset, Owns, ParentOf, Team, UNEXPIRED_TIMESTAMP};
