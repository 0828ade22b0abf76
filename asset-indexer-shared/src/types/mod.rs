//! Graph entities and upstream payload types.

pub mod asset_payload;
pub mod graph;
