//! # Asset Indexer Repository
//!
//! This crate provides the [`GraphStore`] abstraction over the temporal asset
//! graph, a REST implementation backed by the asset inventory API
//! ([`InventoryClient`]), and an in-memory implementation used by tests and
//! local runs ([`InMemoryGraphStore`]).

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod inventory;
pub mod memory;
pub mod types;

pub use config::InventoryConfig;
pub use errors::GraphStoreError;
pub use interfaces::GraphStore;
pub use inventory::InventoryClient;
pub use memory::InMemoryGraphStore;
pub use types::{AssetFilter, AssetRequest, OwnsRequest, Pagination, ParentOfRequest, TeamRequest};
