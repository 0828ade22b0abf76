//! Error types for the asset indexer repository.

mod graph_store_error;

pub use graph_store_error::GraphStoreError;
