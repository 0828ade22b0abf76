//! Loader module for the asset indexer.
//!
//! Reconciles decoded asset events into the temporal asset graph.

mod aws_account;
mod graph_loader;

pub use aws_account::{normalize_aws_account_id, AWS_ACCOUNT_ASSET_TYPE};
pub use graph_loader::GraphLoader;
