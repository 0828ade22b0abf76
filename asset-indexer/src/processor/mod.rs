//! Processor module for the asset indexer.
//!
//! Decodes stream messages into asset events.

mod asset_processor;
mod version;

pub use asset_processor::{
    AssetEvent, AssetEventProcessor, Retirement, ASSETS_ENTITY_NAME, IDENTIFIER_METADATA_KEY,
    SUPPORTED_MAJOR_VERSION, TYPE_METADATA_KEY, VERSION_METADATA_KEY,
};
pub use version::is_supported_version;
