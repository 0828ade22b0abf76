//! REST implementation of [`GraphStore`](crate::GraphStore) backed by the
//! asset inventory API.

mod client;
mod urls;

pub use client::InventoryClient;
pub use urls::InventoryUrls;
