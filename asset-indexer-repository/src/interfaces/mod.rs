//! Interface definitions for the graph store.
//!
//! The [`GraphStore`] trait allows the reconciliation engine to be wired to the
//! REST client in production and to an in-memory store in tests.

mod graph_store;

pub use graph_store::GraphStore;
