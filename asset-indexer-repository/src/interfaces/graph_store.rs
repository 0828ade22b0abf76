//! Graph store trait definition.
//!
//! This module defines the abstract interface over the temporal asset graph,
//! allowing the reconciliation logic to run against the asset inventory REST
//! API or against an in-memory store in tests.

use async_trait::async_trait;

use asset_indexer_shared::{Asset, Owns, ParentOf, Team};

use crate::errors::GraphStoreError;
use crate::types::{AssetFilter, AssetRequest, OwnsRequest, Pagination, ParentOfRequest, TeamRequest};

/// Abstracts the underlying graph store implementation.
///
/// Implementations are injected into the loader to enable dependency injection
/// and easy testing with an in-memory store.
///
/// All methods return `Result<T, GraphStoreError>` for consistent error handling
/// across different backend implementations.
///
/// # Uniqueness
///
/// Assets are unique by `(asset_type, identifier)` and teams by `identifier`.
/// `create_*` methods fail with [`GraphStoreError::AlreadyExists`] when the key
/// is taken. Edges are unique by their endpoints and are upserted.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// List teams, optionally restricted to a business identifier.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Team identifier to match, `None` lists every team
    /// * `pagination` - Page to return, disabled pagination returns all teams
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Team>)` - Matching teams, possibly empty
    /// * `Err(GraphStoreError)` - If the request fails
    async fn teams(
        &self,
        identifier: Option<&str>,
        pagination: Pagination,
    ) -> Result<Vec<Team>, GraphStoreError>;

    /// Create a team.
    ///
    /// # Returns
    ///
    /// * `Ok(Team)` - The created team with its store ID
    /// * `Err(GraphStoreError::AlreadyExists)` - If the identifier is taken
    async fn create_team(&self, request: &TeamRequest) -> Result<Team, GraphStoreError>;

    /// Update the team with store ID `id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Team)` - The updated team
    /// * `Err(GraphStoreError::NotFound)` - If no team has that ID
    async fn update_team(&self, id: &str, request: &TeamRequest) -> Result<Team, GraphStoreError>;

    /// List assets matching `filter`.
    ///
    /// # Arguments
    ///
    /// * `filter` - Type, identifier and validity constraints
    /// * `pagination` - Page to return, disabled pagination returns all assets
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Asset>)` - Matching assets, possibly empty
    /// * `Err(GraphStoreError)` - If the request fails
    async fn assets(
        &self,
        filter: &AssetFilter,
        pagination: Pagination,
    ) -> Result<Vec<Asset>, GraphStoreError>;

    /// Create an asset.
    ///
    /// # Returns
    ///
    /// * `Ok(Asset)` - The created asset with its store ID
    /// * `Err(GraphStoreError::AlreadyExists)` - If the `(type, identifier)` key is taken
    async fn create_asset(&self, request: &AssetRequest) -> Result<Asset, GraphStoreError>;

    /// Update the asset with store ID `id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Asset)` - The updated asset
    /// * `Err(GraphStoreError::NotFound)` - If no asset has that ID
    async fn update_asset(&self, id: &str, request: &AssetRequest)
        -> Result<Asset, GraphStoreError>;

    /// List the "owns" edges pointing at an asset, active or ended.
    async fn owners(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<Owns>, GraphStoreError>;

    /// Create or replace the "owns" edge between `team_id` and `asset_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Owns)` - The stored edge
    /// * `Err(GraphStoreError::NotFound)` - If either endpoint does not exist
    async fn upsert_owner(
        &self,
        asset_id: &str,
        team_id: &str,
        request: &OwnsRequest,
    ) -> Result<Owns, GraphStoreError>;

    /// List the "parent of" edges where `asset_id` is the child.
    async fn parents(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ParentOf>, GraphStoreError>;

    /// List the "parent of" edges where `asset_id` is the parent.
    async fn children(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ParentOf>, GraphStoreError>;

    /// Create or refresh the "parent of" edge from `parent_id` to `child_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(ParentOf)` - The stored edge
    /// * `Err(GraphStoreError::NotFound)` - If either endpoint does not exist
    async fn upsert_parent(
        &self,
        child_id: &str,
        parent_id: &str,
        request: &ParentOfRequest,
    ) -> Result<ParentOf, GraphStoreError>;
}
