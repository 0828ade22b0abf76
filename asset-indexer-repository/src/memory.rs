//! In-memory [`GraphStore`] used by tests and local runs.
//!
//! Uniqueness, `NotFound` and `AlreadyExists` behave as the inventory API
//! does. The `seed_*` helpers bypass those checks so tests can build graphs
//! the API would refuse, such as two assets sharing a key.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use asset_indexer_shared::{Asset, Owns, ParentOf, Team};

use crate::errors::GraphStoreError;
use crate::interfaces::GraphStore;
use crate::types::{AssetFilter, AssetRequest, OwnsRequest, Pagination, ParentOfRequest, TeamRequest};

#[derive(Debug, Default)]
struct GraphState {
    next_id: u64,
    teams: Vec<Team>,
    assets: Vec<Asset>,
    owns: Vec<Owns>,
    parents: Vec<ParentOf>,
}

impl GraphState {
    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn has_asset(&self, id: &str) -> bool {
        self.assets.iter().any(|a| a.id == id)
    }

    fn has_team(&self, id: &str) -> bool {
        self.teams.iter().any(|t| t.id == id)
    }

    fn require_asset(&self, id: &str) -> Result<(), GraphStoreError> {
        if self.has_asset(id) {
            Ok(())
        } else {
            Err(GraphStoreError::not_found(format!("asset {}", id)))
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    state: Mutex<GraphState>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `asset` as is, without any uniqueness check.
    pub async fn seed_asset(&self, asset: Asset) {
        self.state.lock().await.assets.push(asset);
    }

    /// Insert `team` as is, without any uniqueness check.
    pub async fn seed_team(&self, team: Team) {
        self.state.lock().await.teams.push(team);
    }

    pub async fn seed_owns(&self, owns: Owns) {
        self.state.lock().await.owns.push(owns);
    }

    pub async fn seed_parent(&self, parent: ParentOf) {
        self.state.lock().await.parents.push(parent);
    }

    pub async fn all_assets(&self) -> Vec<Asset> {
        self.state.lock().await.assets.clone()
    }

    pub async fn all_teams(&self) -> Vec<Team> {
        self.state.lock().await.teams.clone()
    }

    pub async fn all_owns(&self) -> Vec<Owns> {
        self.state.lock().await.owns.clone()
    }

    pub async fn all_parents(&self) -> Vec<ParentOf> {
        self.state.lock().await.parents.clone()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn teams(
        &self,
        identifier: Option<&str>,
        pagination: Pagination,
    ) -> Result<Vec<Team>, GraphStoreError> {
        let state = self.state.lock().await;
        let teams = state
            .teams
            .iter()
            .filter(|t| identifier.map_or(true, |id| t.identifier == id))
            .cloned()
            .collect();
        Ok(pagination.apply(teams))
    }

    async fn create_team(&self, request: &TeamRequest) -> Result<Team, GraphStoreError> {
        let mut state = self.state.lock().await;
        if state.teams.iter().any(|t| t.identifier == request.identifier) {
            return Err(GraphStoreError::already_exists(format!(
                "team {}",
                request.identifier
            )));
        }

        let team = Team {
            id: state.new_id("team"),
            identifier: request.identifier.clone(),
            name: request.name.clone(),
        };
        state.teams.push(team.clone());
        Ok(team)
    }

    async fn update_team(&self, id: &str, request: &TeamRequest) -> Result<Team, GraphStoreError> {
        let mut state = self.state.lock().await;
        let team = state
            .teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| GraphStoreError::not_found(format!("team {}", id)))?;

        team.identifier = request.identifier.clone();
        team.name = request.name.clone();
        Ok(team.clone())
    }

    async fn assets(
        &self,
        filter: &AssetFilter,
        pagination: Pagination,
    ) -> Result<Vec<Asset>, GraphStoreError> {
        let state = self.state.lock().await;
        let assets = state
            .assets
            .iter()
            .filter(|a| {
                filter.asset_type.as_ref().map_or(true, |t| &a.asset_type == t)
                    && filter.identifier.as_ref().map_or(true, |i| &a.identifier == i)
                    && filter.valid_at.map_or(true, |at| a.is_live_at(at))
            })
            .cloned()
            .collect();
        Ok(pagination.apply(assets))
    }

    async fn create_asset(&self, request: &AssetRequest) -> Result<Asset, GraphStoreError> {
        let mut state = self.state.lock().await;
        if state
            .assets
            .iter()
            .any(|a| a.asset_type == request.asset_type && a.identifier == request.identifier)
        {
            return Err(GraphStoreError::already_exists(format!(
                "asset {} {}",
                request.asset_type, request.identifier
            )));
        }

        let seen = request.timestamp.unwrap_or_else(Utc::now);
        let asset = Asset {
            id: state.new_id("asset"),
            asset_type: request.asset_type.clone(),
            identifier: request.identifier.clone(),
            first_seen: seen,
            last_seen: seen,
            expiration: request.expiration,
        };
        state.assets.push(asset.clone());
        Ok(asset)
    }

    async fn update_asset(
        &self,
        id: &str,
        request: &AssetRequest,
    ) -> Result<Asset, GraphStoreError> {
        let mut state = self.state.lock().await;
        let asset = state
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| GraphStoreError::not_found(format!("asset {}", id)))?;

        if let Some(timestamp) = request.timestamp {
            asset.last_seen = timestamp;
        }
        asset.expiration = request.expiration;
        Ok(asset.clone())
    }

    async fn owners(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<Owns>, GraphStoreError> {
        let state = self.state.lock().await;
        state.require_asset(asset_id)?;
        let owns = state
            .owns
            .iter()
            .filter(|o| o.asset_id == asset_id)
            .cloned()
            .collect();
        Ok(pagination.apply(owns))
    }

    async fn upsert_owner(
        &self,
        asset_id: &str,
        team_id: &str,
        request: &OwnsRequest,
    ) -> Result<Owns, GraphStoreError> {
        let mut state = self.state.lock().await;
        state.require_asset(asset_id)?;
        if !state.has_team(team_id) {
            return Err(GraphStoreError::not_found(format!("team {}", team_id)));
        }

        if let Some(owns) = state
            .owns
            .iter_mut()
            .find(|o| o.asset_id == asset_id && o.team_id == team_id)
        {
            owns.start_time = request.start_time;
            owns.end_time = request.end_time;
            return Ok(owns.clone());
        }

        let owns = Owns {
            id: state.new_id("owns"),
            team_id: team_id.to_string(),
            asset_id: asset_id.to_string(),
            start_time: request.start_time,
            end_time: request.end_time,
        };
        state.owns.push(owns.clone());
        Ok(owns)
    }

    async fn parents(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ParentOf>, GraphStoreError> {
        let state = self.state.lock().await;
        state.require_asset(asset_id)?;
        let parents = state
            .parents
            .iter()
            .filter(|p| p.child_id == asset_id)
            .cloned()
            .collect();
        Ok(pagination.apply(parents))
    }

    async fn children(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ParentOf>, GraphStoreError> {
        let state = self.state.lock().await;
        state.require_asset(asset_id)?;
        let children = state
            .parents
            .iter()
            .filter(|p| p.parent_id == asset_id)
            .cloned()
            .collect();
        Ok(pagination.apply(children))
    }

    async fn upsert_parent(
        &self,
        child_id: &str,
        parent_id: &str,
        request: &ParentOfRequest,
    ) -> Result<ParentOf, GraphStoreError> {
        let mut state = self.state.lock().await;
        state.require_asset(child_id)?;
        state.require_asset(parent_id)?;

        if let Some(edge) = state
            .parents
            .iter_mut()
            .find(|p| p.child_id == child_id && p.parent_id == parent_id)
        {
            if let Some(timestamp) = request.timestamp {
                edge.last_seen = timestamp;
            }
            edge.expiration = request.expiration;
            return Ok(edge.clone());
        }

        let seen = request.timestamp.unwrap_or_else(Utc::now);
        let edge = ParentOf {
            id: state.new_id("parent-of"),
            parent_id: parent_id.to_string(),
            child_id: child_id.to_string(),
            first_seen: seen,
            last_seen: seen,
            expiration: request.expiration,
        };
        state.parents.push(edge.clone());
        Ok(edge)
    }
}
