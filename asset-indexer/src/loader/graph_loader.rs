//! Graph reconciliation.
//!
//! Turns asset events into graph store mutations. Every step reads the
//! current state first, so replaying an event leaves the graph unchanged
//! apart from refreshed `last_seen` times.
//!
//! Duplicates found while upserting are integrity errors. Entities missing
//! while retiring are not: the event raced with, or repeats, an earlier one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use asset_indexer_repository::{
    AssetFilter, AssetRequest, GraphStore, OwnsRequest, Pagination, ParentOfRequest, TeamRequest,
};
use asset_indexer_shared::{unexpired, Asset, AssetPayload, PayloadTeam, Team};

use crate::errors::IngestError;
use crate::loader::{normalize_aws_account_id, AWS_ACCOUNT_ASSET_TYPE};
use crate::processor::{AssetEvent, Retirement};

/// Loader that applies asset events to the graph store.
pub struct GraphLoader {
    store: Arc<dyn GraphStore>,
    aws_account_annotation_key: String,
}

impl GraphLoader {
    /// Create a new graph loader.
    ///
    /// # Arguments
    ///
    /// * `store` - The graph store to mutate
    /// * `aws_account_annotation_key` - Annotation key holding the asset's AWS account
    pub fn new(store: Arc<dyn GraphStore>, aws_account_annotation_key: impl Into<String>) -> Self {
        Self {
            store,
            aws_account_annotation_key: aws_account_annotation_key.into(),
        }
    }

    /// Apply a single event.
    pub async fn load(&self, event: &AssetEvent) -> Result<(), IngestError> {
        match event {
            AssetEvent::Upsert(payload) => self.upsert(payload).await,
            AssetEvent::Retire(retirement) => self.retire(retirement).await,
        }
    }

    #[instrument(skip_all, fields(asset_type = %payload.asset_type, identifier = %payload.identifier))]
    async fn upsert(&self, payload: &AssetPayload) -> Result<(), IngestError> {
        let now = Utc::now();

        let asset = self
            .upsert_asset(&payload.asset_type, &payload.identifier, now)
            .await?;
        let team = self.upsert_team(&payload.team).await?;
        self.set_owner(&asset, &team, now).await?;

        for annotation in payload.annotations_with_key(&self.aws_account_annotation_key) {
            let account = normalize_aws_account_id(&annotation.value)?;
            self.set_aws_account(&asset, &account, now).await?;
        }

        info!(asset_id = %asset.id, team_id = %team.identifier, "Asset upserted");
        Ok(())
    }

    /// Create the asset, or refresh it and mark it unexpired.
    async fn upsert_asset(
        &self,
        asset_type: &str,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<Asset, IngestError> {
        let assets = self
            .store
            .assets(&AssetFilter::by_key(asset_type, identifier), Pagination::disabled())
            .await?;
        let request = AssetRequest {
            asset_type: asset_type.to_string(),
            identifier: identifier.to_string(),
            timestamp: Some(now),
            expiration: unexpired(),
        };

        let asset = match single(assets, "asset", || format!("{} {}", asset_type, identifier))? {
            Some(existing) => self.store.update_asset(&existing.id, &request).await?,
            None => {
                debug!(asset_type = %asset_type, identifier = %identifier, "Creating asset");
                self.store.create_asset(&request).await?
            }
        };
        Ok(asset)
    }

    /// Create the team, or refresh its name.
    async fn upsert_team(&self, team: &PayloadTeam) -> Result<Team, IngestError> {
        let teams = self
            .store
            .teams(Some(team.id.as_str()), Pagination::disabled())
            .await?;
        let request = TeamRequest {
            identifier: team.id.clone(),
            name: team.name.clone(),
        };

        let team = match single(teams, "team", || team.id.clone())? {
            Some(existing) => self.store.update_team(&existing.id, &request).await?,
            None => {
                debug!(team_id = %team.id, "Creating team");
                self.store.create_team(&request).await?
            }
        };
        Ok(team)
    }

    /// Ensure `team` actively owns `asset`, keeping the original start time
    /// of a previous ownership.
    async fn set_owner(
        &self,
        asset: &Asset,
        team: &Team,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError> {
        let owners = self
            .store
            .owners(&asset.id, Pagination::disabled())
            .await?;
        let start_time = owners
            .iter()
            .find(|owns| owns.team_id == team.id)
            .map_or(now, |owns| owns.start_time);

        self.store
            .upsert_owner(
                &asset.id,
                &team.id,
                &OwnsRequest {
                    start_time,
                    end_time: None,
                },
            )
            .await?;
        Ok(())
    }

    /// Upsert the AWS account asset and make it the parent of `asset`.
    async fn set_aws_account(
        &self,
        asset: &Asset,
        account: &str,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError> {
        let account_asset = self
            .upsert_asset(AWS_ACCOUNT_ASSET_TYPE, account, now)
            .await?;

        self.store
            .upsert_parent(
                &asset.id,
                &account_asset.id,
                &ParentOfRequest {
                    timestamp: Some(now),
                    expiration: unexpired(),
                },
            )
            .await?;

        debug!(asset_id = %asset.id, account = %account, "AWS account parent set");
        Ok(())
    }

    #[instrument(skip_all, fields(
        asset_type = %retirement.asset_type,
        identifier = %retirement.identifier,
        team_id = %retirement.team_id,
        upstream_asset_id = %retirement.asset_id,
    ))]
    async fn retire(&self, retirement: &Retirement) -> Result<(), IngestError> {
        match self.expire_asset(retirement).await {
            Err(IngestError::GraphStore(e)) if e.is_not_found() => {
                warn!(error = %e, "Graph entity vanished during retirement, ignoring");
                Ok(())
            }
            result => result,
        }
    }

    /// End `retirement.team_id`'s ownership and, if no other team owns the
    /// asset anymore, expire it and its containment edges.
    async fn expire_asset(&self, retirement: &Retirement) -> Result<(), IngestError> {
        let now = Utc::now();

        let assets = self
            .store
            .assets(
                &AssetFilter::by_key(&retirement.asset_type, &retirement.identifier),
                Pagination::disabled(),
            )
            .await?;
        let Some(asset) = single(assets, "asset", || {
            format!("{} {}", retirement.asset_type, retirement.identifier)
        })?
        else {
            debug!("Unknown asset, nothing to retire");
            return Ok(());
        };

        let teams = self
            .store
            .teams(Some(retirement.team_id.as_str()), Pagination::disabled())
            .await?;
        let Some(team) = single(teams, "team", || retirement.team_id.clone())? else {
            debug!("Unknown team, nothing to retire");
            return Ok(());
        };

        let owners = self
            .store
            .owners(&asset.id, Pagination::disabled())
            .await?;
        let mut owned_by_others = false;
        for owns in owners {
            if owns.team_id != team.id {
                owned_by_others |= owns.is_active();
                continue;
            }
            if owns.is_active() {
                self.store
                    .upsert_owner(
                        &asset.id,
                        &team.id,
                        &OwnsRequest {
                            start_time: owns.start_time,
                            end_time: Some(now),
                        },
                    )
                    .await?;
            }
        }

        if owned_by_others {
            info!(asset_id = %asset.id, "Ownership ended, asset still owned by other teams");
            return Ok(());
        }

        // An already expired asset keeps its expiration. The cascade still
        // runs so that a retirement interrupted half way is completed.
        if asset.is_live_at(now) {
            self.store
                .update_asset(
                    &asset.id,
                    &AssetRequest {
                        asset_type: asset.asset_type.clone(),
                        identifier: asset.identifier.clone(),
                        timestamp: Some(now),
                        expiration: now,
                    },
                )
                .await?;
        }

        let expired_edges = self.expire_containment(&asset.id, now).await?;
        info!(asset_id = %asset.id, expired_edges, "Asset expired");
        Ok(())
    }

    /// Expire every live parent-of edge where `asset_id` is the child or the
    /// parent. Returns the number of edges expired.
    async fn expire_containment(
        &self,
        asset_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, IngestError> {
        let parents = self
            .store
            .parents(asset_id, Pagination::disabled())
            .await?;
        let children = self
            .store
            .children(asset_id, Pagination::disabled())
            .await?;

        let request = ParentOfRequest {
            timestamp: Some(now),
            expiration: now,
        };
        let mut expired = 0;
        for edge in parents
            .iter()
            .chain(children.iter())
            .filter(|edge| edge.is_live_at(now))
        {
            self.store
                .upsert_parent(&edge.child_id, &edge.parent_id, &request)
                .await?;
            expired += 1;
        }
        Ok(expired)
    }
}

/// At most one entity is expected for a unique key.
fn single<T>(
    mut items: Vec<T>,
    kind: &'static str,
    key: impl FnOnce() -> String,
) -> Result<Option<T>, IngestError> {
    match items.len() {
        0 => Ok(None),
        1 => Ok(items.pop()),
        _ => Err(IngestError::duplicated(kind, key())),
    }
}
