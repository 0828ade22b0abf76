//! Inventory API client.

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use asset_indexer_shared::{Asset, Owns, ParentOf, Team};

use crate::config::InventoryConfig;
use crate::errors::GraphStoreError;
use crate::interfaces::GraphStore;
use crate::inventory::urls::InventoryUrls;
use crate::types::{AssetFilter, AssetRequest, OwnsRequest, Pagination, ParentOfRequest, TeamRequest};

const OK: &[u16] = &[200];
const CREATED: &[u16] = &[201];
const UPSERTED: &[u16] = &[200, 201];

/// [`GraphStore`] implementation speaking to the asset inventory REST API.
///
/// # Example
///
/// ```ignore
/// use asset_indexer_repository::{InventoryClient, InventoryConfig};
///
/// let client = InventoryClient::new(InventoryConfig::new("https://inventory.example.com"))?;
/// let teams = client.teams(Some("team-1"), Pagination::disabled()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryClient {
    urls: InventoryUrls,
    client: ReqwestClient,
}

impl InventoryClient {
    /// Build a client for `config.endpoint`.
    ///
    /// # Returns
    ///
    /// * `Ok(InventoryClient)` - If the endpoint parses and the HTTP client builds
    /// * `Err(GraphStoreError)` - Otherwise
    pub fn new(config: InventoryConfig) -> Result<Self, GraphStoreError> {
        let urls = InventoryUrls::new(&config.endpoint)?;
        let client = ReqwestClient::builder()
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GraphStoreError::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { urls, client })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, GraphStoreError> {
        debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        decode(response, OK, &url).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, GraphStoreError> {
        debug!(url = %url, "POST");
        let response = self.client.post(url.clone()).json(body).send().await?;
        decode(response, CREATED, &url).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        expected: &[u16],
    ) -> Result<T, GraphStoreError> {
        debug!(url = %url, "PUT");
        let response = self.client.put(url.clone()).json(body).send().await?;
        decode(response, expected, &url).await
    }
}

/// Check the status against `expected` and decode the JSON body.
async fn decode<T: DeserializeOwned>(
    response: Response,
    expected: &[u16],
    url: &Url,
) -> Result<T, GraphStoreError> {
    let status = response.status();
    if !expected.contains(&status.as_u16()) {
        return Err(match status {
            StatusCode::NOT_FOUND => GraphStoreError::not_found(url.path()),
            StatusCode::CONFLICT => GraphStoreError::already_exists(url.path()),
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!(status = %status, url = %url, body = %body, "Inventory request failed");
                GraphStoreError::invalid_status(expected, status.as_u16())
            }
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| GraphStoreError::parse(format!("Invalid response from {}: {}", url, e)))
}

#[async_trait]
impl GraphStore for InventoryClient {
    async fn teams(
        &self,
        identifier: Option<&str>,
        pagination: Pagination,
    ) -> Result<Vec<Team>, GraphStoreError> {
        self.get(self.urls.teams(identifier, pagination)).await
    }

    async fn create_team(&self, request: &TeamRequest) -> Result<Team, GraphStoreError> {
        self.post(self.urls.teams(None, Pagination::disabled()), request)
            .await
    }

    async fn update_team(&self, id: &str, request: &TeamRequest) -> Result<Team, GraphStoreError> {
        self.put(self.urls.team(id), request, OK).await
    }

    async fn assets(
        &self,
        filter: &AssetFilter,
        pagination: Pagination,
    ) -> Result<Vec<Asset>, GraphStoreError> {
        self.get(self.urls.assets(filter, pagination)).await
    }

    async fn create_asset(&self, request: &AssetRequest) -> Result<Asset, GraphStoreError> {
        self.post(
            self.urls.assets(&AssetFilter::default(), Pagination::disabled()),
            request,
        )
        .await
    }

    async fn update_asset(
        &self,
        id: &str,
        request: &AssetRequest,
    ) -> Result<Asset, GraphStoreError> {
        self.put(self.urls.asset(id), request, OK).await
    }

    async fn owners(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<Owns>, GraphStoreError> {
        self.get(self.urls.owners(asset_id, pagination)).await
    }

    async fn upsert_owner(
        &self,
        asset_id: &str,
        team_id: &str,
        request: &OwnsRequest,
    ) -> Result<Owns, GraphStoreError> {
        self.put(self.urls.owner(asset_id, team_id), request, UPSERTED)
            .await
    }

    async fn parents(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ParentOf>, GraphStoreError> {
        self.get(self.urls.parents(asset_id, pagination)).await
    }

    async fn children(
        &self,
        asset_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ParentOf>, GraphStoreError> {
        self.get(self.urls.children(asset_id, pagination)).await
    }

    async fn upsert_parent(
        &self,
        child_id: &str,
        parent_id: &str,
        request: &ParentOfRequest,
    ) -> Result<ParentOf, GraphStoreError> {
        self.put(self.urls.parent(child_id, parent_id), request, UPSERTED)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{Method, StatusCode as HttpStatus, Uri};
    use axum::Router;
    use chrono::Utc;

    use asset_indexer_shared::unexpired;

    /// Inventory stand-in answering with scripted responses in order and
    /// recording every request it receives.
    #[derive(Clone, Default)]
    struct StubInventory {
        responses: Arc<Mutex<VecDeque<(u16, String)>>>,
        requests: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl StubInventory {
        fn respond(&self, status: u16, body: &str) -> &Self {
            self.responses
                .lock()
                .unwrap()
                .push_back((status, body.to_string()));
            self
        }

        /// `(request line, body)` pairs in arrival order.
        fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }

        async fn serve(&self) -> InventoryClient {
            let app = Router::new()
                .fallback(handle)
                .with_state(self.clone());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            InventoryClient::new(InventoryConfig::new(format!("http://{}", addr))).unwrap()
        }
    }

    async fn handle(
        State(stub): State<StubInventory>,
        method: Method,
        uri: Uri,
        body: String,
    ) -> (HttpStatus, String) {
        stub.requests
            .lock()
            .unwrap()
            .push((format!("{} {}", method, uri), body));
        let (status, body) = stub
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((500, "no scripted response".to_string()));
        (HttpStatus::from_u16(status).unwrap(), body)
    }

    const ASSET_JSON: &str = r#"{
        "id": "a1",
        "type": "Hostname",
        "identifier": "www.example.com",
        "first_seen": "2024-01-01T00:00:00Z",
        "last_seen": "2024-01-01T00:00:00Z",
        "expiration": "9999-12-12T23:59:59Z"
    }"#;

    fn asset_request() -> AssetRequest {
        AssetRequest {
            asset_type: "Hostname".to_string(),
            identifier: "www.example.com".to_string(),
            timestamp: None,
            expiration: unexpired(),
        }
    }

    fn team_request() -> TeamRequest {
        TeamRequest {
            identifier: "t1".to_string(),
            name: "Team 1".to_string(),
        }
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let result = InventoryClient::new(InventoryConfig::new("inventory"));
        assert!(matches!(result, Err(GraphStoreError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_new_accepts_insecure_config() {
        let config = InventoryConfig::new("https://localhost:8443").with_insecure_skip_verify(true);
        assert!(InventoryClient::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_teams_paginated() {
        let stub = StubInventory::default();
        stub.respond(200, r#"[{"id": "team-2", "identifier": "t1", "name": "Team 1"}]"#);
        let client = stub.serve().await;

        let teams = client.teams(Some("t1"), Pagination::page(1, 2)).await.unwrap();

        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, "team-2");
        assert_eq!(
            stub.requests()[0].0,
            "GET /v1/teams?team_identifier=t1&page=1&size=2"
        );
    }

    #[tokio::test]
    async fn test_assets_without_pagination() {
        let stub = StubInventory::default();
        stub.respond(200, &format!("[{}]", ASSET_JSON));
        let client = stub.serve().await;

        let assets = client
            .assets(
                &AssetFilter::by_key("Hostname", "www.example.com"),
                Pagination::disabled(),
            )
            .await
            .unwrap();

        assert_eq!(assets.len(), 1);
        assert!(assets[0].is_unexpired());
        assert_eq!(
            stub.requests()[0].0,
            "GET /v1/assets?asset_type=Hostname&asset_identifier=www.example.com"
        );
    }

    #[tokio::test]
    async fn test_create_asset() {
        let stub = StubInventory::default();
        stub.respond(201, ASSET_JSON);
        let client = stub.serve().await;

        let asset = client.create_asset(&asset_request()).await.unwrap();
        assert_eq!(asset.id, "a1");

        let (line, body) = &stub.requests()[0];
        assert_eq!(line, "POST /v1/assets");
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["type"], "Hostname");
        assert_eq!(body["expiration"], "9999-12-12T23:59:59Z");
    }

    #[tokio::test]
    async fn test_create_team_conflict_is_already_exists() {
        let stub = StubInventory::default();
        stub.respond(409, r#"{"msg": "team already exists"}"#);
        let client = stub.serve().await;

        let err = client.create_team(&team_request()).await.unwrap_err();
        assert!(matches!(err, GraphStoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_update_missing_entity_is_not_found() {
        let stub = StubInventory::default();
        stub.respond(404, "").respond(404, "");
        let client = stub.serve().await;

        let err = client.update_asset("a404", &asset_request()).await.unwrap_err();
        assert!(err.is_not_found());
        let err = client.update_team("team-404", &team_request()).await.unwrap_err();
        assert!(err.is_not_found());

        let lines: Vec<_> = stub.requests().into_iter().map(|(line, _)| line).collect();
        assert_eq!(lines, vec!["PUT /v1/assets/a404", "PUT /v1/teams/team-404"]);
    }

    #[tokio::test]
    async fn test_create_expects_created() {
        let stub = StubInventory::default();
        stub.respond(200, ASSET_JSON);
        let client = stub.serve().await;

        let err = client.create_asset(&asset_request()).await.unwrap_err();
        assert_eq!(err, GraphStoreError::invalid_status(&[201], 200));
    }

    #[tokio::test]
    async fn test_server_error_is_invalid_status() {
        let stub = StubInventory::default();
        stub.respond(500, "boom");
        let client = stub.serve().await;

        let err = client.owners("a1", Pagination::disabled()).await.unwrap_err();
        assert_eq!(
            err,
            GraphStoreError::InvalidStatus {
                expected: vec![200],
                returned: 500,
            }
        );
    }

    #[tokio::test]
    async fn test_upsert_owner_accepts_ok_and_created() {
        let owns = r#"{"id": "o1", "team_id": "team-1", "asset_id": "a1", "start_time": "2024-01-01T00:00:00Z"}"#;
        let stub = StubInventory::default();
        stub.respond(201, owns).respond(200, owns);
        let client = stub.serve().await;

        let request = OwnsRequest {
            start_time: Utc::now(),
            end_time: None,
        };
        assert!(client.upsert_owner("a1", "team-1", &request).await.unwrap().is_active());
        assert!(client.upsert_owner("a1", "team-1", &request).await.is_ok());
        assert_eq!(stub.requests()[0].0, "PUT /v1/assets/a1/owners/team-1");
    }

    #[tokio::test]
    async fn test_containment_routes() {
        let edge = r#"[{
            "id": "p1",
            "parent_id": "a2",
            "child_id": "a1",
            "first_seen": "2024-01-01T00:00:00Z",
            "last_seen": "2024-01-01T00:00:00Z",
            "expiration": "2024-02-01T00:00:00Z"
        }]"#;
        let stub = StubInventory::default();
        stub.respond(200, edge).respond(200, edge).respond(200, &edge[1..edge.len() - 1]);
        let client = stub.serve().await;

        let parents = client.parents("a1", Pagination::disabled()).await.unwrap();
        let children = client.children("a2", Pagination::page(0, 10)).await.unwrap();
        let now = Utc::now();
        let upserted = client
            .upsert_parent(
                "a1",
                "a2",
                &ParentOfRequest {
                    timestamp: Some(now),
                    expiration: now,
                },
            )
            .await
            .unwrap();

        assert_eq!(parents, children);
        assert_eq!(upserted.id, "p1");
        let lines: Vec<_> = stub.requests().into_iter().map(|(line, _)| line).collect();
        assert_eq!(
            lines,
            vec![
                "GET /v1/assets/a1/parents",
                "GET /v1/assets/a2/children?page=0&size=10",
                "PUT /v1/assets/a1/parents/a2",
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let stub = StubInventory::default();
        stub.respond(200, r#"{"not": "a list"}"#);
        let client = stub.serve().await;

        let err = client.teams(None, Pagination::disabled()).await.unwrap_err();
        assert!(matches!(err, GraphStoreError::ParseError(_)));
    }
}
