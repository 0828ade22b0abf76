//! Route builders for the inventory API.

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

use crate::errors::GraphStoreError;
use crate::types::{AssetFilter, Pagination};

/// Builds absolute inventory URLs from a base endpoint.
///
/// Any path on the base endpoint is kept as a prefix, so
/// `https://host/api` yields `https://host/api/v1/assets`.
#[derive(Debug, Clone)]
pub struct InventoryUrls {
    base: Url,
}

impl InventoryUrls {
    /// Parse `endpoint` as the base URL.
    ///
    /// # Returns
    ///
    /// * `Ok(InventoryUrls)` - If `endpoint` is an absolute URL with a path
    /// * `Err(GraphStoreError::InvalidEndpoint)` - Otherwise
    pub fn new(endpoint: &str) -> Result<Self, GraphStoreError> {
        let base = Url::parse(endpoint)
            .map_err(|e| GraphStoreError::invalid_endpoint(format!("{}: {}", endpoint, e)))?;
        if base.cannot_be_a_base() {
            return Err(GraphStoreError::invalid_endpoint(format!(
                "{}: cannot be a base URL",
                endpoint
            )));
        }
        Ok(Self { base })
    }

    pub fn teams(&self, identifier: Option<&str>, pagination: Pagination) -> Url {
        let mut query = Vec::new();
        if let Some(identifier) = identifier {
            query.push(("team_identifier", identifier.to_string()));
        }
        query.extend(pagination.query_pairs());
        self.build(&["v1", "teams"], &query)
    }

    pub fn team(&self, id: &str) -> Url {
        self.build(&["v1", "teams", id], &[])
    }

    pub fn assets(&self, filter: &AssetFilter, pagination: Pagination) -> Url {
        let mut query = Vec::new();
        if let Some(asset_type) = &filter.asset_type {
            query.push(("asset_type", asset_type.clone()));
        }
        if let Some(identifier) = &filter.identifier {
            query.push(("asset_identifier", identifier.clone()));
        }
        if let Some(valid_at) = filter.valid_at {
            query.push(("valid_at", format_time(valid_at)));
        }
        query.extend(pagination.query_pairs());
        self.build(&["v1", "assets"], &query)
    }

    pub fn asset(&self, id: &str) -> Url {
        self.build(&["v1", "assets", id], &[])
    }

    pub fn owners(&self, asset_id: &str, pagination: Pagination) -> Url {
        self.build(&["v1", "assets", asset_id, "owners"], &pagination.query_pairs())
    }

    pub fn owner(&self, asset_id: &str, team_id: &str) -> Url {
        self.build(&["v1", "assets", asset_id, "owners", team_id], &[])
    }

    pub fn parents(&self, asset_id: &str, pagination: Pagination) -> Url {
        self.build(&["v1", "assets", asset_id, "parents"], &pagination.query_pairs())
    }

    pub fn parent(&self, child_id: &str, parent_id: &str) -> Url {
        self.build(&["v1", "assets", child_id, "parents", parent_id], &[])
    }

    pub fn children(&self, asset_id: &str, pagination: Pagination) -> Url {
        self.build(&["v1", "assets", asset_id, "children"], &pagination.query_pairs())
    }

    fn build(&self, segments: &[&str], query: &[(&'static str, String)]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.set_query(None);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn urls() -> InventoryUrls {
        InventoryUrls::new("https://inventory.example.com").unwrap()
    }

    #[test]
    fn test_teams_url() {
        assert_eq!(
            urls().teams(None, Pagination::disabled()).as_str(),
            "https://inventory.example.com/v1/teams"
        );
        assert_eq!(
            urls().teams(Some("team-1"), Pagination::page(0, 100)).as_str(),
            "https://inventory.example.com/v1/teams?team_identifier=team-1&page=0&size=100"
        );
    }

    #[test]
    fn test_assets_url_with_filter() {
        let filter = AssetFilter {
            asset_type: Some("Hostname".to_string()),
            identifier: Some("www.example.com".to_string()),
            valid_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        };

        assert_eq!(
            urls().assets(&filter, Pagination::disabled()).as_str(),
            "https://inventory.example.com/v1/assets?asset_type=Hostname&asset_identifier=www.example.com&valid_at=2024-01-01T00%3A00%3A00Z"
        );
    }

    #[test]
    fn test_edge_urls() {
        let urls = urls();
        assert_eq!(
            urls.owner("a1", "t1").as_str(),
            "https://inventory.example.com/v1/assets/a1/owners/t1"
        );
        assert_eq!(
            urls.parent("a1", "a2").as_str(),
            "https://inventory.example.com/v1/assets/a1/parents/a2"
        );
        assert_eq!(
            urls.children("a2", Pagination::page(3, 10)).as_str(),
            "https://inventory.example.com/v1/assets/a2/children?page=3&size=10"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let urls = InventoryUrls::new("http://localhost:8000/api/").unwrap();
        assert_eq!(urls.asset("a1").as_str(), "http://localhost:8000/api/v1/assets/a1");
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            InventoryUrls::new("not a url"),
            Err(GraphStoreError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            InventoryUrls::new("mailto:ops@example.com"),
            Err(GraphStoreError::InvalidEndpoint(_))
        ));
    }
}
