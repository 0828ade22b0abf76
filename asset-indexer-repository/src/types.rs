//! Request, filter and pagination types for graph store operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pagination parameters for list operations.
///
/// A `size` of zero disables pagination and the full result set is returned.
/// Pages are zero-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Pagination {
    /// No pagination: return every matching entity.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Request page `page` of `size` entities.
    pub fn page(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn is_enabled(&self) -> bool {
        self.size != 0
    }

    /// Query parameters for this pagination, empty when disabled.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        if !self.is_enabled() {
            return Vec::new();
        }
        vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ]
    }

    /// Apply this pagination to an already filtered list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        if !self.is_enabled() {
            return items;
        }
        let start = self.page as usize * self.size as usize;
        items.into_iter().skip(start).take(self.size as usize).collect()
    }
}

/// Filter for listing assets. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub asset_type: Option<String>,
    pub identifier: Option<String>,
    /// Only assets not expired at this instant.
    pub valid_at: Option<DateTime<Utc>>,
}

impl AssetFilter {
    /// Exact match on the asset's `(type, identifier)` key, live or expired.
    pub fn by_key(asset_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            asset_type: Some(asset_type.into()),
            identifier: Some(identifier.into()),
            valid_at: None,
        }
    }
}

/// Body for creating or updating an asset.
///
/// When `timestamp` is set the store refreshes `last_seen` (and `first_seen`
/// on creation) to it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssetRequest {
    #[serde(rename = "type")]
    pub asset_type: String,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub expiration: DateTime<Utc>,
}

/// Body for creating or updating a team.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TeamRequest {
    pub identifier: String,
    pub name: String,
}

/// Body for upserting an "owns" edge. An absent `end_time` marks it active.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OwnsRequest {
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Body for upserting a "parent of" edge.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParentOfRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub expiration: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_indexer_shared::unexpired;

    #[test]
    fn test_disabled_pagination_has_no_query() {
        assert!(Pagination::disabled().query_pairs().is_empty());
        assert_eq!(Pagination::disabled().apply(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn test_pagination_is_zero_based() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(Pagination::page(0, 4).apply(items.clone()), vec![0, 1, 2, 3]);
        assert_eq!(Pagination::page(2, 4).apply(items.clone()), vec![8, 9]);
        assert!(Pagination::page(3, 4).apply(items).is_empty());
    }

    #[test]
    fn test_asset_request_json() {
        let request = AssetRequest {
            asset_type: "Hostname".to_string(),
            identifier: "www.example.com".to_string(),
            timestamp: None,
            expiration: unexpired(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "Hostname");
        assert_eq!(value["expiration"], "9999-12-12T23:59:59Z");
        assert!(value.get("timestamp").is_none());
    }
}
