//! Configuration for the asset inventory client.

use std::time::Duration;

/// Default timeout applied to every inventory request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`InventoryClient`](crate::InventoryClient).
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Base URL of the inventory API, e.g. `https://inventory.example.com`.
    pub endpoint: String,
    /// Skip TLS certificate verification. Only meant for local setups.
    pub insecure_skip_verify: bool,
    pub request_timeout: Duration,
}

impl InventoryConfig {
    /// Create a config with certificate verification and the default timeout.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL of the inventory API
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            insecure_skip_verify: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
