//! Graph store error types.

use thiserror::Error;

/// Errors returned by [`GraphStore`](crate::GraphStore) implementations.
///
/// `NotFound` and `AlreadyExists` mirror the inventory API's 404 and 409
/// responses. Callers decide whether they are fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphStoreError {
    /// The addressed entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same unique key already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The endpoint answered with an unexpected status code.
    #[error("Invalid status response code {returned}, expected {expected:?}")]
    InvalidStatus { expected: Vec<u16>, returned: u16 },

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The configured endpoint is not a usable base URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl GraphStoreError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an already exists error.
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Create an invalid status error.
    pub fn invalid_status(expected: &[u16], returned: u16) -> Self {
        Self::InvalidStatus {
            expected: expected.to_vec(),
            returned,
        }
    }

    /// Create an HTTP error.
    pub fn http(msg: impl Into<String>) -> Self {
        Self::HttpError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(msg: impl Into<String>) -> Self {
        Self::InvalidEndpoint(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for GraphStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}
