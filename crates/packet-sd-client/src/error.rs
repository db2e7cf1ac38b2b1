//! Error types for the Packet API client.

use thiserror::Error;

/// Result type alias for inventory API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the Packet API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request uri: {0}")]
    Uri(#[from] http::uri::InvalidUri),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("api returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the API rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}
