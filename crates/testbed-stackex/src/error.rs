use thiserror::Error;

/// Errors surfaced by a single call to the Stack Exchange API.
///
/// The transport never retries; callers decide what is worth another attempt
/// (see [`crate::retry::is_retriable`]).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network, TLS, or timeout failure before a response was received.
    #[error("{endpoint} unreachable: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    #[error("{endpoint} rejected with HTTP {status}: {body}")]
    RejectedRequest {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON envelope.
    #[error("malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl TransportError {
    /// HTTP status for rejected requests, `None` for everything else.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::RejectedRequest { status, .. } => Some(*status),
            _ => None,
        }
    }
}
