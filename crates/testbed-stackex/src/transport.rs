use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::ApiResponse;

/// One authenticated GET against the API.
///
/// Implementations inject the site (and key, when configured) into every
/// call, classify failures into [`TransportError`], and hold no state between
/// calls. [`crate::StackExchangeClient`] is the production implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Site identifier sent with every request (e.g. `stackoverflow`).
    fn site(&self) -> &str;

    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, TransportError>;
}
