//! HTTP client for the Stack Exchange REST API.
//!
//! Wraps `reqwest` with site/key injection and maps every failure into a
//! [`TransportError`]. Retrying and pacing are left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::TransportError;
use crate::transport::Transport;
use crate::types::ApiResponse;

const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.3";

/// Longest error body kept on [`TransportError::RejectedRequest`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for the Stack Exchange REST API.
///
/// Use [`StackExchangeClient::new`] for production or
/// [`StackExchangeClient::with_base_url`] to point at a mock server in tests.
pub struct StackExchangeClient {
    client: Client,
    site: String,
    api_key: Option<String>,
    base_url: Url,
}

impl StackExchangeClient {
    /// Creates a client pointed at the public v2.3 API.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        site: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, TransportError> {
        Self::with_base_url(site, api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the underlying
    /// `reqwest::Client` cannot be constructed, or
    /// [`TransportError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        site: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(TransportError::ClientBuild)?;

        // Exactly one trailing slash so `Url::join` appends endpoints below the
        // version segment instead of replacing it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| TransportError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            site: site.to_owned(),
            api_key: api_key.map(str::to_owned),
            base_url,
        })
    }

    /// Builds the request URL for `endpoint`, appending `site`, the optional
    /// `key`, and `params` as percent-encoded query pairs.
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join endpoint '{endpoint}': {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("site", &self.site);
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for StackExchangeClient {
    fn site(&self) -> &str {
        &self.site
    }

    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, TransportError> {
        let url = self.build_url(endpoint, params)?;
        let unreachable = |source: reqwest::Error| TransportError::Unreachable {
            endpoint: endpoint.to_owned(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(unreachable)?;
        let status = response.status();
        let body = response.text().await.map_err(unreachable)?;

        if !status.is_success() {
            return Err(TransportError::RejectedRequest {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        serde_json::from_str::<ApiResponse>(&body).map_err(|e| TransportError::MalformedResponse {
            endpoint: endpoint.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
