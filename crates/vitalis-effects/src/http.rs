//! HTTP handler built on reqwest.
//!
//! Requests go to `base_url` + path with a JSON body and, when the token store
//! has one, an `Authorization: Bearer` header. Any HTTP response, successful or
//! not, is returned as-is; only transport failures become errors.

use crate::configuration::ClientConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use vitalis_core::{HttpEffects, HttpResponse, NetworkError, TokenStore};

/// Production HTTP handler.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ReqwestHttpClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::InvalidRequest {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            tokens,
        })
    }

    /// Create a client from the `[client]` section.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, NetworkError> {
        Self::new(config.base_url.clone(), config.request_timeout(), tokens)
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn build_request(&self, path: &str, body: &Value) -> Result<reqwest::Request, NetworkError> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = self.tokens.bearer_token() {
            request = request.bearer_auth(token);
        }
        request.build().map_err(|e| NetworkError::InvalidRequest {
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for ReqwestHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestHttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpEffects for ReqwestHttpClient {
    async fn post_json(&self, path: &str, body: &Value) -> Result<HttpResponse, NetworkError> {
        let request = self.build_request(path, body)?;
        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(path, error = %e, "request failed before a response arrived");
            transport_error(&e)
        })?;

        let status = response.status().as_u16();
        tracing::debug!(path, status, "response received");

        // A body that is missing or not JSON is treated as absent.
        let body = match response.bytes().await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes).ok(),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(path, error = %e, "response body unreadable");
                None
            }
        };
        Ok(HttpResponse { status, body })
    }
}

fn transport_error(e: &reqwest::Error) -> NetworkError {
    if e.is_timeout() {
        NetworkError::Timeout
    } else if e.is_builder() {
        NetworkError::InvalidRequest {
            message: e.to_string(),
        }
    } else {
        NetworkError::Connection {
            message: e.to_string(),
        }
    }
}
