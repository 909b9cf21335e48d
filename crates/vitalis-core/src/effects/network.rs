//! Authenticated HTTP effect interface.
//!
//! The workflow performs exactly one kind of network write: a JSON POST whose
//! response is either a success status or an error body. Transport setup and
//! bearer-token attachment belong to the handler.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transport-level failure: no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum NetworkError {
    /// Request did not complete in time
    #[error("request timed out")]
    Timeout,
    /// Connection could not be established or was dropped
    #[error("connection failed: {message}")]
    Connection {
        /// Transport error text
        message: String,
    },
    /// Request could not be built
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Why the request was rejected
        message: String,
    },
}

/// Response received from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body, `None` when the body was empty or not JSON
    pub body: Option<Value>,
}

impl HttpResponse {
    /// Response with a status and no body.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self { status, body: None }
    }

    /// Response with a status and a JSON body.
    #[must_use]
    pub fn with_body(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `detail` member of an object body, in whatever shape it has.
    #[must_use]
    pub fn detail(&self) -> Option<&Value> {
        self.body.as_ref()?.as_object()?.get("detail")
    }
}

/// Authenticated JSON requests against the application backend.
#[async_trait]
pub trait HttpEffects: Send + Sync {
    /// POST `body` to `path`, relative to the configured base URL.
    ///
    /// Any received response is returned as `Ok`, whatever its status.
    async fn post_json(&self, path: &str, body: &Value) -> Result<HttpResponse, NetworkError>;
}
