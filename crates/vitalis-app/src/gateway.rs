//! # Credential Update Gateway
//!
//! The single network write in the account workflows. At most one update is
//! outstanding per gateway; a submit that arrives while one is in flight is
//! turned away without touching the network. Failures are never retried here.

use crate::errors::RecoveryError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vitalis_core::{HttpEffects, HttpResponse, NetworkError};

/// Endpoint receiving the new credential.
pub const SET_NEW_PASSWORD_PATH: &str = "/auth/set-new-password";

/// Shown when the server gives no usable reason.
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update password";

/// Shown when the server's reason is not a string.
pub const MALFORMED_DETAIL_MESSAGE: &str = "Validation error. Check your connection.";

/// Request body for a credential update. Absent identity fields are left out
/// of the JSON entirely.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialUpdate {
    /// Account email; omitted for a signed-in change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// One-time code; omitted for a signed-in change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    /// Password to set
    pub new_password: String,
    /// Repeat of `new_password`
    pub confirm_password: String,
}

impl fmt::Debug for CredentialUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialUpdate")
            .field("email", &self.email)
            .field("otp", &self.otp.as_ref().map(|_| "<redacted>"))
            .field("new_password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .finish()
    }
}

/// Why a credential update did not go through.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Another update from this gateway has not settled yet
    #[error("a credential update is already in flight")]
    InFlight,
    /// The update was attempted and failed
    #[error(transparent)]
    Failed(RecoveryError),
}

/// Sends credential updates through an authenticated HTTP handler.
pub struct CredentialUpdateGateway {
    http: Arc<dyn HttpEffects>,
    in_flight: AtomicBool,
}

impl CredentialUpdateGateway {
    /// Gateway sending through `http`.
    pub fn new(http: Arc<dyn HttpEffects>) -> Self {
        Self {
            http,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether an update is currently outstanding.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit `update`.
    pub async fn submit(&self, update: CredentialUpdate) -> Result<(), GatewayError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(GatewayError::InFlight)?;

        let body = serde_json::to_value(&update).map_err(|e| {
            tracing::warn!(error = %e, "credential update could not be encoded");
            GatewayError::Failed(RecoveryError::submission(UPDATE_FAILED_MESSAGE))
        })?;

        match self.http.post_json(SET_NEW_PASSWORD_PATH, &body).await {
            Ok(response) if response.is_success() => {
                tracing::debug!(status = response.status, "credential update accepted");
                Ok(())
            }
            Ok(response) => {
                tracing::warn!(status = response.status, "credential update rejected");
                Err(GatewayError::Failed(failure_from_response(&response)))
            }
            Err(e) => {
                tracing::warn!(error = %e, "credential update transport failure");
                Err(GatewayError::Failed(failure_from_transport(&e)))
            }
        }
    }
}

impl fmt::Debug for CredentialUpdateGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialUpdateGateway")
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

/// Interpret an error response.
///
/// A non-empty string `detail` is shown as-is. A missing or empty one falls
/// back to the generic failure message. Any other shape is treated as a
/// malformed response and never shown raw.
#[must_use]
pub fn failure_from_response(response: &HttpResponse) -> RecoveryError {
    match response.detail() {
        Some(Value::String(detail)) if !detail.is_empty() => RecoveryError::submission(detail.clone()),
        Some(detail) if !is_blank(detail) => RecoveryError::malformed(MALFORMED_DETAIL_MESSAGE),
        _ => RecoveryError::submission(UPDATE_FAILED_MESSAGE),
    }
}

/// No response arrived, so there is no reason to extract.
#[must_use]
pub fn failure_from_transport(_error: &NetworkError) -> RecoveryError {
    RecoveryError::submission(UPDATE_FAILED_MESSAGE)
}

// Values a server would send to mean "no detail".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vitalis_testkit::ScriptedHttpClient;

    fn update() -> CredentialUpdate {
        CredentialUpdate {
            email: Some("ana@example.com".into()),
            otp: Some("1234".into()),
            new_password: "abc123".into(),
            confirm_password: "abc123".into(),
        }
    }

    #[test]
    fn test_string_detail_surfaces_verbatim() {
        let response = HttpResponse::with_body(404, json!({ "detail": "Email not found" }));
        assert_eq!(
            failure_from_response(&response),
            RecoveryError::submission("Email not found")
        );
    }

    #[test]
    fn test_missing_or_empty_detail_uses_generic_message() {
        for response in [
            HttpResponse::status(500),
            HttpResponse::with_body(500, json!({})),
            HttpResponse::with_body(500, json!({ "detail": "" })),
            HttpResponse::with_body(500, json!({ "detail": null })),
            HttpResponse::with_body(500, json!("Internal Server Error")),
        ] {
            assert_eq!(
                failure_from_response(&response),
                RecoveryError::submission(UPDATE_FAILED_MESSAGE)
            );
        }
    }

    #[test]
    fn test_structured_detail_is_malformed() {
        let response = HttpResponse::with_body(
            422,
            json!({ "detail": [{ "loc": ["body", "otp"], "msg": "field required" }] }),
        );
        let err = failure_from_response(&response);
        assert_eq!(err, RecoveryError::malformed(MALFORMED_DETAIL_MESSAGE));
        assert!(!err.to_string().contains("field required"));
    }

    #[test]
    fn test_payload_omits_absent_identity() {
        let body = serde_json::to_value(CredentialUpdate {
            email: None,
            otp: None,
            new_password: "abc123".into(),
            confirm_password: "abc123".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "new_password": "abc123", "confirm_password": "abc123" })
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", update());
        assert!(!rendered.contains("abc123"));
        assert!(!rendered.contains("1234"));
    }

    #[tokio::test]
    async fn test_submit_posts_payload() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.respond(HttpResponse::status(200));
        let gateway = CredentialUpdateGateway::new(http.clone());

        gateway.submit(update()).await.unwrap();

        let calls = http.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, SET_NEW_PASSWORD_PATH);
        assert_eq!(
            calls[0].body,
            json!({
                "email": "ana@example.com",
                "otp": "1234",
                "new_password": "abc123",
                "confirm_password": "abc123",
            })
        );
        assert!(!gateway.is_in_flight());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_generic_message() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.fail(NetworkError::Timeout);
        let gateway = CredentialUpdateGateway::new(http);

        let err = gateway.submit(update()).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Failed(RecoveryError::submission(UPDATE_FAILED_MESSAGE))
        );
        assert!(!gateway.is_in_flight());
    }

    #[tokio::test]
    async fn test_second_submit_while_outstanding_is_turned_away() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.respond(HttpResponse::status(200));
        let gate = http.hold();
        let gateway = CredentialUpdateGateway::new(http.clone());

        let first = gateway.submit(update());
        let second = async {
            // Let the first call reach the network before trying again.
            tokio::task::yield_now().await;
            let result = gateway.submit(update()).await;
            gate.release();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(GatewayError::InFlight));
        assert_eq!(http.calls().len(), 1);
    }
}
