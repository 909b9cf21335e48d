//! Common test values.

use serde_json::Value;
use vitalis_core::{NavigationPayload, Origin};

/// Account email used across tests
pub const EMAIL: &str = "ana@example.com";
/// A well-formed one-time code
pub const OTP: &str = "1234";
/// A password that passes every rule
pub const PASSWORD: &str = "abc123";

/// Arrival payload as a router would deliver it to a workflow screen.
pub fn arrival(origin: Origin, email: Option<&str>, otp: Option<&str>) -> NavigationPayload {
    let mut payload = NavigationPayload::new();
    payload.insert("from".into(), Value::String(origin.tag().to_string()));
    if let Some(email) = email {
        payload.insert("email".into(), Value::String(email.to_string()));
    }
    if let Some(otp) = otp {
        payload.insert("otp".into(), Value::String(otp.to_string()));
    }
    payload
}
