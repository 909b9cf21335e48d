//! # Recovery Context Carrier
//!
//! The minimal identity context handed from one step to the next. Contexts are
//! plain values: `advance` returns a new context and never touches its input,
//! and the only way a step obtains one is through the payload attached to the
//! navigation that mounted it. There is no store to read from.

use serde_json::Value;
use std::fmt;
use vitalis_core::{NavigationPayload, Origin};

const ORIGIN_KEY: &str = "from";
const EMAIL_KEY: &str = "email";
const OTP_KEY: &str = "otp";

/// Fields to merge into a context. `None` leaves the existing value alone.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ContextPatch {
    /// Account email
    pub email: Option<String>,
    /// One-time code entered by the user
    pub otp: Option<String>,
}

impl ContextPatch {
    /// Empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the one-time code.
    #[must_use]
    pub fn otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(otp.into());
        self
    }
}

impl fmt::Debug for ContextPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPatch")
            .field("email", &self.email)
            .field("otp", &self.otp.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Identity context forwarded between workflow steps.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RecoveryContext {
    origin: Origin,
    email: Option<String>,
    otp: Option<String>,
}

impl RecoveryContext {
    /// Start a context for a workflow entered from `origin`.
    #[must_use]
    pub fn create(origin: Origin, partial: ContextPatch) -> Self {
        Self {
            origin,
            email: None,
            otp: None,
        }
        .advance(partial)
    }

    /// Context seen by a step that was mounted without a hand-off.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// New context with `patch` merged over this one. The origin never
    /// changes; empty strings in the patch count as absent.
    #[must_use]
    pub fn advance(&self, patch: ContextPatch) -> Self {
        Self {
            origin: self.origin,
            email: non_empty(patch.email).or_else(|| self.email.clone()),
            otp: non_empty(patch.otp).or_else(|| self.otp.clone()),
        }
    }

    /// Why the workflow was entered.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Account email, if handed over.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Code entered on the verification step, if any.
    #[must_use]
    pub fn otp(&self) -> Option<&str> {
        self.otp.as_deref()
    }

    /// Domain part of the email, for logging without the full address.
    #[must_use]
    pub fn email_domain(&self) -> Option<&str> {
        self.email.as_deref()?.rsplit_once('@').map(|(_, domain)| domain)
    }

    /// Encode as a navigation payload.
    #[must_use]
    pub fn to_payload(&self) -> NavigationPayload {
        let mut payload = NavigationPayload::new();
        payload.insert(ORIGIN_KEY.into(), Value::from(self.origin.tag()));
        if let Some(email) = &self.email {
            payload.insert(EMAIL_KEY.into(), Value::from(email.as_str()));
        }
        if let Some(otp) = &self.otp {
            payload.insert(OTP_KEY.into(), Value::from(otp.as_str()));
        }
        payload
    }

    /// Decode the payload a step arrived with.
    ///
    /// Tolerant by construction: a missing payload, a missing key or a value
    /// of the wrong type all read as absent.
    #[must_use]
    pub fn from_payload(payload: Option<&NavigationPayload>) -> Self {
        let Some(payload) = payload else {
            return Self::absent();
        };
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            origin: Origin::from_tag(text(ORIGIN_KEY).as_deref()),
            email: text(EMAIL_KEY),
            otp: text(OTP_KEY),
        }
    }
}

impl fmt::Debug for RecoveryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryContext")
            .field("origin", &self.origin)
            .field("email", &self.email)
            .field("otp", &self.otp.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
