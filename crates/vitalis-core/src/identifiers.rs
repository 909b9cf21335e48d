//! # Workflow Identifiers
//!
//! `Origin` records why the account workflow was entered and `Route` names the
//! screens a navigation can land on. Both travel inside navigation payloads, so
//! their wire tags are stable.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Origin
// ============================================================================

/// Why the user entered the OTP workflow.
///
/// Set once when the workflow starts and never changed afterwards. The OTP
/// step branches on it; any tag this build does not recognise decodes to
/// `Unspecified`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Entered from the "forgot password" screen
    ForgotPassword,
    /// Entered from sign-up, before profile setup
    SignUp,
    /// No recognised origin was handed over
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Origin {
    /// Parse a wire tag. Unknown or absent tags map to `Unspecified`.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("forgotpassword") => Self::ForgotPassword,
            Some("signup") => Self::SignUp,
            _ => Self::Unspecified,
        }
    }

    /// Wire tag for this origin.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::ForgotPassword => "forgotpassword",
            Self::SignUp => "signup",
            Self::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// Route
// ============================================================================

/// Screens reachable from the account workflows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Enter the account email to start a reset
    ForgotPassword,
    /// Enter the one-time code
    VerifyOtp,
    /// Choose a new password
    SetNewPassword,
    /// Fill in the health profile after sign-up
    ProfileSetup,
    /// Sign-in screen, reached after a completed reset
    Login,
    /// Main chat screen, reached after profile setup
    Chat,
}

impl Route {
    /// Path the host router uses for this screen.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::ForgotPassword => "/forgotpassword",
            Self::VerifyOtp => "/verifyotp",
            Self::SetNewPassword => "/setnewpassword",
            Self::ProfileSetup => "/profilesetup",
            Self::Login => "/login",
            Self::Chat => "/chat",
        }
    }

    /// Whether this screen lies outside the account workflows.
    #[must_use]
    pub fn leaves_workflow(self) -> bool {
        matches!(self, Self::Login | Self::Chat)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
