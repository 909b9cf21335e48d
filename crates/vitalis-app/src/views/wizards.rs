//! # Wizard Step Types
//!
//! Step metadata for the two account workflows, for hosts that show a
//! "Step n of m" indicator. The workflows only move forward, so there is no
//! `prev`.

use serde::{Deserialize, Serialize};
use vitalis_core::Route;

// ============================================================================
// Password Reset Flow
// ============================================================================

/// Steps in the forgot-password flow:
/// 1. RequestReset - Enter the account email
/// 2. VerifyOtp - Enter the one-time code
/// 3. SetNewPassword - Choose a new password
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetFlowStep {
    /// Enter account email
    #[default]
    RequestReset,
    /// Enter one-time code
    VerifyOtp,
    /// Choose new password
    SetNewPassword,
}

impl ResetFlowStep {
    /// Get all steps in order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::RequestReset, Self::VerifyOtp, Self::SetNewPassword]
    }

    /// Step presented on `route`, if it belongs to this flow.
    #[must_use]
    pub fn for_route(route: Route) -> Option<Self> {
        match route {
            Route::ForgotPassword => Some(Self::RequestReset),
            Route::VerifyOtp => Some(Self::VerifyOtp),
            Route::SetNewPassword => Some(Self::SetNewPassword),
            _ => None,
        }
    }

    /// Get the next step, or None if at the last step.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::RequestReset => Some(Self::VerifyOtp),
            Self::VerifyOtp => Some(Self::SetNewPassword),
            Self::SetNewPassword => None,
        }
    }

    /// Whether this is the first step.
    #[must_use]
    pub fn is_first(self) -> bool {
        self == Self::RequestReset
    }

    /// Whether this is the last step.
    #[must_use]
    pub fn is_last(self) -> bool {
        self == Self::SetNewPassword
    }

    /// Get step number (1-indexed for display).
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::RequestReset => 1,
            Self::VerifyOtp => 2,
            Self::SetNewPassword => 3,
        }
    }

    /// Number of steps in the flow.
    #[must_use]
    pub fn total_steps() -> u8 {
        3
    }

    /// Get step title for display.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::RequestReset => "Forgot Password",
            Self::VerifyOtp => "Verify OTP",
            Self::SetNewPassword => "Set New Password",
        }
    }

    /// Get step description for display.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::RequestReset => "Enter the email linked to your account",
            Self::VerifyOtp => "Enter the 4-digit code we sent you",
            Self::SetNewPassword => "Choose a password with letters and numbers",
        }
    }
}

// ============================================================================
// Sign-up Verification Flow
// ============================================================================

/// Steps after sign-up:
/// 1. VerifyOtp - Confirm the email with a one-time code
/// 2. ProfileSetup - Optional health profile
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignUpFlowStep {
    /// Enter one-time code
    #[default]
    VerifyOtp,
    /// Fill in or skip the health profile
    ProfileSetup,
}

impl SignUpFlowStep {
    /// Get all steps in order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::VerifyOtp, Self::ProfileSetup]
    }

    /// Step presented on `route`, if it belongs to this flow.
    #[must_use]
    pub fn for_route(route: Route) -> Option<Self> {
        match route {
            Route::VerifyOtp => Some(Self::VerifyOtp),
            Route::ProfileSetup => Some(Self::ProfileSetup),
            _ => None,
        }
    }

    /// Get the next step, or None if at the last step.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::VerifyOtp => Some(Self::ProfileSetup),
            Self::ProfileSetup => None,
        }
    }

    /// Whether this is the first step.
    #[must_use]
    pub fn is_first(self) -> bool {
        self == Self::VerifyOtp
    }

    /// Whether this is the last step.
    #[must_use]
    pub fn is_last(self) -> bool {
        self == Self::ProfileSetup
    }

    /// Get step number (1-indexed for display).
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::VerifyOtp => 1,
            Self::ProfileSetup => 2,
        }
    }

    /// Number of steps in the flow.
    #[must_use]
    pub fn total_steps() -> u8 {
        2
    }

    /// Get step title for display.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::VerifyOtp => "Verify Your Email",
            Self::ProfileSetup => "Set Up Your Profile",
        }
    }

    /// Get step description for display.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::VerifyOtp => "Enter the 4-digit code we sent you",
            Self::ProfileSetup => "Tell us a little about your health, or skip for now",
        }
    }
}

// ============================================================================
// Wizard Progress Helper
// ============================================================================

/// Format wizard progress for display.
///
/// # Example
/// ```rust
/// use vitalis_app::views::wizards::format_wizard_progress;
///
/// assert_eq!(format_wizard_progress(2, 3), "Step 2 of 3");
/// ```
#[must_use]
pub fn format_wizard_progress(current: u8, total: u8) -> String {
    format!("Step {current} of {total}")
}

/// Calculate progress percentage (0-100).
///
/// # Example
/// ```rust
/// use vitalis_app::views::wizards::wizard_progress_percent;
///
/// assert_eq!(wizard_progress_percent(1, 2), 50);
/// assert_eq!(wizard_progress_percent(3, 3), 100);
/// ```
#[must_use]
pub fn wizard_progress_percent(current: u8, total: u8) -> u8 {
    if total == 0 {
        return 0;
    }
    ((current as u16 * 100) / total as u16).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_flow_navigation() {
        assert_eq!(ResetFlowStep::RequestReset.next(), Some(ResetFlowStep::VerifyOtp));
        assert_eq!(ResetFlowStep::VerifyOtp.next(), Some(ResetFlowStep::SetNewPassword));
        assert_eq!(ResetFlowStep::SetNewPassword.next(), None);
        assert!(ResetFlowStep::RequestReset.is_first());
        assert!(ResetFlowStep::SetNewPassword.is_last());
    }

    #[test]
    fn test_reset_flow_numbers() {
        for (i, step) in ResetFlowStep::all().iter().enumerate() {
            assert_eq!(step.number() as usize, i + 1);
        }
        assert_eq!(ResetFlowStep::total_steps(), 3);
    }

    #[test]
    fn test_flows_map_routes() {
        assert_eq!(ResetFlowStep::for_route(Route::VerifyOtp), Some(ResetFlowStep::VerifyOtp));
        assert_eq!(ResetFlowStep::for_route(Route::ProfileSetup), None);
        assert_eq!(SignUpFlowStep::for_route(Route::ProfileSetup), Some(SignUpFlowStep::ProfileSetup));
        assert_eq!(SignUpFlowStep::for_route(Route::Login), None);
    }

    #[test]
    fn test_sign_up_flow() {
        assert_eq!(SignUpFlowStep::VerifyOtp.next(), Some(SignUpFlowStep::ProfileSetup));
        assert!(SignUpFlowStep::ProfileSetup.is_last());
        assert_eq!(SignUpFlowStep::total_steps(), SignUpFlowStep::all().len() as u8);
    }

    #[test]
    fn test_format_wizard_progress() {
        assert_eq!(format_wizard_progress(1, 3), "Step 1 of 3");
        assert_eq!(format_wizard_progress(2, 2), "Step 2 of 2");
    }

    #[test]
    fn test_wizard_progress_percent() {
        assert_eq!(wizard_progress_percent(1, 4), 25);
        assert_eq!(wizard_progress_percent(2, 3), 66);
        assert_eq!(wizard_progress_percent(3, 3), 100);
        assert_eq!(wizard_progress_percent(0, 0), 0);
    }
}
