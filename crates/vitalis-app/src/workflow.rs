//! # Recovery State Machine
//!
//! ```text
//! RequestingReset ──EmailSubmitted──▶ AwaitingOtp ──OtpVerified──▶ SettingPassword ──PasswordUpdated──▶ Done(PasswordReset)
//!                                          │  ▲
//!                                          │  └── origin unrecognised: stay
//!                                          └──OtpVerified (sign-up)──▶ SettingUpProfile ──ProfileCompleted──▶ Done(ProfileCompleted)
//! ```
//!
//! Each variant carries only the context valid in that state. In particular a
//! `SettingPassword` state holds a [`ResetTicket`], which cannot be built
//! without a one-time code. There are no backward edges and no cancel state;
//! abandoning the workflow just drops the value.

use crate::context::{ContextPatch, RecoveryContext};
use crate::errors::RecoveryError;
use std::fmt;
use vitalis_core::{NavigationPayload, Origin, Route};

// ============================================================================
// Reset Ticket
// ============================================================================

/// Proof that a reset reached the password step with a one-time code.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetTicket {
    context: RecoveryContext,
}

impl ResetTicket {
    /// Build a ticket, failing closed when the context holds no code.
    pub fn from_context(context: &RecoveryContext) -> Result<Self, RecoveryError> {
        match context.otp() {
            Some(otp) if !otp.is_empty() => Ok(Self {
                context: context.clone(),
            }),
            _ => Err(RecoveryError::SessionExpired),
        }
    }

    /// Account email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.context.email()
    }

    /// The code the reset was verified with.
    #[must_use]
    pub fn otp(&self) -> &str {
        self.context.otp().unwrap_or_default()
    }

    /// Context the ticket was built from.
    #[must_use]
    pub fn context(&self) -> &RecoveryContext {
        &self.context
    }
}

impl fmt::Debug for ResetTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetTicket")
            .field("context", &self.context)
            .finish()
    }
}

// ============================================================================
// States and Events
// ============================================================================

/// How a finished workflow ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Completion {
    /// New password stored; user goes to sign in
    PasswordReset,
    /// Sign-up profile saved or skipped; user goes to chat
    ProfileCompleted,
}

/// Where the account workflow currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryState {
    /// Waiting for the account email
    RequestingReset,
    /// Waiting for the one-time code
    AwaitingOtp {
        /// Context handed over from the entry step
        context: RecoveryContext,
    },
    /// Waiting for the new password
    SettingPassword {
        /// Email and code the update is authorised by
        ticket: ResetTicket,
    },
    /// Waiting for the sign-up health profile
    SettingUpProfile {
        /// Context handed over from the code step
        context: RecoveryContext,
    },
    /// Terminal; the context is gone
    Done(Completion),
}

/// Inputs that drive the state machine.
#[derive(Clone, PartialEq, Eq)]
pub enum RecoveryEvent {
    /// A valid email was submitted on the forgot-password screen
    EmailSubmitted { email: String },
    /// A well-formed one-time code was submitted
    OtpVerified { otp: String },
    /// The credential gateway accepted the new password
    PasswordUpdated,
    /// Profile setup was saved or skipped
    ProfileCompleted,
}

impl RecoveryEvent {
    /// Short name for logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EmailSubmitted { .. } => "email_submitted",
            Self::OtpVerified { .. } => "otp_verified",
            Self::PasswordUpdated => "password_updated",
            Self::ProfileCompleted => "profile_completed",
        }
    }
}

impl fmt::Debug for RecoveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected transitions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The event has no edge out of the current state
    #[error("event {event} is not accepted in state {state}")]
    Rejected {
        /// Name of the current state
        state: &'static str,
        /// Name of the rejected event
        event: &'static str,
    },
    /// The edge exists but its guard failed
    #[error(transparent)]
    Guard(#[from] RecoveryError),
}

impl From<TransitionError> for RecoveryError {
    /// A step that finds its own event rejected is running on context that no
    /// longer matches the workflow, so the user has to start over.
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Guard(inner) => inner,
            TransitionError::Rejected { .. } => RecoveryError::SessionExpired,
        }
    }
}

impl RecoveryState {
    /// Entry point of the forgot-password flow.
    #[must_use]
    pub fn start_reset() -> Self {
        Self::RequestingReset
    }

    /// Entry point of the sign-up verification flow.
    #[must_use]
    pub fn start_sign_up(email: Option<String>) -> Self {
        let patch = ContextPatch {
            email,
            otp: None,
        };
        Self::AwaitingOtp {
            context: RecoveryContext::create(Origin::SignUp, patch),
        }
    }

    /// Short name for logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestingReset => "requesting_reset",
            Self::AwaitingOtp { .. } => "awaiting_otp",
            Self::SettingPassword { .. } => "setting_password",
            Self::SettingUpProfile { .. } => "setting_up_profile",
            Self::Done(_) => "done",
        }
    }

    /// Whether the workflow has finished.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Screen that presents this state.
    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            Self::RequestingReset => Route::ForgotPassword,
            Self::AwaitingOtp { .. } => Route::VerifyOtp,
            Self::SettingPassword { .. } => Route::SetNewPassword,
            Self::SettingUpProfile { .. } => Route::ProfileSetup,
            Self::Done(Completion::PasswordReset) => Route::Login,
            Self::Done(Completion::ProfileCompleted) => Route::Chat,
        }
    }

    /// Context this state hands to its screen, if any.
    #[must_use]
    pub fn context(&self) -> Option<&RecoveryContext> {
        match self {
            Self::AwaitingOtp { context } | Self::SettingUpProfile { context } => Some(context),
            Self::SettingPassword { ticket } => Some(ticket.context()),
            Self::RequestingReset | Self::Done(_) => None,
        }
    }

    /// Navigation payload for entering this state's screen.
    #[must_use]
    pub fn payload(&self) -> Option<NavigationPayload> {
        self.context().map(RecoveryContext::to_payload)
    }

    /// Apply `event`, consuming the current state.
    ///
    /// The branch out of `AwaitingOtp` depends only on the origin captured at
    /// entry. An unrecognised origin leaves the workflow where it is.
    pub fn apply(self, event: RecoveryEvent) -> Result<Self, TransitionError> {
        let state = self.name();
        let event_name = event.name();
        let next = match (self, event) {
            (Self::RequestingReset, RecoveryEvent::EmailSubmitted { email }) => Self::AwaitingOtp {
                context: RecoveryContext::create(
                    Origin::ForgotPassword,
                    ContextPatch::new().email(email),
                ),
            },
            (Self::AwaitingOtp { context }, RecoveryEvent::OtpVerified { otp }) => {
                match context.origin() {
                    Origin::ForgotPassword => {
                        let context = context.advance(ContextPatch::new().otp(otp));
                        Self::SettingPassword {
                            ticket: ResetTicket::from_context(&context)?,
                        }
                    }
                    Origin::SignUp => Self::SettingUpProfile {
                        context: context.advance(ContextPatch::new().otp(otp)),
                    },
                    Origin::Unspecified => Self::AwaitingOtp { context },
                }
            }
            (Self::SettingPassword { .. }, RecoveryEvent::PasswordUpdated) => {
                Self::Done(Completion::PasswordReset)
            }
            (Self::SettingUpProfile { .. }, RecoveryEvent::ProfileCompleted) => {
                Self::Done(Completion::ProfileCompleted)
            }
            _ => {
                return Err(TransitionError::Rejected {
                    state,
                    event: event_name,
                })
            }
        };
        tracing::debug!(from = state, event = event_name, to = next.name(), "recovery transition");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn awaiting(origin: Origin) -> RecoveryState {
        RecoveryState::AwaitingOtp {
            context: RecoveryContext::create(origin, ContextPatch::new().email("ana@example.com")),
        }
    }

    #[test]
    fn test_reset_happy_path() {
        let state = RecoveryState::start_reset()
            .apply(RecoveryEvent::EmailSubmitted {
                email: "ana@example.com".into(),
            })
            .unwrap();
        assert_eq!(state.route(), Route::VerifyOtp);
        assert_eq!(state.context().unwrap().origin(), Origin::ForgotPassword);

        let state = state
            .apply(RecoveryEvent::OtpVerified { otp: "1234".into() })
            .unwrap();
        assert_matches!(&state, RecoveryState::SettingPassword { ticket } => {
            assert_eq!(ticket.otp(), "1234");
            assert_eq!(ticket.email(), Some("ana@example.com"));
        });

        let state = state.apply(RecoveryEvent::PasswordUpdated).unwrap();
        assert_eq!(state, RecoveryState::Done(Completion::PasswordReset));
        assert_eq!(state.route(), Route::Login);
        assert!(state.payload().is_none());
    }

    #[test]
    fn test_sign_up_branch() {
        let state = RecoveryState::start_sign_up(Some("ana@example.com".into()))
            .apply(RecoveryEvent::OtpVerified { otp: "5678".into() })
            .unwrap();
        assert_eq!(state.route(), Route::ProfileSetup);

        let state = state.apply(RecoveryEvent::ProfileCompleted).unwrap();
        assert_eq!(state.route(), Route::Chat);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_unspecified_origin_stays_on_otp() {
        let state = awaiting(Origin::Unspecified);
        let next = state
            .clone()
            .apply(RecoveryEvent::OtpVerified { otp: "1234".into() })
            .unwrap();
        assert_eq!(next, state);
        assert_eq!(next.route(), Route::VerifyOtp);
    }

    #[test]
    fn test_empty_otp_fails_closed() {
        let err = awaiting(Origin::ForgotPassword)
            .apply(RecoveryEvent::OtpVerified { otp: String::new() })
            .unwrap_err();
        assert_eq!(err, TransitionError::Guard(RecoveryError::SessionExpired));
    }

    #[test]
    fn test_no_backward_or_terminal_edges() {
        let err = awaiting(Origin::SignUp)
            .apply(RecoveryEvent::EmailSubmitted {
                email: "ana@example.com".into(),
            })
            .unwrap_err();
        assert_matches!(err, TransitionError::Rejected { state: "awaiting_otp", .. });

        let err = RecoveryState::Done(Completion::PasswordReset)
            .apply(RecoveryEvent::PasswordUpdated)
            .unwrap_err();
        assert_matches!(err, TransitionError::Rejected { state: "done", .. });
    }

    #[test]
    fn test_ticket_requires_otp() {
        let ctx = RecoveryContext::create(Origin::ForgotPassword, ContextPatch::new());
        assert_eq!(
            ResetTicket::from_context(&ctx).unwrap_err(),
            RecoveryError::SessionExpired
        );
    }

    #[test]
    fn test_payload_carries_context() {
        let state = awaiting(Origin::ForgotPassword)
            .apply(RecoveryEvent::OtpVerified { otp: "1234".into() })
            .unwrap();
        let payload = state.payload().unwrap();
        let ctx = RecoveryContext::from_payload(Some(&payload));
        assert_eq!(ctx.otp(), Some("1234"));
        assert_eq!(ctx.origin(), Origin::ForgotPassword);
    }
}
