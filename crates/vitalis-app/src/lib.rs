//! # Vitalis App - Headless Account Workflows
//!
//! Portable core of the password reset and sign-up verification workflows.
//! Frontends render the state exposed here and forward user input; every side
//! effect goes through the effect traits in `vitalis-core`.
//!
//! ## Modules
//!
//! - [`validation`]: declarative field schemas
//! - [`context`]: identity context carried between steps
//! - [`workflow`]: the recovery state machine
//! - [`steps`]: one controller per screen
//! - [`gateway`]: the credential update request
//! - [`overlay`]: transient success/error feedback
//! - [`views`]: step metadata for progress indicators
//!
//! ## Flow
//!
//! ```text
//! ForgotPassword ──▶ VerifyOtp ──▶ SetNewPassword ──▶ Login
//!                        │
//!        (sign-up) ──────┴──────▶ ProfileSetup ──▶ Chat
//! ```

#![forbid(unsafe_code)]

pub mod context;
pub mod errors;
pub mod form;
pub mod gateway;
pub mod overlay;
pub mod steps;
pub mod validation;
pub mod views;
pub mod workflow;

pub use context::{ContextPatch, RecoveryContext};
pub use errors::{ErrorCategory, RecoveryError, RetryPath, Surface};
pub use form::{FormState, SubmissionStatus};
pub use gateway::{CredentialUpdate, CredentialUpdateGateway, GatewayError};
pub use overlay::{FeedbackOverlay, OverlayKind, OverlayState, PendingTimer};
pub use steps::{
    ProfileSetupController, RequestResetController, SetNewPasswordController, SetNewPasswordMode,
    StepController, StepEffects, SubmitOutcome, Transition, VerifyOtpController, Visibility,
    WorkflowTiming,
};
pub use validation::{FieldErrors, FieldRules, FormValues, Schema, ValidationMode};
pub use workflow::{Completion, RecoveryEvent, RecoveryState, ResetTicket, TransitionError};
