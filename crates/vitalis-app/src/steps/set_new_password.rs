//! New password screen.
//!
//! Runs in two modes. `Reset` finishes the forgot-password flow and needs the
//! email and one-time code from the previous step; without a code it fails
//! closed before touching the network. `Change` is the signed-in variant and
//! relies on the bearer token alone.
//!
//! The controller is shared with an async submit, so its mutable parts live
//! behind a mutex that is never held across an await.

use super::{StepController, StepEffects, SubmitOutcome, Transition, WorkflowTiming};
use crate::context::RecoveryContext;
use crate::errors::RecoveryError;
use crate::form::{FormState, SubmissionStatus};
use crate::gateway::{CredentialUpdate, CredentialUpdateGateway, GatewayError};
use crate::overlay::{FeedbackOverlay, OverlayKind, OverlayState, PendingTimer};
use crate::validation::schemas::{self, fields};
use crate::validation::{FormValues, Schema};
use crate::workflow::{RecoveryEvent, RecoveryState, ResetTicket};
use parking_lot::Mutex;
use std::sync::Arc;
use vitalis_core::Route;

/// Overlay text once the update is accepted.
pub const UPDATED_MESSAGE: &str = "Password Updated";

/// Submit label while the update is in flight.
pub const SUBMITTING_LABEL: &str = "Updating...";

/// Which flow the screen belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SetNewPasswordMode {
    /// Final step of forgot-password; navigates to sign-in on success
    #[default]
    Reset,
    /// Signed-in password change; stays on the screen
    Change,
}

impl SetNewPasswordMode {
    /// Idle submit label.
    #[must_use]
    pub fn button_label(self) -> &'static str {
        match self {
            Self::Reset => "Reset Password",
            Self::Change => "Save New Password",
        }
    }
}

/// Whether a password input shows its characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Characters hidden
    #[default]
    Masked,
    /// Characters shown
    Revealed,
}

impl Visibility {
    /// The other state.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Masked => Self::Revealed,
            Self::Revealed => Self::Masked,
        }
    }
}

#[derive(Debug)]
struct PasswordStep {
    form: FormState,
    banner: Option<RecoveryError>,
    overlay: FeedbackOverlay,
    pending_navigation: Option<PendingTimer>,
    password: Visibility,
    confirm: Visibility,
}

/// Controller for the new password step.
#[derive(Debug)]
pub struct SetNewPasswordController {
    mode: SetNewPasswordMode,
    schema: Schema,
    context: RecoveryContext,
    gateway: Arc<CredentialUpdateGateway>,
    effects: StepEffects,
    timing: WorkflowTiming,
    step: Mutex<PasswordStep>,
}

impl SetNewPasswordController {
    /// Mount with the context the screen was navigated to with.
    pub fn mount(
        mode: SetNewPasswordMode,
        gateway: Arc<CredentialUpdateGateway>,
        effects: StepEffects,
        timing: WorkflowTiming,
    ) -> Self {
        let arrival = effects.navigator.arrival_payload();
        let context = RecoveryContext::from_payload(arrival.as_ref());
        let step = PasswordStep {
            form: FormState::new(),
            banner: None,
            overlay: FeedbackOverlay::new(effects.timer.clone()),
            pending_navigation: None,
            password: Visibility::Masked,
            confirm: Visibility::Masked,
        };
        Self {
            mode,
            schema: schemas::set_new_password(),
            context,
            gateway,
            effects,
            timing,
            step: Mutex::new(step),
        }
    }

    /// Record input for `field` and re-run live validation.
    pub fn edit(&self, field: &str, value: impl Into<String>) {
        let mode = self.mode();
        self.step.lock().form.edit(&self.schema, mode, field, value);
    }

    /// Flip masking for the password or confirmation input.
    pub fn toggle_visibility(&self, field: &str) -> Visibility {
        let mut step = self.step.lock();
        let slot = match field {
            fields::PASSWORD => &mut step.password,
            fields::CONFIRM_PASSWORD => &mut step.confirm,
            _ => return Visibility::Masked,
        };
        *slot = slot.toggled();
        *slot
    }

    /// Masking state of the password or confirmation input.
    #[must_use]
    pub fn visibility(&self, field: &str) -> Visibility {
        let step = self.step.lock();
        match field {
            fields::PASSWORD => step.password,
            fields::CONFIRM_PASSWORD => step.confirm,
            _ => Visibility::Masked,
        }
    }

    /// Flow this screen was mounted for.
    #[must_use]
    pub fn password_mode(&self) -> SetNewPasswordMode {
        self.mode
    }

    /// Context handed over by code entry.
    #[must_use]
    pub fn context(&self) -> &RecoveryContext {
        &self.context
    }

    /// Error shown under the form, if any.
    #[must_use]
    pub fn banner(&self) -> Option<RecoveryError> {
        self.step.lock().banner.clone()
    }

    /// Current overlay.
    #[must_use]
    pub fn overlay(&self) -> OverlayState {
        self.step.lock().overlay.state()
    }

    /// Submit button text for the current status.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.step.lock().form.status() == SubmissionStatus::Submitting {
            SUBMITTING_LABEL
        } else {
            self.mode.button_label()
        }
    }

    /// Whether the submit button is disabled.
    #[must_use]
    pub fn is_submit_disabled(&self) -> bool {
        self.step.lock().form.status().is_busy()
    }

    /// Validate and send the update.
    ///
    /// Returns `Ignored` while a previous submit is still outstanding or a
    /// navigation away is already scheduled. Dropping the returned future
    /// before it settles puts the form back to `Idle`.
    pub async fn submit(&self) -> Result<SubmitOutcome, RecoveryError> {
        let values = {
            let mut step = self.step.lock();
            if step.form.status() == SubmissionStatus::Submitting
                || step.pending_navigation.is_some()
            {
                return Ok(SubmitOutcome::Ignored);
            }
            step.banner = None;
            let values = step.form.validate_for_submit(&self.schema)?;
            step.form.set_status(SubmissionStatus::Submitting);
            values
        };
        let _submitting = SubmittingGuard(&self.step);

        let (update, ticket) = match self.on_valid_submit(&values, &self.context) {
            Ok(prepared) => prepared,
            Err(e) => return Err(self.fail(e)),
        };

        match self.gateway.submit(update).await {
            Ok(()) => self.succeed(ticket),
            Err(GatewayError::InFlight) => {
                self.step.lock().form.set_status(SubmissionStatus::Idle);
                Ok(SubmitOutcome::Ignored)
            }
            Err(GatewayError::Failed(e)) => Err(self.fail(e)),
        }
    }

    fn succeed(&self, ticket: Option<ResetTicket>) -> Result<SubmitOutcome, RecoveryError> {
        let delay = self.timing.password_success_delay;
        let mut step = self.step.lock();
        step.form.set_status(SubmissionStatus::Succeeded);

        let Some(ticket) = ticket else {
            tracing::info!("password changed");
            step.overlay.show(OverlayKind::Success, UPDATED_MESSAGE, Some(delay));
            return Ok(SubmitOutcome::Completed);
        };

        if let Some(domain) = ticket.context().email_domain() {
            tracing::info!(domain, "password reset completed");
        }
        let next = RecoveryState::SettingPassword { ticket }.apply(RecoveryEvent::PasswordUpdated)?;
        let transition = Transition::delayed(next, delay);
        step.overlay.show(OverlayKind::Success, UPDATED_MESSAGE, None);
        step.pending_navigation = transition.dispatch(&self.effects);
        Ok(SubmitOutcome::Advanced(transition))
    }

    fn fail(&self, error: RecoveryError) -> RecoveryError {
        tracing::warn!(category = %error.category(), "password update failed");
        let mut step = self.step.lock();
        step.form.set_status(SubmissionStatus::Failed);
        step.banner = Some(error.clone());
        error
    }
}

impl StepController for SetNewPasswordController {
    const ROUTE: Route = Route::SetNewPassword;

    /// The request to send, plus the reset ticket when finishing a reset.
    type Output = (CredentialUpdate, Option<ResetTicket>);

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn form(&self) -> FormState {
        self.step.lock().form.clone()
    }

    /// Build the credential update. A reset without a one-time code fails
    /// here, before anything is sent.
    fn on_valid_submit(
        &self,
        values: &FormValues,
        context: &RecoveryContext,
    ) -> Result<Self::Output, RecoveryError> {
        let field = |name: &str| values.get(name).cloned().unwrap_or_default();
        let new_password = field(fields::PASSWORD);
        let confirm_password = field(fields::CONFIRM_PASSWORD);

        match self.mode {
            SetNewPasswordMode::Reset => {
                let ticket = ResetTicket::from_context(context)?;
                let update = CredentialUpdate {
                    email: ticket.email().map(str::to_string),
                    otp: Some(ticket.otp().to_string()),
                    new_password,
                    confirm_password,
                };
                Ok((update, Some(ticket)))
            }
            SetNewPasswordMode::Change => {
                let update = CredentialUpdate {
                    email: context.email().map(str::to_string),
                    otp: context.otp().map(str::to_string),
                    new_password,
                    confirm_password,
                };
                Ok((update, None))
            }
        }
    }
}

// Settled submits have already left `Submitting`; only an abandoned one is
// reset here.
struct SubmittingGuard<'a>(&'a Mutex<PasswordStep>);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        let mut step = self.0.lock();
        if step.form.status() == SubmissionStatus::Submitting {
            step.form.set_status(SubmissionStatus::Idle);
        }
    }
}
