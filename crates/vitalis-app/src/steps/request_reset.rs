//! Forgot-password screen: collects the account email and starts the reset.

use super::{StepController, StepEffects, SubmitOutcome, Transition};
use crate::context::RecoveryContext;
use crate::errors::RecoveryError;
use crate::form::{FormState, SubmissionStatus};
use crate::validation::schemas::{self, fields};
use crate::validation::{FormValues, Schema, ValidationMode};
use crate::workflow::{RecoveryEvent, RecoveryState};
use vitalis_core::Route;

/// Controller for the email entry step.
#[derive(Debug)]
pub struct RequestResetController {
    schema: Schema,
    form: FormState,
    effects: StepEffects,
}

impl RequestResetController {
    /// Mount an empty form.
    pub fn mount(effects: StepEffects) -> Self {
        Self {
            schema: schemas::request_reset(),
            form: FormState::new(),
            effects,
        }
    }

    /// Record input for `field` and re-run live validation.
    pub fn edit(&mut self, field: &str, value: impl Into<String>) {
        self.form.edit(&self.schema, self.mode(), field, value);
    }

    /// Validate and, if the email is well-formed, move to code entry.
    ///
    /// No network call is made here; the code itself is requested by the host
    /// before or after this step.
    pub fn submit(&mut self) -> Result<SubmitOutcome, RecoveryError> {
        let values = self.form.validate_for_submit(&self.schema)?;
        // The workflow starts here, so there is no incoming context.
        let transition = self.on_valid_submit(&values, &RecoveryContext::absent())?;
        self.form.set_status(SubmissionStatus::Succeeded);
        // Dispatch is immediate for this step, so no timer is kept.
        let _ = transition.dispatch(&self.effects);
        Ok(SubmitOutcome::Advanced(transition))
    }
}

impl StepController for RequestResetController {
    const ROUTE: Route = Route::ForgotPassword;
    type Output = Transition;

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn form(&self) -> FormState {
        self.form.clone()
    }

    /// Start a reset for the entered email. Any incoming context is ignored.
    fn on_valid_submit(
        &self,
        values: &FormValues,
        _context: &RecoveryContext,
    ) -> Result<Transition, RecoveryError> {
        let email = values.get(fields::EMAIL).cloned().unwrap_or_default();
        let next = RecoveryState::start_reset().apply(RecoveryEvent::EmailSubmitted { email })?;
        if let Some(domain) = next.context().and_then(|ctx| ctx.email_domain()) {
            tracing::info!(domain, "password reset requested");
        }
        Ok(Transition::immediate(next))
    }
}
