//! Code entry screen, shared by the reset and sign-up flows.
//!
//! A well-formed code is accepted optimistically: the step shows a success
//! overlay and navigates after a short delay. The server checks the code when
//! the credential update (or profile save) is sent.

use super::{StepController, StepEffects, SubmitOutcome, Transition, WorkflowTiming};
use crate::context::RecoveryContext;
use crate::errors::RecoveryError;
use crate::form::{FormState, SubmissionStatus};
use crate::overlay::{FeedbackOverlay, OverlayKind, OverlayState, PendingTimer};
use crate::validation::schemas::{self, fields};
use crate::validation::{FormValues, Schema};
use crate::workflow::{RecoveryEvent, RecoveryState};
use vitalis_core::Route;

/// Overlay text once a code is accepted.
pub const VERIFIED_MESSAGE: &str = "Verification Completed";

/// Controller for the one-time code step.
#[derive(Debug)]
pub struct VerifyOtpController {
    schema: Schema,
    form: FormState,
    context: RecoveryContext,
    effects: StepEffects,
    timing: WorkflowTiming,
    overlay: FeedbackOverlay,
    pending_navigation: Option<PendingTimer>,
    represent: Option<PendingTimer>,
}

impl VerifyOtpController {
    /// Mount with the context the screen was navigated to with.
    pub fn mount(effects: StepEffects, timing: WorkflowTiming) -> Self {
        let arrival = effects.navigator.arrival_payload();
        let context = RecoveryContext::from_payload(arrival.as_ref());
        tracing::debug!(origin = %context.origin(), "code entry mounted");
        Self {
            schema: schemas::verify_otp(),
            form: FormState::new(),
            context,
            overlay: FeedbackOverlay::new(effects.timer.clone()),
            effects,
            timing,
            pending_navigation: None,
            represent: None,
        }
    }

    /// Record input for `field` and re-run live validation.
    pub fn edit(&mut self, field: &str, value: impl Into<String>) {
        self.form.edit(&self.schema, self.mode(), field, value);
    }

    /// Validate the code and schedule the move to the next step.
    ///
    /// Once a navigation to another step is pending further submits are
    /// ignored. When the origin is unknown the step re-presents itself: the
    /// overlay hides after the same delay and the form accepts a new code.
    pub fn submit(&mut self) -> Result<SubmitOutcome, RecoveryError> {
        if self.pending_navigation.is_some() {
            return Ok(SubmitOutcome::Ignored);
        }

        let values = self.form.validate_for_submit(&self.schema)?;
        let transition = match self.on_valid_submit(&values, &self.context) {
            Ok(transition) => transition,
            Err(e) => {
                self.form.set_status(SubmissionStatus::Failed);
                return Err(e);
            }
        };

        if transition.route() == Self::ROUTE {
            self.overlay
                .show(OverlayKind::Success, VERIFIED_MESSAGE, transition.delay());
            // Replacing an earlier re-presentation cancels it.
            self.represent = transition.dispatch(&self.effects);
            self.form.set_status(SubmissionStatus::Idle);
        } else {
            self.overlay.show(OverlayKind::Success, VERIFIED_MESSAGE, None);
            self.represent = None;
            self.pending_navigation = transition.dispatch(&self.effects);
            self.form.set_status(SubmissionStatus::Succeeded);
        }
        Ok(SubmitOutcome::Advanced(transition))
    }

    /// Context the step was mounted with.
    #[must_use]
    pub fn context(&self) -> &RecoveryContext {
        &self.context
    }

    /// Current overlay.
    #[must_use]
    pub fn overlay(&self) -> OverlayState {
        self.overlay.state()
    }

    /// Whether a navigation is scheduled and not yet cancelled.
    #[must_use]
    pub fn is_navigation_pending(&self) -> bool {
        self.pending_navigation.is_some()
    }
}

impl StepController for VerifyOtpController {
    const ROUTE: Route = Route::VerifyOtp;
    type Output = Transition;

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn form(&self) -> FormState {
        self.form.clone()
    }

    /// Delayed transition for a validated code, branching on the origin.
    fn on_valid_submit(
        &self,
        values: &FormValues,
        context: &RecoveryContext,
    ) -> Result<Transition, RecoveryError> {
        let otp = values.get(fields::OTP).cloned().unwrap_or_default();
        let next = RecoveryState::AwaitingOtp {
            context: context.clone(),
        }
        .apply(RecoveryEvent::OtpVerified { otp })?;

        if matches!(next, RecoveryState::AwaitingOtp { .. }) {
            tracing::warn!("code entry reached without a known origin; staying on this step");
        }
        Ok(Transition::delayed(next, self.timing.otp_success_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextPatch;
    use std::sync::Arc;
    use std::time::Duration;
    use vitalis_core::Origin;
    use vitalis_testkit::{ManualTimer, RecordingNavigator};

    struct Harness {
        navigator: Arc<RecordingNavigator>,
        timer: Arc<ManualTimer>,
        step: VerifyOtpController,
    }

    fn mount(origin: Option<Origin>) -> Harness {
        let navigator = Arc::new(RecordingNavigator::new());
        if let Some(origin) = origin {
            let ctx = RecoveryContext::create(origin, ContextPatch::new().email("ana@example.com"));
            navigator.set_arrival(Some(ctx.to_payload()));
        }
        let timer = Arc::new(ManualTimer::new());
        let effects = StepEffects::new(navigator.clone(), timer.clone());
        let step = VerifyOtpController::mount(effects, WorkflowTiming::default());
        Harness {
            navigator,
            timer,
            step,
        }
    }

    #[test]
    fn test_reset_origin_goes_to_password_after_delay() {
        let mut h = mount(Some(Origin::ForgotPassword));
        h.step.edit(fields::OTP, "1234");

        let outcome = h.step.submit().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced(ref t) if t.route() == Route::SetNewPassword));
        assert_eq!(
            h.step.overlay(),
            OverlayState::Visible {
                kind: OverlayKind::Success,
                message: VERIFIED_MESSAGE.into(),
                auto_dismiss_after: None,
            }
        );

        h.timer.advance(Duration::from_millis(1499));
        assert!(h.navigator.visits().is_empty());
        h.timer.advance(Duration::from_millis(1));

        let visit = h.navigator.visits().pop().unwrap();
        assert_eq!(visit.route, Route::SetNewPassword);
        let ctx = RecoveryContext::from_payload(visit.payload.as_ref());
        assert_eq!(ctx.otp(), Some("1234"));
        assert_eq!(ctx.email(), Some("ana@example.com"));
    }

    #[test]
    fn test_sign_up_origin_goes_to_profile_setup() {
        let mut h = mount(Some(Origin::SignUp));
        h.step.edit(fields::OTP, "9876");
        h.step.submit().unwrap();
        h.timer.advance(Duration::from_millis(1500));
        assert_eq!(h.navigator.last_route(), Some(Route::ProfileSetup));
    }

    #[test]
    fn test_missing_origin_stays_on_code_entry() {
        let mut h = mount(None);
        assert_eq!(h.step.context().origin(), Origin::Unspecified);
        h.step.edit(fields::OTP, "1234");
        h.step.submit().unwrap();
        h.timer.advance(Duration::from_millis(1500));
        assert_eq!(h.navigator.last_route(), Some(Route::VerifyOtp));
    }

    #[test]
    fn test_missing_origin_accepts_another_code() {
        let mut h = mount(None);
        h.step.edit(fields::OTP, "1234");
        h.step.submit().unwrap();
        assert!(!h.step.is_navigation_pending());
        assert_eq!(h.step.form().status(), SubmissionStatus::Idle);

        h.timer.advance(Duration::from_millis(1500));
        assert_eq!(h.step.overlay(), OverlayState::Hidden);
        assert_eq!(h.navigator.visits().len(), 1);

        h.timer.advance(Duration::from_secs(60));
        h.step.edit(fields::OTP, "5678");
        let outcome = h.step.submit().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced(ref t) if t.route() == Route::VerifyOtp));
        assert!(h.step.overlay() != OverlayState::Hidden);

        h.timer.advance(Duration::from_millis(1500));
        assert_eq!(h.navigator.visits().len(), 2);
        assert_eq!(h.timer.pending(), 0);
    }

    #[test]
    fn test_malformed_code_is_rejected_inline() {
        let mut h = mount(Some(Origin::ForgotPassword));
        for (code, message) in [
            ("", "OTP is required"),
            ("123", "Please enter all 4 digits"),
            ("12a4", "Only numbers are allowed"),
        ] {
            h.step.edit(fields::OTP, code);
            let err = h.step.submit().unwrap_err();
            assert_eq!(err.field_errors().and_then(|e| e.get(fields::OTP)), Some(message));
        }
        assert!(!h.step.is_navigation_pending());
        assert_eq!(h.timer.pending(), 0);
    }

    #[test]
    fn test_second_submit_is_ignored() {
        let mut h = mount(Some(Origin::ForgotPassword));
        h.step.edit(fields::OTP, "1234");
        h.step.submit().unwrap();
        assert_eq!(h.step.submit().unwrap(), SubmitOutcome::Ignored);
        assert_eq!(h.timer.pending(), 1);

        h.timer.advance(Duration::from_millis(1500));
        assert_eq!(h.navigator.visits().len(), 1);
    }

    #[test]
    fn test_unmount_cancels_navigation() {
        let mut h = mount(Some(Origin::ForgotPassword));
        h.step.edit(fields::OTP, "1234");
        h.step.submit().unwrap();

        drop(h.step);
        assert_eq!(h.timer.pending(), 0);
        h.timer.advance(Duration::from_secs(5));
        assert!(h.navigator.visits().is_empty());
    }
}
