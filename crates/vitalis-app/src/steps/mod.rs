//! # Step Controllers
//!
//! One controller per screen. A controller owns its form, validates on
//! submit, and on success asks the state machine for the next state and hands
//! the resulting [`Transition`] to the navigator. Controllers are created when
//! their screen mounts and dropped when it unmounts; dropping one cancels every
//! timer it scheduled.

pub mod profile_setup;
pub mod request_reset;
pub mod set_new_password;
pub mod verify_otp;

pub use profile_setup::{Gender, HealthCondition, ProfileDraft, ProfileSetupController};
pub use request_reset::RequestResetController;
pub use set_new_password::{SetNewPasswordController, SetNewPasswordMode, Visibility};
pub use verify_otp::VerifyOtpController;

use crate::context::RecoveryContext;
use crate::errors::RecoveryError;
use crate::form::FormState;
use crate::overlay::PendingTimer;
use crate::validation::{FormValues, Schema, ValidationMode};
use crate::workflow::RecoveryState;
use std::sync::Arc;
use std::time::Duration;
use vitalis_core::{NavigationEffects, Route, TimerEffects};

/// Delays between a success overlay appearing and the step navigating away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkflowTiming {
    /// After a code is accepted
    pub otp_success_delay: Duration,
    /// After a password update is accepted
    pub password_success_delay: Duration,
}

impl Default for WorkflowTiming {
    fn default() -> Self {
        Self {
            otp_success_delay: Duration::from_millis(1500),
            password_success_delay: Duration::from_millis(2000),
        }
    }
}

/// Effect handlers a step needs.
#[derive(Clone)]
pub struct StepEffects {
    /// Screen transitions
    pub navigator: Arc<dyn NavigationEffects>,
    /// Delayed navigation and overlay dismissal
    pub timer: Arc<dyn TimerEffects>,
}

impl StepEffects {
    /// Bundle the handlers a step needs.
    pub fn new(navigator: Arc<dyn NavigationEffects>, timer: Arc<dyn TimerEffects>) -> Self {
        Self { navigator, timer }
    }
}

impl std::fmt::Debug for StepEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepEffects").finish_non_exhaustive()
    }
}

/// A move to the next workflow state, optionally after a delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    next: RecoveryState,
    delay: Option<Duration>,
}

impl Transition {
    /// Navigate as soon as the transition is dispatched.
    #[must_use]
    pub fn immediate(next: RecoveryState) -> Self {
        Self { next, delay: None }
    }

    /// Navigate once `delay` has elapsed.
    #[must_use]
    pub fn delayed(next: RecoveryState, delay: Duration) -> Self {
        Self {
            next,
            delay: Some(delay),
        }
    }

    /// State the workflow moves to.
    #[must_use]
    pub fn next(&self) -> &RecoveryState {
        &self.next
    }

    /// Screen the transition lands on.
    #[must_use]
    pub fn route(&self) -> Route {
        self.next.route()
    }

    /// Wait before navigating, if any.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Perform the navigation.
    ///
    /// A delayed transition returns the pending timer; the caller keeps it for
    /// as long as the step is mounted. If the timer cannot be scheduled the
    /// navigation happens immediately instead of never.
    pub(crate) fn dispatch(&self, effects: &StepEffects) -> Option<PendingTimer> {
        let route = self.next.route();
        let payload = self.next.payload();

        let delay = match self.delay {
            Some(delay) if !delay.is_zero() => delay,
            _ => {
                effects.navigator.navigate(route, payload);
                return None;
            }
        };

        let navigator = Arc::clone(&effects.navigator);
        let deferred = payload.clone();
        let task = Box::new(move || navigator.navigate(route, deferred));
        match PendingTimer::schedule(&effects.timer, delay, task) {
            Ok(pending) => Some(pending),
            Err(e) => {
                tracing::warn!(error = %e, %route, "delayed navigation unavailable; navigating now");
                effects.navigator.navigate(route, payload);
                None
            }
        }
    }
}

/// Result of a submit that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The workflow moved on (possibly after a delay)
    Advanced(Transition),
    /// The step finished without leaving its screen
    Completed,
    /// A submission was already under way; nothing happened
    Ignored,
}

/// Shared surface of every step controller.
pub trait StepController {
    /// Screen the controller runs on.
    const ROUTE: Route;

    /// What a validated submission resolves to.
    type Output;

    /// Rules for the step's fields.
    fn schema(&self) -> &Schema;

    /// When field errors are recomputed.
    fn mode(&self) -> ValidationMode {
        ValidationMode::Live
    }

    /// Snapshot of the form.
    fn form(&self) -> FormState;

    /// Decide what a validated value set leads to, given the workflow context
    /// the step was entered with. Performs no navigation and no I/O.
    fn on_valid_submit(
        &self,
        values: &FormValues,
        context: &RecoveryContext,
    ) -> Result<Self::Output, RecoveryError>;
}
