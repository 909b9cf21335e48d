//! Overlay and delayed navigation driven by the real Tokio timer.

use std::sync::Arc;
use std::time::Duration;
use vitalis_app::validation::schemas::fields;
use vitalis_app::{
    FeedbackOverlay, OverlayKind, OverlayState, StepEffects, VerifyOtpController, WorkflowTiming,
};
use vitalis_core::{Origin, Route};
use vitalis_effects::TokioTimerHandler;
use vitalis_testkit::{fixtures, RecordingNavigator};

fn short_timing() -> WorkflowTiming {
    WorkflowTiming {
        otp_success_delay: Duration::from_millis(30),
        password_success_delay: Duration::from_millis(30),
    }
}

#[tokio::test]
async fn test_overlay_dismisses_itself() {
    let timer = Arc::new(TokioTimerHandler::new());
    let mut overlay = FeedbackOverlay::new(timer.clone());
    overlay.show(OverlayKind::Success, "Password Updated", Some(Duration::from_millis(20)));
    assert!(overlay.has_pending_dismissal());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(overlay.state(), OverlayState::Hidden);
    assert_eq!(timer.pending(), 0);
}

#[tokio::test]
async fn test_dropped_overlay_cancels_dismissal() {
    let timer = Arc::new(TokioTimerHandler::new());
    let mut overlay = FeedbackOverlay::new(timer.clone());
    overlay.show(OverlayKind::Error, "try again", Some(Duration::from_secs(5)));
    assert_eq!(timer.pending(), 1);

    drop(overlay);
    assert_eq!(timer.pending(), 0);
}

#[tokio::test]
async fn test_verified_code_navigates_after_delay() {
    let navigator = Arc::new(RecordingNavigator::new());
    navigator.set_arrival(Some(fixtures::arrival(Origin::SignUp, Some(fixtures::EMAIL), None)));
    let effects = StepEffects::new(navigator.clone(), Arc::new(TokioTimerHandler::new()));

    let mut step = VerifyOtpController::mount(effects, short_timing());
    step.edit(fields::OTP, fixtures::OTP);
    step.submit().unwrap();
    assert!(navigator.visits().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(navigator.last_route(), Some(Route::ProfileSetup));
}

#[tokio::test]
async fn test_unmounted_step_never_navigates() {
    let navigator = Arc::new(RecordingNavigator::new());
    navigator.set_arrival(Some(fixtures::arrival(Origin::ForgotPassword, Some(fixtures::EMAIL), None)));
    let timer = Arc::new(TokioTimerHandler::new());
    let effects = StepEffects::new(navigator.clone(), timer.clone());

    let mut step = VerifyOtpController::mount(effects, short_timing());
    step.edit(fields::OTP, fixtures::OTP);
    step.submit().unwrap();
    drop(step);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(navigator.visits().is_empty());
    assert_eq!(timer.pending(), 0);
}
