//! Terminal host loop.
//!
//! Mounts the controller for the current route, feeds it prompted input and
//! waits for the navigation it triggers. A controller stays alive until its
//! navigation arrives so delayed transitions are not cancelled early.

use crate::prompt::Prompt;
use anyhow::{anyhow, bail, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use vitalis_app::steps::HealthCondition;
use vitalis_app::validation::schemas::fields;
use vitalis_app::views::{format_wizard_progress, ResetFlowStep, SignUpFlowStep};
use vitalis_app::{
    CredentialUpdateGateway, OverlayState, ProfileSetupController, RecoveryError,
    RequestResetController, RetryPath, SetNewPasswordController, SetNewPasswordMode,
    StepController, StepEffects, SubmitOutcome, VerifyOtpController, WorkflowTiming,
};
use vitalis_core::Route;

/// Which workflow the host is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Reset,
    SignUp,
    Change,
}

pub struct Host {
    pub effects: StepEffects,
    pub gateway: Arc<CredentialUpdateGateway>,
    pub timing: WorkflowTiming,
    pub routes: mpsc::UnboundedReceiver<Route>,
    pub prompt: Prompt,
    pub flow: Flow,
}

impl Host {
    /// Run from `start` until the workflow leaves for sign-in or chat, or
    /// finishes in place. Returns the last route reached.
    pub async fn run(mut self, start: Route) -> Result<Route> {
        let mut route = start;
        loop {
            self.announce(route);
            let next = match route {
                Route::ForgotPassword => self.request_reset().await?,
                Route::VerifyOtp => self.verify_otp().await?,
                Route::SetNewPassword => self.set_new_password().await?,
                Route::ProfileSetup => self.profile_setup().await?,
                Route::Login | Route::Chat => return Ok(route),
            };
            match next {
                Some(next) => route = next,
                None => return Ok(route),
            }
        }
    }

    fn announce(&self, route: Route) {
        let step = match self.flow {
            Flow::Reset => ResetFlowStep::for_route(route)
                .map(|s| (s.number(), ResetFlowStep::total_steps(), s.title(), s.description())),
            Flow::SignUp => SignUpFlowStep::for_route(route)
                .map(|s| (s.number(), SignUpFlowStep::total_steps(), s.title(), s.description())),
            Flow::Change => None,
        };
        match step {
            Some((number, total, title, description)) => {
                println!();
                println!("{} · {title}", format_wizard_progress(number, total));
                println!("{description}");
            }
            None if route.leaves_workflow() => println!("\nContinue at {}", route.path()),
            None => {}
        }
    }

    async fn next_route(&mut self) -> Result<Route> {
        self.routes
            .recv()
            .await
            .ok_or_else(|| anyhow!("navigation channel closed"))
    }

    async fn request_reset(&mut self) -> Result<Option<Route>> {
        let mut step = RequestResetController::mount(self.effects.clone());
        loop {
            let email = self.prompt.ask("Email").await?;
            step.edit(fields::EMAIL, email);
            match step.submit() {
                Ok(_) => return self.next_route().await.map(Some),
                Err(e) => report(&step, &e),
            }
        }
    }

    async fn verify_otp(&mut self) -> Result<Option<Route>> {
        let mut step = VerifyOtpController::mount(self.effects.clone(), self.timing);
        loop {
            let code = self.prompt.ask("4-digit code").await?;
            step.edit(fields::OTP, code);
            match step.submit() {
                Ok(SubmitOutcome::Ignored) => continue,
                Ok(_) => {
                    show(&step.overlay());
                    // Keep the controller mounted until its delayed move lands.
                    return self.next_route().await.map(Some);
                }
                Err(e) => report(&step, &e),
            }
        }
    }

    async fn set_new_password(&mut self) -> Result<Option<Route>> {
        let mode = match self.flow {
            Flow::Change => SetNewPasswordMode::Change,
            Flow::Reset | Flow::SignUp => SetNewPasswordMode::Reset,
        };
        let step = SetNewPasswordController::mount(
            mode,
            self.gateway.clone(),
            self.effects.clone(),
            self.timing,
        );
        loop {
            let password = self.prompt.ask("New password").await?;
            let confirm = self.prompt.ask("Confirm password").await?;
            step.edit(fields::PASSWORD, password);
            step.edit(fields::CONFIRM_PASSWORD, confirm);

            println!("{}", step.submit_label());
            match step.submit().await {
                Ok(SubmitOutcome::Advanced(_)) => {
                    show(&step.overlay());
                    return self.next_route().await.map(Some);
                }
                Ok(SubmitOutcome::Completed) => {
                    show(&step.overlay());
                    return Ok(None);
                }
                Ok(SubmitOutcome::Ignored) => continue,
                Err(e) if e.retry_path() == RetryPath::RestartWorkflow => {
                    report(&step, &e);
                    bail!("{e}");
                }
                Err(e) => report(&step, &e),
            }
        }
    }

    async fn profile_setup(&mut self) -> Result<Option<Route>> {
        let mut step = ProfileSetupController::mount(self.effects.clone());
        if !self.prompt.confirm("Set up your health profile now?").await? {
            step.skip()?;
            return self.next_route().await.map(Some);
        }

        loop {
            for (field, label) in [
                (fields::AGE, "Age"),
                (fields::WEIGHT, "Weight (kg)"),
                (fields::HEIGHT, "Height (cm)"),
                (fields::GENDER, "Gender (Male/Female)"),
            ] {
                let value = self.prompt.ask(label).await?;
                step.edit(field, value);
            }
            for condition in HealthCondition::all() {
                let checked = step.selected_conditions().contains(condition);
                if self.prompt.confirm(condition.label()).await? != checked {
                    step.toggle_condition(*condition);
                }
            }
            let other = self.prompt.ask("Other conditions (optional)").await?;
            step.edit(fields::OTHER_CONDITIONS, other);

            match step.submit() {
                Ok(_) => {
                    if let Some(draft) = step.draft() {
                        println!("{}", serde_json::to_string_pretty(draft)?);
                    }
                    return self.next_route().await.map(Some);
                }
                Err(e) => report(&step, &e),
            }
        }
    }
}

fn show(overlay: &OverlayState) {
    if let OverlayState::Visible { message, .. } = overlay {
        println!("✔ {message}");
    }
}

fn report<C: StepController>(step: &C, err: &RecoveryError) {
    tracing::debug!(
        route = %C::ROUTE,
        category = %err.category(),
        status = ?step.form().status(),
        "submission rejected"
    );
    match err.field_errors() {
        Some(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
        }
        None => eprintln!("{err} ({})", err.category().resolution_hint()),
    }
}
