//! Health profile screen at the end of the sign-up flow.
//!
//! Collects a few body measurements and an optional condition checklist. The
//! draft is handed back to the host on submit; storing it is the host's job.
//! Skipping leaves straight for the chat screen.

use super::{StepController, StepEffects, SubmitOutcome, Transition};
use crate::context::RecoveryContext;
use crate::errors::RecoveryError;
use crate::form::{FormState, SubmissionStatus};
use crate::validation::schemas::{self, fields};
use crate::validation::{FieldErrors, FormValues, Schema};
use crate::workflow::{RecoveryEvent, RecoveryState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use vitalis_core::Route;

/// Gender options offered on the profile form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            _ => Err(()),
        }
    }
}

/// Conditions offered in the checklist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HealthCondition {
    Asthma,
    Diabetes,
    HighBloodPressure,
    SeasonalAllergies,
    Arthritis,
    Lupus,
}

impl HealthCondition {
    /// All conditions in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Asthma,
            Self::Diabetes,
            Self::HighBloodPressure,
            Self::SeasonalAllergies,
            Self::Arthritis,
            Self::Lupus,
        ]
    }

    /// Text shown next to the checkbox.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Asthma => "Asthma",
            Self::Diabetes => "Diabetes",
            Self::HighBloodPressure => "High Blood Pressure",
            Self::SeasonalAllergies => "Seasonal Allergies",
            Self::Arthritis => "Arthritis",
            Self::Lupus => "Lupus",
        }
    }
}

impl fmt::Display for HealthCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated health profile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileDraft {
    /// Whole years, 1 to 120
    pub age: u8,
    /// Kilograms
    pub weight: f64,
    /// Centimetres
    pub height: f64,
    /// Selected gender
    pub gender: Gender,
    /// Checked conditions in display order
    pub health_conditions: Vec<HealthCondition>,
    /// Free text, trimmed; absent when blank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_conditions: Option<String>,
}

/// Controller for the profile setup step.
#[derive(Debug)]
pub struct ProfileSetupController {
    schema: Schema,
    form: FormState,
    conditions: BTreeSet<HealthCondition>,
    context: RecoveryContext,
    effects: StepEffects,
    draft: Option<ProfileDraft>,
}

impl ProfileSetupController {
    /// Mount with the context the screen was navigated to with.
    pub fn mount(effects: StepEffects) -> Self {
        let arrival = effects.navigator.arrival_payload();
        Self {
            schema: schemas::profile_setup(),
            form: FormState::new(),
            conditions: BTreeSet::new(),
            context: RecoveryContext::from_payload(arrival.as_ref()),
            effects,
            draft: None,
        }
    }

    /// Record input for `field` and re-run live validation.
    pub fn edit(&mut self, field: &str, value: impl Into<String>) {
        self.form.edit(&self.schema, self.mode(), field, value);
    }

    /// Check or uncheck a condition. Returns whether it is now checked.
    pub fn toggle_condition(&mut self, condition: HealthCondition) -> bool {
        if self.conditions.remove(&condition) {
            false
        } else {
            self.conditions.insert(condition);
            true
        }
    }

    /// Checked conditions in display order.
    #[must_use]
    pub fn selected_conditions(&self) -> Vec<HealthCondition> {
        self.conditions.iter().copied().collect()
    }

    /// Draft produced by the last successful submit.
    #[must_use]
    pub fn draft(&self) -> Option<&ProfileDraft> {
        self.draft.as_ref()
    }

    /// Context handed over by code entry.
    #[must_use]
    pub fn context(&self) -> &RecoveryContext {
        &self.context
    }

    /// Validate, build the draft and leave for chat.
    pub fn submit(&mut self) -> Result<SubmitOutcome, RecoveryError> {
        let values = self.form.validate_for_submit(&self.schema)?;
        let (draft, transition) = match self.on_valid_submit(&values, &self.context) {
            Ok(result) => result,
            Err(e) => {
                self.form.set_status(SubmissionStatus::Failed);
                return Err(e);
            }
        };
        tracing::info!(conditions = draft.health_conditions.len(), "profile completed");
        self.draft = Some(draft);
        self.form.set_status(SubmissionStatus::Succeeded);
        let _ = transition.dispatch(&self.effects);
        Ok(SubmitOutcome::Advanced(transition))
    }

    /// Leave for chat without a profile.
    pub fn skip(&mut self) -> Result<SubmitOutcome, RecoveryError> {
        let transition = self.complete(&self.context)?;
        tracing::info!("profile setup skipped");
        let _ = transition.dispatch(&self.effects);
        Ok(SubmitOutcome::Advanced(transition))
    }

    fn complete(&self, context: &RecoveryContext) -> Result<Transition, RecoveryError> {
        let next = RecoveryState::SettingUpProfile {
            context: context.clone(),
        }
        .apply(RecoveryEvent::ProfileCompleted)?;
        Ok(Transition::immediate(next))
    }
}

impl StepController for ProfileSetupController {
    const ROUTE: Route = Route::ProfileSetup;
    type Output = (ProfileDraft, Transition);

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn form(&self) -> FormState {
        self.form.clone()
    }

    /// Build the draft and the move to chat for a validated value set.
    fn on_valid_submit(
        &self,
        values: &FormValues,
        context: &RecoveryContext,
    ) -> Result<Self::Output, RecoveryError> {
        let age = parse_field(values, fields::AGE, "Please enter a valid age")
            .map(whole_years)?
            .ok_or_else(|| field_error(fields::AGE, "Please enter a valid age"))?;
        let draft = ProfileDraft {
            age,
            weight: parse_field(values, fields::WEIGHT, "Weight must be a number")?,
            height: parse_field(values, fields::HEIGHT, "Height must be a number")?,
            gender: parse_field(values, fields::GENDER, "Please select gender")?,
            health_conditions: self.selected_conditions(),
            other_conditions: values
                .get(fields::OTHER_CONDITIONS)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        Ok((draft, self.complete(context)?))
    }
}

// The schema has already accepted the value; this only converts it.
fn parse_field<T: FromStr>(values: &FormValues, field: &str, message: &str) -> Result<T, RecoveryError> {
    values
        .get(field)
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| field_error(field, message))
}

// Ages are read as numbers like every other numeric field, so "34.0" and
// "3.4e1" are 34.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
fn whole_years(age: f64) -> Option<u8> {
    (age.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&age)).then(|| age as u8)
}

fn field_error(field: &str, message: &str) -> RecoveryError {
    let mut errors = FieldErrors::default();
    errors.insert(field, message);
    RecoveryError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vitalis_testkit::{ManualTimer, RecordingNavigator};

    fn controller() -> (Arc<RecordingNavigator>, ProfileSetupController) {
        let navigator = Arc::new(RecordingNavigator::new());
        let effects = StepEffects::new(navigator.clone(), Arc::new(ManualTimer::new()));
        (navigator, ProfileSetupController::mount(effects))
    }

    fn fill(step: &mut ProfileSetupController) {
        step.edit(fields::AGE, "34");
        step.edit(fields::WEIGHT, "61.5");
        step.edit(fields::HEIGHT, "168");
        step.edit(fields::GENDER, "Female");
    }

    #[test]
    fn test_valid_profile_goes_to_chat() {
        let (navigator, mut step) = controller();
        fill(&mut step);
        step.toggle_condition(HealthCondition::Lupus);
        step.toggle_condition(HealthCondition::Asthma);
        step.edit(fields::OTHER_CONDITIONS, "  migraines ");

        step.submit().unwrap();
        assert_eq!(navigator.last_route(), Some(Route::Chat));
        assert_eq!(
            step.draft(),
            Some(&ProfileDraft {
                age: 34,
                weight: 61.5,
                height: 168.0,
                gender: Gender::Female,
                health_conditions: vec![HealthCondition::Asthma, HealthCondition::Lupus],
                other_conditions: Some("migraines".into()),
            })
        );
    }

    #[test]
    fn test_numeric_rules_report_first_failure() {
        let (navigator, mut step) = controller();
        fill(&mut step);
        step.edit(fields::AGE, "12.5");
        step.edit(fields::WEIGHT, "-3");
        step.edit(fields::HEIGHT, "abc");

        let err = step.submit().unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get(fields::AGE), Some("Age must be an integer"));
        assert_eq!(errors.get(fields::WEIGHT), Some("Weight must be greater than 0"));
        assert_eq!(errors.get(fields::HEIGHT), Some("Height must be a number"));
        assert_eq!(errors.get(fields::GENDER), None);
        assert!(navigator.visits().is_empty());
    }

    #[test]
    fn test_whole_number_age_in_decimal_form() {
        for raw in ["34.0", "3.4e1"] {
            let (navigator, mut step) = controller();
            fill(&mut step);
            step.edit(fields::AGE, raw);

            step.submit().unwrap();
            assert_eq!(step.draft().map(|d| d.age), Some(34));
            assert_eq!(step.form().status(), SubmissionStatus::Succeeded);
            assert_eq!(navigator.last_route(), Some(Route::Chat));
        }
    }

    #[test]
    fn test_out_of_range_age() {
        let (_navigator, mut step) = controller();
        fill(&mut step);
        step.edit(fields::AGE, "121");
        let err = step.submit().unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|e| e.get(fields::AGE)),
            Some("Please enter a valid age")
        );
    }

    #[test]
    fn test_skip_leaves_without_validation() {
        let (navigator, mut step) = controller();
        step.skip().unwrap();
        assert_eq!(navigator.last_route(), Some(Route::Chat));
        assert!(step.draft().is_none());
    }

    #[test]
    fn test_toggle_condition() {
        let (_navigator, mut step) = controller();
        assert!(step.toggle_condition(HealthCondition::Diabetes));
        assert!(!step.toggle_condition(HealthCondition::Diabetes));
        assert!(step.selected_conditions().is_empty());
        assert_eq!(HealthCondition::all().len(), 6);
        assert_eq!(HealthCondition::HighBloodPressure.to_string(), "High Blood Pressure");
    }
}
