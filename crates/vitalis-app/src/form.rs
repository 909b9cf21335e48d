//! Per-step form state.
//!
//! Owned by exactly one step controller and dropped with it.

use crate::validation::{FieldErrors, FormValues, Schema, ValidationMode};

/// Where a step is in its submit cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    /// Waiting for input
    #[default]
    Idle,
    /// Running the schema for a submit attempt
    Validating,
    /// Waiting on the credential gateway
    Submitting,
    /// Submission accepted
    Succeeded,
    /// Submission rejected after validation passed
    Failed,
}

impl SubmissionStatus {
    /// Whether the submit control should be disabled.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

/// Values, errors and status of one step's form.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    values: FormValues,
    errors: FieldErrors,
    status: SubmissionStatus,
}

impl FormState {
    /// Empty, idle form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit. In live mode the whole schema is re-run so cross-field
    /// rules see the new value.
    pub fn edit(
        &mut self,
        schema: &Schema,
        mode: ValidationMode,
        field: &str,
        value: impl Into<String>,
    ) {
        self.values.insert(field.to_string(), value.into());
        if mode == ValidationMode::Live {
            self.errors = schema.validate(&self.values);
        }
    }

    /// Validate for a submit attempt.
    ///
    /// On success returns a snapshot of the values and leaves the status at
    /// `Validating` for the caller to advance. On failure records the errors
    /// and returns to `Idle`.
    pub fn validate_for_submit(&mut self, schema: &Schema) -> Result<FormValues, FieldErrors> {
        self.status = SubmissionStatus::Validating;
        self.errors = schema.validate(&self.values);
        if self.errors.is_empty() {
            Ok(self.values.clone())
        } else {
            self.status = SubmissionStatus::Idle;
            Err(self.errors.clone())
        }
    }

    /// Record where the submission stands.
    pub fn set_status(&mut self, status: SubmissionStatus) {
        self.status = status;
    }

    /// Current submission status.
    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Raw input by field.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Current raw value of `field`, empty if never edited.
    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    /// Field errors from the last validation.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Inline error for `field`.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::schemas::{self, fields};

    #[test]
    fn test_live_mode_revalidates_every_field() {
        let schema = schemas::set_new_password();
        let mut form = FormState::new();

        form.edit(&schema, ValidationMode::Live, fields::PASSWORD, "abc123");
        form.edit(&schema, ValidationMode::Live, fields::CONFIRM_PASSWORD, "abc123");
        assert!(form.errors().is_empty());

        // Changing the password invalidates the untouched confirmation.
        form.edit(&schema, ValidationMode::Live, fields::PASSWORD, "abc1234");
        assert_eq!(
            form.error(fields::CONFIRM_PASSWORD),
            Some("Passwords must match")
        );
    }

    #[test]
    fn test_submit_mode_defers_validation() {
        let schema = schemas::verify_otp();
        let mut form = FormState::new();

        form.edit(&schema, ValidationMode::Submit, fields::OTP, "12");
        assert!(form.errors().is_empty());

        let errors = form.validate_for_submit(&schema).unwrap_err();
        assert_eq!(errors.get(fields::OTP), Some("Please enter all 4 digits"));
        assert_eq!(form.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn test_validate_for_submit_success() {
        let schema = schemas::verify_otp();
        let mut form = FormState::new();
        form.edit(&schema, ValidationMode::Live, fields::OTP, "1234");

        let values = form.validate_for_submit(&schema).unwrap();
        assert_eq!(values.get(fields::OTP).map(String::as_str), Some("1234"));
        assert_eq!(form.status(), SubmissionStatus::Validating);
        assert!(form.status().is_busy());
    }

    #[test]
    fn test_value_defaults_to_empty() {
        let form = FormState::new();
        assert_eq!(form.value(fields::EMAIL), "");
        assert_eq!(form.status(), SubmissionStatus::Idle);
    }
}
