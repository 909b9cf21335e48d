//! Schemas for each workflow step.

use super::{FieldRules, Schema};
use once_cell::sync::Lazy;
use regex::Regex;

/// Field names shared by schemas, controllers and hosts.
pub mod fields {
    /// Account email
    pub const EMAIL: &str = "email";
    /// One-time code
    pub const OTP: &str = "otp";
    /// New password
    pub const PASSWORD: &str = "password";
    /// Password confirmation
    pub const CONFIRM_PASSWORD: &str = "confirmPassword";
    /// Age in years
    pub const AGE: &str = "age";
    /// Weight in kilograms
    pub const WEIGHT: &str = "weight";
    /// Height in centimetres
    pub const HEIGHT: &str = "height";
    /// Gender
    pub const GENDER: &str = "gender";
    /// Free-text health conditions
    pub const OTHER_CONDITIONS: &str = "otherConditions";
}

/// Number of digits in a one-time code.
pub const OTP_LENGTH: usize = 4;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Gender options offered by profile setup.
pub const GENDER_OPTIONS: [&str; 2] = ["Male", "Female"];

#[allow(clippy::expect_used)]
static DIGITS_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[0-9]+$").expect("digits pattern is valid"));

#[allow(clippy::expect_used)]
static HAS_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new("[a-zA-Z]").expect("letter pattern is valid"));

#[allow(clippy::expect_used)]
static HAS_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").expect("digit pattern is valid"));

/// Email entry on the forgot-password screen.
#[must_use]
pub fn request_reset() -> Schema {
    Schema::new().field(
        FieldRules::new(fields::EMAIL)
            .required("Email is required")
            .email("Enter a valid email address"),
    )
}

/// Four-digit one-time code.
#[must_use]
pub fn verify_otp() -> Schema {
    Schema::new().field(
        FieldRules::new(fields::OTP)
            .required("OTP is required")
            .exact_length(OTP_LENGTH, "Please enter all 4 digits")
            .pattern(DIGITS_ONLY.clone(), "Only numbers are allowed"),
    )
}

/// New password plus confirmation.
#[must_use]
pub fn set_new_password() -> Schema {
    Schema::new()
        .field(
            FieldRules::new(fields::PASSWORD)
                .required("Password is required")
                .min_length(MIN_PASSWORD_LENGTH, "Min 6 characters")
                .pattern(HAS_LETTER.clone(), "Must contain letters and numbers")
                .pattern(HAS_DIGIT.clone(), "Must contain letters and numbers"),
        )
        .field(
            FieldRules::new(fields::CONFIRM_PASSWORD)
                .required("Please confirm your password")
                .equals_field(fields::PASSWORD, "Passwords must match"),
        )
}

/// Health profile collected after sign-up.
///
/// The condition checklist and free-text conditions are optional and carry no
/// rules.
#[must_use]
pub fn profile_setup() -> Schema {
    Schema::new()
        .field(
            FieldRules::new(fields::AGE)
                .required("Age is required")
                .number("Age must be a number")
                .integer("Age must be an integer")
                .positive("Age cannot be negative")
                .min(1.0, "Age must be at least 1")
                .max(120.0, "Please enter a valid age"),
        )
        .field(
            FieldRules::new(fields::WEIGHT)
                .required("Weight is required")
                .number("Weight must be a number")
                .positive("Weight must be greater than 0")
                .min(1.0, "Weight is too low"),
        )
        .field(
            FieldRules::new(fields::HEIGHT)
                .required("Height is required")
                .number("Height must be a number")
                .positive("Height must be greater than 0")
                .min(30.0, "Height is too low"),
        )
        .field(
            FieldRules::new(fields::GENDER)
                .required("Please select gender")
                .one_of(GENDER_OPTIONS, "Please select gender"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FormValues;

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_request_reset_messages() {
        let schema = request_reset();
        assert_eq!(
            schema.validate(&values(&[])).get(fields::EMAIL),
            Some("Email is required")
        );
        assert_eq!(
            schema.validate(&values(&[(fields::EMAIL, "nope")])).get(fields::EMAIL),
            Some("Enter a valid email address")
        );
        assert!(schema
            .validate(&values(&[(fields::EMAIL, "ana@example.com")]))
            .is_empty());
    }

    #[test]
    fn test_verify_otp_messages() {
        let schema = verify_otp();
        let check = |otp: &str| {
            schema
                .validate(&values(&[(fields::OTP, otp)]))
                .get(fields::OTP)
                .map(str::to_string)
        };
        assert_eq!(check("").as_deref(), Some("OTP is required"));
        assert_eq!(check("123").as_deref(), Some("Please enter all 4 digits"));
        assert_eq!(check("12345").as_deref(), Some("Please enter all 4 digits"));
        assert_eq!(check("12a4").as_deref(), Some("Only numbers are allowed"));
        assert_eq!(check("0042"), None);
    }

    #[test]
    fn test_set_new_password_messages() {
        let schema = set_new_password();
        let errors = schema.validate(&values(&[
            (fields::PASSWORD, "abc"),
            (fields::CONFIRM_PASSWORD, ""),
        ]));
        assert_eq!(errors.get(fields::PASSWORD), Some("Min 6 characters"));
        assert_eq!(
            errors.get(fields::CONFIRM_PASSWORD),
            Some("Please confirm your password")
        );

        let errors = schema.validate(&values(&[
            (fields::PASSWORD, "abcdefg"),
            (fields::CONFIRM_PASSWORD, "abcdefg"),
        ]));
        assert_eq!(
            errors.get(fields::PASSWORD),
            Some("Must contain letters and numbers")
        );
        assert!(!errors.contains(fields::CONFIRM_PASSWORD));

        let errors = schema.validate(&values(&[
            (fields::PASSWORD, "abc123"),
            (fields::CONFIRM_PASSWORD, "abc12"),
        ]));
        assert_eq!(
            errors.get(fields::CONFIRM_PASSWORD),
            Some("Passwords must match")
        );
    }

    #[test]
    fn test_profile_setup_messages() {
        let schema = profile_setup();
        let errors = schema.validate(&values(&[
            (fields::AGE, "abc"),
            (fields::WEIGHT, "0"),
            (fields::HEIGHT, "20"),
        ]));
        assert_eq!(errors.get(fields::AGE), Some("Age must be a number"));
        assert_eq!(errors.get(fields::WEIGHT), Some("Weight must be greater than 0"));
        assert_eq!(errors.get(fields::HEIGHT), Some("Height is too low"));
        assert_eq!(errors.get(fields::GENDER), Some("Please select gender"));

        let errors = schema.validate(&values(&[(fields::AGE, "-4")]));
        assert_eq!(errors.get(fields::AGE), Some("Age cannot be negative"));

        let errors = schema.validate(&values(&[(fields::AGE, "30.5")]));
        assert_eq!(errors.get(fields::AGE), Some("Age must be an integer"));

        let errors = schema.validate(&values(&[(fields::AGE, "121")]));
        assert_eq!(errors.get(fields::AGE), Some("Please enter a valid age"));

        let errors = schema.validate(&values(&[
            (fields::AGE, "34"),
            (fields::WEIGHT, "70.5"),
            (fields::HEIGHT, "172"),
            (fields::GENDER, "Female"),
        ]));
        assert!(errors.is_empty());
    }
}
