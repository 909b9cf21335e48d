//! # Field Validation Engine
//!
//! Declarative per-step schemas. A [`Schema`] is an ordered list of
//! [`FieldRules`]; validating a value set yields [`FieldErrors`], one message per
//! failing field. A field absent from the result is valid.
//!
//! Rules for a field always run in phase order (required, type, range,
//! pattern, cross-field) regardless of the order they were declared in; rules
//! within one phase keep their declaration order. The first failing rule wins
//! and the remaining rules for that field are skipped. Fields are independent
//! of each other except through explicit cross-field rules.
//!
//! Validation is synchronous and pure.

pub mod schemas;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Raw input values keyed by field name.
pub type FormValues = BTreeMap<String, String>;

// ============================================================================
// Rules
// ============================================================================

/// Evaluation phase of a rule. Lower phases run first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RulePhase {
    /// Presence check
    Required,
    /// Type checks (numeric, integer)
    Type,
    /// Numeric and length bounds
    Range,
    /// Pattern and membership checks
    Pattern,
    /// Checks against other fields
    CrossField,
}

/// A single predicate a field value must satisfy.
#[derive(Clone, Debug)]
pub enum Check {
    /// Value must be non-empty
    Required,
    /// Value must parse as a finite number
    Number,
    /// Value must be a whole number
    Integer,
    /// Number must be strictly greater than zero
    Positive,
    /// Number must be at least this (inclusive)
    Min(f64),
    /// Number must be at most this (inclusive)
    Max(f64),
    /// At least this many characters
    MinLength(usize),
    /// At most this many characters
    MaxLength(usize),
    /// Exactly this many characters
    ExactLength(usize),
    /// Value must contain a match of this expression
    Pattern(Regex),
    /// Value must be a well-formed email address
    Email,
    /// Value must equal one of these options
    OneOf(Vec<String>),
    /// Value must equal the value of another field
    EqualsField(String),
}

impl Check {
    /// Phase this check runs in.
    #[must_use]
    pub fn phase(&self) -> RulePhase {
        match self {
            Self::Required => RulePhase::Required,
            Self::Number | Self::Integer => RulePhase::Type,
            Self::Positive
            | Self::Min(_)
            | Self::Max(_)
            | Self::MinLength(_)
            | Self::MaxLength(_)
            | Self::ExactLength(_) => RulePhase::Range,
            Self::Pattern(_) | Self::Email | Self::OneOf(_) => RulePhase::Pattern,
            Self::EqualsField(_) => RulePhase::CrossField,
        }
    }

    fn passes(&self, value: &str, values: &FormValues) -> bool {
        match self {
            Self::Required => !value.is_empty(),
            Self::Number => parse_number(value).is_some(),
            Self::Integer => parse_number(value).is_some_and(|n| n.fract() == 0.0),
            Self::Positive => parse_number(value).is_some_and(|n| n > 0.0),
            Self::Min(bound) => parse_number(value).is_some_and(|n| n >= *bound),
            Self::Max(bound) => parse_number(value).is_some_and(|n| n <= *bound),
            Self::MinLength(len) => value.chars().count() >= *len,
            Self::MaxLength(len) => value.chars().count() <= *len,
            Self::ExactLength(len) => value.chars().count() == *len,
            Self::Pattern(regex) => regex.is_match(value),
            Self::Email => is_email(value),
            Self::OneOf(options) => options.iter().any(|option| option == value),
            Self::EqualsField(other) => {
                values.get(other).map(String::as_str).unwrap_or_default() == value
            }
        }
    }
}

/// A check paired with the message shown when it fails.
#[derive(Clone, Debug)]
pub struct Rule {
    check: Check,
    message: String,
}

impl Rule {
    /// Create a rule.
    pub fn new(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }

    /// The underlying check.
    #[must_use]
    pub fn check(&self) -> &Check {
        &self.check
    }

    /// Message reported when the check fails.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// Field Rules
// ============================================================================

/// Ordered rules for one field.
#[derive(Clone, Debug)]
pub struct FieldRules {
    name: String,
    rules: Vec<Rule>,
}

impl FieldRules {
    /// Start an empty rule set for `name`. Without a `required` rule an empty
    /// value is always valid.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule, keeping the list sorted by phase.
    #[must_use]
    pub fn rule(mut self, check: Check, message: impl Into<String>) -> Self {
        let phase = check.phase();
        let at = self
            .rules
            .iter()
            .position(|existing| existing.check.phase() > phase)
            .unwrap_or(self.rules.len());
        self.rules.insert(at, Rule::new(check, message));
        self
    }

    /// Reject an empty value.
    #[must_use]
    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Check::Required, message)
    }

    /// Reject input that is not a number.
    #[must_use]
    pub fn number(self, message: impl Into<String>) -> Self {
        self.rule(Check::Number, message)
    }

    /// Reject numbers with a fractional part.
    #[must_use]
    pub fn integer(self, message: impl Into<String>) -> Self {
        self.rule(Check::Integer, message)
    }

    /// Reject zero and negative numbers.
    #[must_use]
    pub fn positive(self, message: impl Into<String>) -> Self {
        self.rule(Check::Positive, message)
    }

    /// Reject numbers below `bound`.
    #[must_use]
    pub fn min(self, bound: f64, message: impl Into<String>) -> Self {
        self.rule(Check::Min(bound), message)
    }

    /// Reject numbers above `bound`.
    #[must_use]
    pub fn max(self, bound: f64, message: impl Into<String>) -> Self {
        self.rule(Check::Max(bound), message)
    }

    /// Reject values shorter than `len` characters.
    #[must_use]
    pub fn min_length(self, len: usize, message: impl Into<String>) -> Self {
        self.rule(Check::MinLength(len), message)
    }

    /// Reject values longer than `len` characters.
    #[must_use]
    pub fn max_length(self, len: usize, message: impl Into<String>) -> Self {
        self.rule(Check::MaxLength(len), message)
    }

    /// Reject values that are not exactly `len` characters.
    #[must_use]
    pub fn exact_length(self, len: usize, message: impl Into<String>) -> Self {
        self.rule(Check::ExactLength(len), message)
    }

    /// Reject values `regex` does not match.
    #[must_use]
    pub fn pattern(self, regex: Regex, message: impl Into<String>) -> Self {
        self.rule(Check::Pattern(regex), message)
    }

    /// Reject values that are not an email address.
    #[must_use]
    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(Check::Email, message)
    }

    /// Reject values outside `options`.
    #[must_use]
    pub fn one_of<I, S>(self, options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();
        self.rule(Check::OneOf(options), message)
    }

    /// Reject values that differ from field `other`.
    #[must_use]
    pub fn equals_field(self, other: impl Into<String>, message: impl Into<String>) -> Self {
        self.rule(Check::EqualsField(other.into()), message)
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether an empty value is rejected.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule.check, Check::Required))
    }

    /// Message of the first failing rule, or `None` if the value is valid.
    #[must_use]
    pub fn first_failure(&self, values: &FormValues) -> Option<&str> {
        let value = values.get(&self.name).map(String::as_str).unwrap_or_default();
        if value.is_empty() && !self.is_required() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| !rule.check.passes(value, values))
            .map(Rule::message)
    }
}

// ============================================================================
// Schema
// ============================================================================

/// When a step runs its schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Re-validate the whole form on every edit
    #[default]
    Live,
    /// Validate only when the user submits
    Submit,
}

/// Ordered set of field rules for one step.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    /// Empty schema; accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields.push(rules);
        self
    }

    /// Field rule sets in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldRules] {
        &self.fields
    }

    /// Validate every field against `values`.
    #[must_use]
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for field in &self.fields {
            if let Some(message) = field.first_failure(values) {
                errors.insert(field.name(), message);
            }
        }
        errors
    }
}

// ============================================================================
// Field Errors
// ============================================================================

/// Field name to error message. Absence of a field means it is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub(crate) fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields and their messages, ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

// Local part may not start with a dot or end with a dot or underscore; the
// first domain label may not start or end with a hyphen. Consecutive dots are
// rejected separately since the regex crate has no lookaround.
#[allow(clippy::expect_used)]
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9._%+-]*[a-zA-Z0-9%+-]@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z]{2,})+$",
    )
    .expect("email pattern is valid")
});

fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_SHAPE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_rules_sorted_by_phase() {
        let field = FieldRules::new("age")
            .max(120.0, "too old")
            .number("not a number")
            .required("required")
            .min(1.0, "too young");

        let phases: Vec<_> = field.rules().iter().map(|r| r.check().phase()).collect();
        assert_eq!(
            phases,
            vec![
                RulePhase::Required,
                RulePhase::Type,
                RulePhase::Range,
                RulePhase::Range
            ]
        );
        // Same-phase rules keep declaration order.
        assert_eq!(field.rules()[2].message(), "too old");
        assert_eq!(field.rules()[3].message(), "too young");
    }

    #[test]
    fn test_first_failure_wins() {
        let schema = Schema::new().field(
            FieldRules::new("code")
                .required("required")
                .exact_length(4, "length")
                .pattern(Regex::new("^[0-9]+$").unwrap(), "digits"),
        );

        assert_eq!(schema.validate(&values(&[])).get("code"), Some("required"));
        assert_eq!(schema.validate(&values(&[("code", "12a")])).get("code"), Some("length"));
        assert_eq!(schema.validate(&values(&[("code", "12a4")])).get("code"), Some("digits"));
        assert!(schema.validate(&values(&[("code", "1234")])).is_empty());
    }

    #[test]
    fn test_fields_independent() {
        let schema = Schema::new()
            .field(FieldRules::new("a").required("a required"))
            .field(FieldRules::new("b").required("b required"));

        let errors = schema.validate(&values(&[("a", "x")]));
        assert_eq!(errors.len(), 1);
        assert!(!errors.contains("a"));
        assert_eq!(errors.get("b"), Some("b required"));
    }

    #[test]
    fn test_empty_optional_field_is_valid() {
        let schema =
            Schema::new().field(FieldRules::new("notes").min_length(3, "too short"));
        assert!(schema.validate(&values(&[("notes", "")])).is_empty());
        assert!(schema.validate(&values(&[])).is_empty());
        assert_eq!(
            schema.validate(&values(&[("notes", "ab")])).get("notes"),
            Some("too short")
        );
    }

    #[test]
    fn test_type_error_precedes_range() {
        let schema = Schema::new().field(
            FieldRules::new("height")
                .required("required")
                .number("must be a number")
                .min(30.0, "too low"),
        );
        assert_eq!(
            schema.validate(&values(&[("height", "tall")])).get("height"),
            Some("must be a number")
        );
        assert_eq!(
            schema.validate(&values(&[("height", "12")])).get("height"),
            Some("too low")
        );
        assert!(schema.validate(&values(&[("height", "30")])).is_empty());
    }

    #[test]
    fn test_numeric_bounds_inclusive() {
        let field = FieldRules::new("n").min(1.0, "low").max(120.0, "high");
        assert_eq!(field.first_failure(&values(&[("n", "1")])), None);
        assert_eq!(field.first_failure(&values(&[("n", "120")])), None);
        assert_eq!(field.first_failure(&values(&[("n", "0.5")])), Some("low"));
        assert_eq!(field.first_failure(&values(&[("n", "120.5")])), Some("high"));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let field = FieldRules::new("n").number("nan");
        assert_eq!(field.first_failure(&values(&[("n", "inf")])), Some("nan"));
        assert_eq!(field.first_failure(&values(&[("n", "NaN")])), Some("nan"));
        assert_eq!(field.first_failure(&values(&[("n", " 42 ")])), None);
    }

    #[test]
    fn test_integer_rule() {
        let field = FieldRules::new("n").number("nan").integer("whole");
        assert_eq!(field.first_failure(&values(&[("n", "4.5")])), Some("whole"));
        assert_eq!(field.first_failure(&values(&[("n", "45")])), None);
    }

    #[test]
    fn test_equals_field() {
        let schema = Schema::new()
            .field(FieldRules::new("password").required("required"))
            .field(
                FieldRules::new("confirm")
                    .required("confirm required")
                    .equals_field("password", "mismatch"),
            );

        let errors = schema.validate(&values(&[("password", "abc123"), ("confirm", "abc124")]));
        assert_eq!(errors.get("confirm"), Some("mismatch"));

        let errors = schema.validate(&values(&[("password", "abc123"), ("confirm", "abc123")]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_one_of() {
        let field = FieldRules::new("gender")
            .required("pick one")
            .one_of(["Male", "Female"], "pick one");
        assert_eq!(field.first_failure(&values(&[("gender", "Other")])), Some("pick one"));
        assert_eq!(field.first_failure(&values(&[("gender", "Female")])), None);
    }

    #[test]
    fn test_email_shape() {
        for ok in ["user@example.com", "first.last+tag@mail.example.org", "a_b%c@x-y.io"] {
            assert!(is_email(ok), "{ok} should be accepted");
        }
        for bad in [
            "",
            "plain",
            ".user@example.com",
            "user.@example.com",
            "us..er@example.com",
            "user_@example.com",
            "user@-example.com",
            "user@example-.com",
            "user@example",
            "user@example.c",
            "user@example.c0m",
        ] {
            assert!(!is_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_field_errors_display() {
        let schema = Schema::new()
            .field(FieldRules::new("b").required("b missing"))
            .field(FieldRules::new("a").required("a missing"));
        let errors = schema.validate(&values(&[]));
        assert_eq!(errors.to_string(), "a: a missing; b: b missing");
    }
}
