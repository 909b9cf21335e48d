//! Categorized workflow errors
//!
//! Every failure the account workflows surface to the user, with enough
//! classification for a frontend to decide where to show it and what the user
//! can do next. None of these are fatal to the host.

use crate::validation::FieldErrors;
use std::fmt;

/// Banner text for a reset that reached the password step without a code.
pub const SESSION_EXPIRED_MESSAGE: &str =
    "Session expired. Please start the reset process again.";

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by user)
    Input,
    /// Required workflow context is missing
    Session,
    /// Remote service rejected or failed the request
    Network,
    /// Remote service answered in an unexpected shape
    Response,
}

impl ErrorCategory {
    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input)
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Session => "Session",
            Self::Network => "Network",
            Self::Response => "Response",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Check your input and try again",
            Self::Session => "Start the reset process again",
            Self::Network => "Check your network connection and retry",
            Self::Response => "Try again in a moment",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where an error is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Next to the offending field
    Inline,
    /// In a banner under the form
    Banner,
}

/// What the user has to do to try again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetryPath {
    /// Fix the form (if needed) and submit again
    Resubmit,
    /// Go back to the forgot-password screen
    RestartWorkflow,
}

// ============================================================================
// Recovery Error
// ============================================================================

/// Failures surfaced by the account workflow steps.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    /// One or more fields failed validation
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    /// The password step was reached as a reset without a one-time code
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    /// The credential update failed
    #[error("{message}")]
    Submission {
        /// Best-effort message from the server, or a generic fallback
        message: String,
    },

    /// The server's error payload was not in the expected shape
    #[error("{message}")]
    MalformedResponse {
        /// Generic message; the raw payload is never shown
        message: String,
    },
}

impl RecoveryError {
    /// Create a submission error
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission {
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Input,
            Self::SessionExpired => ErrorCategory::Session,
            Self::Submission { .. } => ErrorCategory::Network,
            Self::MalformedResponse { .. } => ErrorCategory::Response,
        }
    }

    /// Where the error is shown.
    #[must_use]
    pub fn surface(&self) -> Surface {
        match self {
            Self::Validation(_) => Surface::Inline,
            _ => Surface::Banner,
        }
    }

    /// How the user gets past this error.
    #[must_use]
    pub fn retry_path(&self) -> RetryPath {
        match self {
            Self::SessionExpired => RetryPath::RestartWorkflow,
            _ => RetryPath::Resubmit,
        }
    }

    /// Banner text, or `None` for inline validation errors.
    #[must_use]
    pub fn banner_message(&self) -> Option<String> {
        match self.surface() {
            Surface::Banner => Some(self.to_string()),
            Surface::Inline => None,
        }
    }

    /// Inline field errors, if this is a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for RecoveryError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_is_blocking_banner() {
        let err = RecoveryError::SessionExpired;
        assert_eq!(err.category(), ErrorCategory::Session);
        assert_eq!(err.surface(), Surface::Banner);
        assert_eq!(err.retry_path(), RetryPath::RestartWorkflow);
        assert_eq!(err.banner_message().as_deref(), Some(SESSION_EXPIRED_MESSAGE));
    }

    #[test]
    fn test_submission_error_resubmits() {
        let err = RecoveryError::submission("Email not found");
        assert_eq!(err.to_string(), "Email not found");
        assert_eq!(err.retry_path(), RetryPath::Resubmit);
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_malformed_response_shown_like_submission() {
        let err = RecoveryError::malformed("Validation error. Check your connection.");
        assert_eq!(err.surface(), Surface::Banner);
        assert_eq!(err.retry_path(), RetryPath::Resubmit);
        assert_eq!(err.category(), ErrorCategory::Response);
    }

    #[test]
    fn test_validation_error_is_inline() {
        let err = RecoveryError::from(FieldErrors::default());
        assert_eq!(err.surface(), Surface::Inline);
        assert!(err.banner_message().is_none());
        assert!(err.field_errors().is_some());
        assert!(err.category().is_user_correctable());
    }
}
