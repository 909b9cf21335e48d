//! File-based configuration.
//!
//! ```toml
//! [client]
//! base_url = "http://98.81.203.81/ai-health"
//! request_timeout_ms = 15000
//! token_path = "/home/me/.config/vitalis/token"
//!
//! [timing]
//! otp_success_delay_ms = 1500
//! password_success_delay_ms = 2000
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend the credential update is sent to.
pub const DEFAULT_BASE_URL: &str = "http://98.81.203.81/ai-health";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Failed to access config file {path}: {message}")]
    Storage {
        /// Config file
        path: String,
        /// I/O error text
        message: String,
    },
    /// The file is not valid TOML for this schema
    #[error("Failed to parse config file {path}: {message}")]
    Parse {
        /// Config file
        path: String,
        /// Parser error text
        message: String,
    },
    /// Values parsed but failed validation
    #[error("Invalid configuration: {}", summarize(.0))]
    Invalid(Vec<ConfigValidationError>),
}

/// One rejected configuration value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValidationError {
    /// Dotted key, e.g. `client.base_url`
    pub field: String,
    /// What is wrong with the value
    pub error: String,
    /// A value that would pass
    pub suggested_value: Option<String>,
}

fn summarize(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Backend connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root URL
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_ms: u64,
    /// Where the bearer token is stored; `None` uses the platform default
    pub token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 15_000,
            token_path: None,
        }
    }
}

impl ClientConfig {
    /// Per-request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Delays before a step navigates away after success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// After a code is accepted
    pub otp_success_delay_ms: u64,
    /// After a password update is accepted
    pub password_success_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            otp_success_delay_ms: 1500,
            password_success_delay_ms: 2000,
        }
    }
}

impl TimingConfig {
    /// Delay after a code is accepted.
    pub fn otp_success_delay(&self) -> Duration {
        Duration::from_millis(self.otp_success_delay_ms)
    }

    /// Delay after a password update is accepted.
    pub fn password_success_delay(&self) -> Duration {
        Duration::from_millis(self.password_success_delay_ms)
    }
}

/// Complete client configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalisConfig {
    /// `[client]` section
    pub client: ClientConfig,
    /// `[timing]` section
    pub timing: TimingConfig,
}

impl VitalisConfig {
    /// `<config dir>/vitalis/config.toml`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vitalis").join("config.toml"))
    }

    /// Load and validate `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Storage {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Check every value; an empty result means the configuration is usable.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = vec![];

        let base_url = self.client.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(ConfigValidationError {
                field: "client.base_url".to_string(),
                error: "Base URL must start with http:// or https://".to_string(),
                suggested_value: Some(DEFAULT_BASE_URL.to_string()),
            });
        }

        // 1 second to 5 minutes
        if !(1_000..=300_000).contains(&self.client.request_timeout_ms) {
            errors.push(ConfigValidationError {
                field: "client.request_timeout_ms".to_string(),
                error: "Request timeout must be between 1000 and 300000 milliseconds".to_string(),
                suggested_value: Some("15000".to_string()),
            });
        }

        for (field, value, default) in [
            ("timing.otp_success_delay_ms", self.timing.otp_success_delay_ms, "1500"),
            (
                "timing.password_success_delay_ms",
                self.timing.password_success_delay_ms,
                "2000",
            ),
        ] {
            if value > 10_000 {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    error: "Delay must be at most 10000 milliseconds".to_string(),
                    suggested_value: Some(default.to_string()),
                });
            }
        }

        errors
    }
}
