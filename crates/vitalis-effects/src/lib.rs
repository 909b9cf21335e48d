//! Vitalis Effects - Production Handlers
//!
//! Implementations of the `vitalis-core` effect traits for a real host:
//!
//! - [`TokioTimerHandler`]: timers on the ambient Tokio runtime
//! - [`ReqwestHttpClient`]: JSON POSTs with bearer authentication
//! - [`EnvTokenStore`], [`FileTokenStore`]: where the session token comes from
//! - [`VitalisConfig`]: TOML configuration for the above
//!
//! **Layer Constraint**: no test doubles here; those live in `vitalis-testkit`.

#![forbid(unsafe_code)]

pub mod configuration;
pub mod http;
pub mod storage;
pub mod time;

pub use configuration::{
    ClientConfig, ConfigError, ConfigValidationError, TimingConfig, VitalisConfig,
};
pub use http::ReqwestHttpClient;
pub use storage::{EnvTokenStore, FallbackTokenStore, FileTokenStore};
pub use time::TokioTimerHandler;
