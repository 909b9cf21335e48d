//! Vitalis Testing Infrastructure
//!
//! Deterministic handlers for the effect traits in `vitalis-core`, plus a few
//! shared fixtures.
//!
//! ```toml
//! [dev-dependencies]
//! vitalis-testkit = { workspace = true }
//! ```
//!
//! - [`ManualTimer`]: virtual clock; timers fire only on `advance`
//! - [`RecordingNavigator`]: records navigations and replays the last payload
//!   as the next screen's arrival payload
//! - [`ScriptedHttpClient`]: queued responses, call log, and a gate for
//!   holding requests in flight
//! - [`StaticTokenStore`]: fixed bearer token

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod http;
pub mod navigation;
pub mod storage;
pub mod time;

pub use http::{Call, Gate, ScriptedHttpClient};
pub use navigation::{RecordingNavigator, Visit};
pub use storage::StaticTokenStore;
pub use time::ManualTimer;
