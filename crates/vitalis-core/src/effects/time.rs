//! Timer effect interface.
//!
//! One-shot timers drive overlay auto-dismissal and delayed navigation. Every
//! scheduled task can be cancelled through its handle, which is how a step
//! that unmounts early keeps stale callbacks from acting on it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Error type for timer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// No runtime is available to drive timers
    #[error("Timer service unavailable: {reason}")]
    ServiceUnavailable {
        /// What is missing
        reason: String,
    },
    /// The timer could not be scheduled or cancelled
    #[error("Operation failed: {reason}")]
    OperationFailed {
        /// Underlying failure
        reason: String,
    },
}

/// Handle for a scheduled timer.
pub type TimerHandle = Uuid;

/// Work run when a timer fires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Cancellable one-shot timers.
pub trait TimerEffects: Send + Sync {
    /// Run `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, TimeError>;

    /// Cancel a pending timer.
    ///
    /// Returns `true` if the timer was still pending. Cancelling a timer that
    /// already fired or was already cancelled is a no-op.
    fn cancel(&self, handle: TimerHandle) -> bool;
}
