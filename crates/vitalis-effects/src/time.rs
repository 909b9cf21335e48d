//! Timer handler backed by the Tokio runtime.
//!
//! Each timer is a spawned task that sleeps and then runs its callback.
//! Cancelling aborts the task; a timer that already fired is gone from the
//! registry, so cancelling it reports `false`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use uuid::Uuid;
use vitalis_core::{TimeError, TimerEffects, TimerHandle, TimerTask};

type Registry = Arc<Mutex<HashMap<TimerHandle, JoinHandle<()>>>>;

/// Production timer handler.
///
/// Must be used from within a Tokio runtime; scheduling outside one fails with
/// [`TimeError::ServiceUnavailable`].
#[derive(Debug, Default)]
pub struct TokioTimerHandler {
    timers: Registry,
}

impl TokioTimerHandler {
    /// Handler with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.timers.lock().len()
    }
}

impl TimerEffects for TokioTimerHandler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, TimeError> {
        let runtime = Handle::try_current().map_err(|e| TimeError::ServiceUnavailable {
            reason: e.to_string(),
        })?;

        let handle = Uuid::new_v4();
        let registry = Arc::clone(&self.timers);

        // Hold the registry while spawning so a zero delay cannot fire before
        // the handle is recorded.
        let mut timers = self.timers.lock();
        let join = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_pending = registry.lock().remove(&handle).is_some();
            if still_pending {
                task();
            }
        });
        timers.insert(handle, join);
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match self.timers.lock().remove(&handle) {
            Some(join) => {
                join.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioTimerHandler {
    fn drop(&mut self) {
        for (_, join) in self.timers.lock().drain() {
            join.abort();
        }
    }
}
