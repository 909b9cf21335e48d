//! # Transient Feedback Overlay
//!
//! Success/failure overlay with optional auto-dismissal. Timers are tied to
//! the overlay's lifetime: dropping the overlay (the step unmounting) cancels
//! any pending dismissal, and a dismissal that races the drop finds nothing to
//! act on.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use vitalis_core::{TimeError, TimerEffects, TimerHandle, TimerTask};

// ============================================================================
// Pending Timer
// ============================================================================

/// A scheduled timer that is cancelled when dropped.
pub struct PendingTimer {
    handle: TimerHandle,
    timer: Arc<dyn TimerEffects>,
}

impl PendingTimer {
    /// Schedule `task` to run after `delay`.
    pub fn schedule(
        timer: &Arc<dyn TimerEffects>,
        delay: Duration,
        task: TimerTask,
    ) -> Result<Self, TimeError> {
        let handle = timer.schedule(delay, task)?;
        Ok(Self {
            handle,
            timer: Arc::clone(timer),
        })
    }

    /// Handle of the scheduled timer.
    #[must_use]
    pub fn handle(&self) -> TimerHandle {
        self.handle
    }
}

impl Drop for PendingTimer {
    fn drop(&mut self) {
        self.timer.cancel(self.handle);
    }
}

impl std::fmt::Debug for PendingTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTimer")
            .field("handle", &self.handle)
            .finish()
    }
}

// ============================================================================
// Overlay
// ============================================================================

/// Tone of the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Confirmation
    Success,
    /// Failure
    Error,
}

/// What the overlay currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OverlayState {
    /// Nothing shown
    #[default]
    Hidden,
    /// A message is on screen
    Visible {
        /// Tone
        kind: OverlayKind,
        /// Text shown
        message: String,
        /// `None` means the overlay stays until the step navigates away
        auto_dismiss_after: Option<Duration>,
    },
}

#[derive(Debug, Default)]
struct Slot {
    state: OverlayState,
    generation: u64,
}

/// Overlay owned by a single step.
pub struct FeedbackOverlay {
    slot: Arc<Mutex<Slot>>,
    timer: Arc<dyn TimerEffects>,
    dismissal: Option<PendingTimer>,
}

impl FeedbackOverlay {
    /// Hidden overlay using `timer` for auto-dismissal.
    pub fn new(timer: Arc<dyn TimerEffects>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timer,
            dismissal: None,
        }
    }

    /// Show the overlay, replacing whatever was shown before.
    ///
    /// With `auto_dismiss_after` set, the overlay hides itself once the delay
    /// elapses. If the timer cannot be scheduled the overlay stays up until the
    /// next `hide` or navigation.
    pub fn show(
        &mut self,
        kind: OverlayKind,
        message: impl Into<String>,
        auto_dismiss_after: Option<Duration>,
    ) {
        self.dismissal = None;
        let generation = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.state = OverlayState::Visible {
                kind,
                message: message.into(),
                auto_dismiss_after,
            };
            slot.generation
        };

        if let Some(delay) = auto_dismiss_after {
            let weak = Arc::downgrade(&self.slot);
            match PendingTimer::schedule(&self.timer, delay, dismiss_task(weak, generation)) {
                Ok(pending) => self.dismissal = Some(pending),
                Err(e) => tracing::warn!(error = %e, "overlay auto-dismiss unavailable"),
            }
        }
    }

    /// Hide immediately and cancel any pending dismissal.
    pub fn hide(&mut self) {
        self.dismissal = None;
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.state = OverlayState::Hidden;
    }

    /// What the overlay shows right now.
    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.slot.lock().state.clone()
    }

    /// Whether anything is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(self.slot.lock().state, OverlayState::Hidden)
    }

    /// Whether an auto-dismissal is scheduled.
    #[must_use]
    pub fn has_pending_dismissal(&self) -> bool {
        self.dismissal.is_some() && self.is_visible()
    }
}

impl std::fmt::Debug for FeedbackOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackOverlay")
            .field("state", &self.state())
            .field("dismissal", &self.dismissal)
            .finish()
    }
}

// Only hides the overlay if nothing newer was shown in the meantime and the
// overlay still exists.
fn dismiss_task(slot: Weak<Mutex<Slot>>, generation: u64) -> TimerTask {
    Box::new(move || {
        let Some(slot) = slot.upgrade() else {
            return;
        };
        let mut slot = slot.lock();
        if slot.generation == generation {
            slot.state = OverlayState::Hidden;
        }
    })
}
