//! Virtual time for deterministic timer tests.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use uuid::Uuid;
use vitalis_core::{TimeError, TimerEffects, TimerHandle, TimerTask};

// (deadline, insertion order); equal deadlines fire in scheduling order
type Slot = (Duration, u64);

#[derive(Default)]
struct Clock {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<Slot, (TimerHandle, TimerTask)>,
    slots: HashMap<TimerHandle, Slot>,
}

/// Timer handler driven entirely by [`ManualTimer::advance`].
#[derive(Default)]
pub struct ManualTimer {
    clock: Mutex<Clock>,
}

impl ManualTimer {
    /// Clock at zero with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.clock.lock().now
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.clock.lock().queue.len()
    }

    /// Move the clock forward by `by`, firing every timer that comes due.
    ///
    /// Tasks run in deadline order without the clock locked, so a task may
    /// schedule or cancel timers; anything it schedules inside the window also
    /// fires. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.clock.lock().now + by;
        let mut fired = 0;
        loop {
            let task = {
                let mut clock = self.clock.lock();
                let due = clock
                    .queue
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= target);
                match due.and_then(|slot| clock.queue.remove(&slot).map(|entry| (slot, entry))) {
                    Some(((deadline, _), (handle, task))) => {
                        clock.slots.remove(&handle);
                        clock.now = deadline;
                        task
                    }
                    None => {
                        clock.now = target;
                        break;
                    }
                }
            };
            task();
            fired += 1;
        }
        fired
    }
}

impl TimerEffects for ManualTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Result<TimerHandle, TimeError> {
        let mut clock = self.clock.lock();
        let handle = Uuid::new_v4();
        let slot = (clock.now + delay, clock.next_seq);
        clock.next_seq += 1;
        clock.queue.insert(slot, (handle, task));
        clock.slots.insert(handle, slot);
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut clock = self.clock.lock();
        match clock.slots.remove(&handle) {
            Some(slot) => clock.queue.remove(&slot).is_some(),
            None => false,
        }
    }
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.clock.lock();
        f.debug_struct("ManualTimer")
            .field("now", &clock.now)
            .field("pending", &clock.queue.len())
            .finish()
    }
}
