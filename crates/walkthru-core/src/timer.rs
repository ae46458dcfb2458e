//! Deadline timers on the walkthrough's virtual clock.
//!
//! Time is a `Duration` measured from the moment an instance was mounted.
//! A timer is nothing more than an optional deadline owned by one machine;
//! cancelling it is clearing the deadline, so a cancelled timer can never
//! fire later.

use std::time::Duration;

/// A single-shot deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Duration>,
}

impl Timer {
    /// Arms the timer to fire `after` from `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: Duration, after: Duration) {
        self.deadline = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarms and returns true when the deadline has been reached.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Activation epoch carried by every event a sub-machine emits.
///
/// Each (re)activation or cancellation bumps the epoch, so consumers can
/// tell which run an event belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(pub u64);

impl Epoch {
    #[must_use]
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

/// Earliest of several optional deadlines.
pub fn earliest<I>(deadlines: I) -> Option<Duration>
where
    I: IntoIterator<Item = Option<Duration>>,
{
    deadlines.into_iter().flatten().min()
}
