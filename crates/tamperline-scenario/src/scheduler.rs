//! Single-slot cancellable scheduler.
//!
//! The orchestrator has at most one pending step at a time. Each scheduled
//! step is a [`Wake`] stamped with the scheduler's generation; cancelling
//! bumps the generation, so a wake a host is still holding from before a
//! restart no longer matches and is ignored.

use std::time::Duration;

use serde::Serialize;

/// A pending scheduled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wake {
    /// Clock time at which the step is due.
    pub deadline: Duration,
    /// Scheduler generation the wake belongs to.
    pub generation: u64,
}

/// Holds the one pending [`Wake`].
#[derive(Debug, Default)]
pub struct Scheduler {
    generation: u64,
    pending: Option<Wake>,
}

impl Scheduler {
    /// Create an empty scheduler at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the next step, replacing any pending one.
    pub fn schedule(&mut self, deadline: Duration) -> Wake {
        let wake = Wake {
            deadline,
            generation: self.generation,
        };
        self.pending = Some(wake);
        wake
    }

    /// Drop the pending wake and invalidate every wake handed out so far.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// The pending wake, if any.
    pub fn pending(&self) -> Option<Wake> {
        self.pending
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `wake` is exactly the pending wake.
    pub fn is_current(&self, wake: &Wake) -> bool {
        self.pending.as_ref() == Some(wake)
    }

    /// Take the pending wake if it matches `wake`.
    pub fn claim(&mut self, wake: &Wake) -> Option<Wake> {
        if self.is_current(wake) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Take the pending wake if it is due at `now`.
    pub fn take_due(&mut self, now: Duration) -> Option<Wake> {
        match self.pending {
            Some(wake) if wake.deadline <= now => self.pending.take(),
            _ => None,
        }
    }
}
