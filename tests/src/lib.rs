//! Shared test harness for tamperline integration tests.
//!
//! Provides [`Harness`]: an [`Orchestrator`] on a [`ManualClock`] with
//! helpers to move time forward wake by wake and stop at a phase.

use std::sync::Arc;
use std::time::Duration;

use tamperline_scenario::{ManualClock, Orchestrator, ScenarioPhase, Script};

/// Milliseconds as a [`Duration`].
pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// An orchestrator driven by a manual clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    /// Start `script` at time zero.
    pub fn new(script: Script) -> Self {
        let clock = Arc::new(ManualClock::new());
        let orchestrator = Orchestrator::new(script, clock.clone()).unwrap();
        Self {
            clock,
            orchestrator,
        }
    }

    /// The guided breach walkthrough, already started.
    pub fn breach() -> Self {
        let mut h = Self::new(Script::breach());
        assert!(h.orchestrator.advance().unwrap());
        h
    }

    /// The SOC run, already started.
    pub fn soc() -> Self {
        let mut h = Self::new(Script::soc());
        assert!(h.orchestrator.advance().unwrap());
        h
    }

    /// Current clock time.
    pub fn now(&self) -> Duration {
        use tamperline_scenario::Clock;
        self.clock.now()
    }

    /// Move the clock to `at_ms` and fire everything due. Returns the
    /// number of wakes fired.
    pub fn run_to(&mut self, at_ms: u64) -> usize {
        self.clock.set(ms(at_ms));
        self.orchestrator.tick().unwrap()
    }

    /// Fire wakes one at a time until `phase` is reached. Returns the clock
    /// time at which it was entered, or `None` if playback stopped first.
    pub fn run_until(&mut self, phase: ScenarioPhase) -> Option<Duration> {
        loop {
            if self.orchestrator.phase() == phase {
                return Some(self.now());
            }
            let wake = self.orchestrator.next_wake()?;
            self.clock.set(wake.deadline);
            self.orchestrator.tick().unwrap();
        }
    }

    /// Fire wakes until none are pending. Returns the final clock time.
    pub fn run_out(&mut self) -> Duration {
        while let Some(wake) = self.orchestrator.next_wake() {
            self.clock.set(wake.deadline);
            self.orchestrator.tick().unwrap();
        }
        self.now()
    }
}
