//! Tests for scenario playback.


use std::sync::Arc;
use std::time::Duration;

use crate::clock::ManualClock;
use crate::orchestrator::Orchestrator;
use crate::script::Script;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Orchestrator on a manual clock at zero.
fn start(script: Script) -> (Arc<ManualClock>, Orchestrator) {
    let clock = Arc::new(ManualClock::new());
    let orchestrator = Orchestrator::new(script, clock.clone()).unwrap();
    (clock, orchestrator)
}

/// Move the clock to `at_ms` and fire everything due.
fn run_to(clock: &ManualClock, orchestrator: &mut Orchestrator, at_ms: u64) -> usize {
    clock.set(ms(at_ms));
    orchestrator.tick().unwrap()
}
