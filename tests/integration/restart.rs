//! Integration test: restart and stale timers.

use tamperline_integration_tests::{Harness, ms};
use tamperline_scenario::{ScenarioPhase, Script};

#[test]
fn test_restart_mid_recording_drops_pending_wake() {
    let mut h = Harness::breach();
    h.run_to(7_200);
    assert_eq!(h.orchestrator.ledger().len(), 3);
    let stale = h.orchestrator.next_wake().unwrap();

    h.orchestrator.restart().unwrap();
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::Idle);
    assert_eq!(h.orchestrator.ledger().len(), 0);

    assert!(!h.orchestrator.on_wake(stale).unwrap());
    assert_eq!(h.run_to(100_000), 0);
    assert_eq!(h.orchestrator.ledger().len(), 0);
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::Idle);
}

#[test]
fn test_restart_during_rejection_hold() {
    let mut h = Harness::breach();
    h.run_until(ScenarioPhase::AwaitingTamper).unwrap();
    h.orchestrator.submit_tamper(2, "1").unwrap();
    let stale = h.orchestrator.next_wake().unwrap();

    h.orchestrator.restart().unwrap();
    assert!(h.orchestrator.last_tamper().is_none());
    assert!(!h.orchestrator.on_wake(stale).unwrap());
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::Idle);
}

#[test]
fn test_runs_are_reproducible() {
    let mut first = Harness::soc();
    first.run_out();

    let mut second = Harness::soc();
    second.run_to(3_000);
    second.orchestrator.restart().unwrap();
    second.orchestrator.advance().unwrap();
    let end = second.run_out();

    assert_eq!(end, ms(3_000 + 24_000));
    assert_eq!(
        first.orchestrator.ledger().root(),
        second.orchestrator.ledger().root()
    );
    assert_eq!(first.orchestrator.snapshot(), second.orchestrator.snapshot());
}

#[test]
fn test_restart_from_terminal() {
    let mut h = Harness::new(Script::breach());
    for _ in 0..3 {
        h.orchestrator.advance().unwrap();
        h.run_until(ScenarioPhase::AwaitingTamper).unwrap();
        h.orchestrator.submit_tamper(4, "0").unwrap();
        h.run_until(ScenarioPhase::Analyzing).unwrap();
        h.orchestrator.advance().unwrap();
        assert_eq!(h.orchestrator.phase(), ScenarioPhase::Reporting);

        h.orchestrator.restart().unwrap();
        assert_eq!(h.orchestrator.phase(), ScenarioPhase::Idle);
        assert!(h.orchestrator.ledger().is_empty());
    }
}
