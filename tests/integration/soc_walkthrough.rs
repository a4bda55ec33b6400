//! Integration test: SOC run.
//!
//! Token auths and an integrity check, stolen-token detection, a pivot that
//! tries to rewrite the integrity record, a receipted rejection, triage and
//! containment.

use std::time::Duration;

use tamperline_integration_tests::{Harness, ms};
use tamperline_scenario::{SOC_TAMPER_INDEX, ScenarioPhase, Script};
use tamperline_types::{EventKind, FieldValue};

#[test]
fn test_phase_timeline() {
    let mut h = Harness::soc();
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::Recording);

    assert_eq!(h.run_until(ScenarioPhase::AttackDetected), Some(ms(5_000)));
    assert_eq!(h.orchestrator.ledger().len(), 6);

    assert_eq!(h.run_until(ScenarioPhase::WriteBlocked), Some(ms(12_800)));
    assert_eq!(h.orchestrator.ledger().len(), 8);

    assert_eq!(h.run_until(ScenarioPhase::Analyzing), Some(ms(17_500)));
    assert_eq!(h.orchestrator.ledger().len(), 10);

    assert_eq!(h.run_until(ScenarioPhase::Contained), Some(ms(23_000)));
    assert_eq!(h.orchestrator.ledger().len(), 13);

    assert_eq!(h.run_until(ScenarioPhase::Reporting), Some(ms(24_000)));
    assert!(h.orchestrator.next_wake().is_none());
    // The last stage is terminal.
    assert!(!h.orchestrator.advance().unwrap());
}

#[test]
fn test_recording_interleaves_integrity_check() {
    let mut h = Harness::soc();
    h.run_until(ScenarioPhase::AttackDetected).unwrap();

    let kinds: Vec<EventKind> = h
        .orchestrator
        .ledger()
        .events()
        .iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::TokenAuth,
            EventKind::TokenAuth,
            EventKind::TokenAuth,
            EventKind::IntegrityCheck,
            EventKind::TokenAuth,
            EventKind::TokenAuth,
        ]
    );
}

#[test]
fn test_rejection_receipt_names_real_digests() {
    let mut h = Harness::soc();
    h.run_out();
    let o = &h.orchestrator;
    assert_eq!(o.phase(), ScenarioPhase::Reporting);

    let tamper = o.last_tamper().unwrap();
    assert_eq!(tamper.target_index, SOC_TAMPER_INDEX);
    assert!(tamper.leaf_changed());
    assert_eq!(tamper.original_leaf, o.ledger().leaves()[SOC_TAMPER_INDEX]);

    let rejection = o
        .ledger()
        .events()
        .iter()
        .find(|e| e.kind == EventKind::WriteRejected)
        .unwrap();
    assert_eq!(
        rejection.detail("original_leaf"),
        Some(&FieldValue::Text(tamper.original_leaf.to_string()))
    );
    assert_eq!(
        rejection.detail("proposed_leaf"),
        Some(&FieldValue::Text(tamper.proposed_leaf.to_string()))
    );
    assert_eq!(
        rejection.detail("target_kind"),
        Some(&FieldValue::Text("INTEGRITY_CHECK".to_string()))
    );
    assert_eq!(rejection.detail("target_event"), Some(&FieldValue::Count(4)));
    assert!(o.ledger().verify());
}

#[test]
fn test_stolen_token_is_blocked_before_pivot() {
    let mut h = Harness::soc();
    h.run_until(ScenarioPhase::WriteBlocked).unwrap();

    let events = h.orchestrator.ledger().events();
    let blocked = &events[7];
    assert_eq!(blocked.kind, EventKind::TokenBlocked);
    assert_eq!(
        blocked.detail("origin"),
        Some(&FieldValue::Text("ST. PETERSBURG".to_string()))
    );
    assert_eq!(
        events[6].detail("identity"),
        Some(&FieldValue::Text("svc_okta_sync".to_string()))
    );
}

#[test]
fn test_triage_confidences() {
    let mut h = Harness::soc();
    h.run_until(ScenarioPhase::Contained).unwrap();

    let confidences: Vec<f64> = h.orchestrator.ledger().events()[10..]
        .iter()
        .filter_map(|e| match e.detail("confidence") {
            Some(FieldValue::Score(c)) => Some(*c),
            _ => None,
        })
        .collect();
    assert_eq!(confidences, vec![0.94, 0.97, 0.91]);
}

#[test]
fn test_viewer_cannot_tamper_in_soc() {
    let mut h = Harness::soc();
    for at in (0..=24_000).step_by(250) {
        h.run_to(at);
        assert!(!h.orchestrator.awaiting_tamper(), "at {at} ms");
    }
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::Reporting);
}

#[test]
fn test_paced_run_reaches_report() {
    let mut h = Harness::new(Script::soc().scaled(1000.0).unwrap());
    assert!(h.orchestrator.advance().unwrap());

    assert_eq!(
        h.run_until(ScenarioPhase::WriteBlocked),
        Some(Duration::from_micros(12_800))
    );
    assert_eq!(h.run_out(), ms(24));
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::Reporting);
    assert_eq!(h.orchestrator.ledger().len(), 13);
}
