//! Integration test: breach walkthrough.
//!
//! Six events recorded on schedule, a viewer rewrite rejected, comparison
//! and close.

use tamperline_integration_tests::{Harness, ms};
use tamperline_ledger::{MerkleLedger, attempt_tamper};
use tamperline_scenario::{ScenarioPhase, breach_events, forge};
use tamperline_types::{EventKind, FieldValue};

#[test]
fn test_six_events_then_rejected_rewrite() {
    let mut h = Harness::breach();

    assert_eq!(h.run_until(ScenarioPhase::AwaitingTamper), Some(ms(16_400)));
    let o = &mut h.orchestrator;
    assert_eq!(o.ledger().len(), 6);
    assert_eq!(o.ledger().leaves().len(), 6);
    let root = *o.ledger().root().unwrap();

    let result = o.submit_tamper(4, "0").unwrap();
    assert_ne!(result.proposed_leaf, result.original_leaf);
    assert_eq!(o.ledger().root(), Some(&root));
    assert_eq!(result.signatures_to_recompute(), 4);
    assert_eq!(result.invalidated_nodes, vec![4, 8, 10, 11]);

    // The recorded export still shows the real count.
    assert_eq!(
        o.ledger().event(4).unwrap().detail("records"),
        Some(&FieldValue::Count(4942))
    );
}

#[test]
fn test_ledger_matches_batch_build() {
    let mut h = Harness::breach();
    h.run_until(ScenarioPhase::AwaitingTamper).unwrap();

    let batch = MerkleLedger::from_events(breach_events()).unwrap();
    assert_eq!(h.orchestrator.ledger(), &batch);
}

#[test]
fn test_full_walkthrough_timeline() {
    let mut h = Harness::breach();

    assert_eq!(h.run_until(ScenarioPhase::AwaitingTamper), Some(ms(16_400)));
    h.clock.set(ms(30_000));
    h.orchestrator.submit_tamper(0, "").unwrap();
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::WriteBlocked);

    assert_eq!(h.run_until(ScenarioPhase::Analyzing), Some(ms(36_000)));
    assert!(h.orchestrator.next_wake().is_none());

    assert!(h.orchestrator.advance().unwrap());
    assert_eq!(h.orchestrator.phase(), ScenarioPhase::Reporting);

    let snapshot = h.orchestrator.snapshot();
    assert_eq!(snapshot.events.len(), 6);
    assert_eq!(snapshot.receipts.len(), 6);
    assert!(snapshot.verified);
    assert_eq!(snapshot.selected, Some(0));
    // One line per stage plus the rejection summary.
    assert_eq!(snapshot.narration.len(), 6);
}

#[test]
fn test_any_rewrite_keeps_root() {
    let ledger = MerkleLedger::from_events(breach_events()).unwrap();
    let root = *ledger.root().unwrap();

    for index in 0..ledger.len() {
        for value in ["0", "", "9999", "user_request"] {
            let proposed = forge(ledger.event(index).unwrap(), value);
            let result = attempt_tamper(&ledger, index, proposed).unwrap();
            assert!(result.leaf_changed(), "index {index}, value {value:?}");
            assert!(result.root_changed(), "index {index}, value {value:?}");
            assert_eq!(result.authoritative_root, root);
            assert_eq!(result.signatures_to_recompute(), 4);
        }
    }
    assert_eq!(ledger.root(), Some(&root));
}

#[test]
fn test_scores_are_recorded_per_event() {
    let mut h = Harness::breach();
    h.run_until(ScenarioPhase::AwaitingTamper).unwrap();

    let snapshot = h.orchestrator.snapshot();
    assert_eq!(snapshot.scores.len(), 6);
    for scores in &snapshot.scores {
        assert!((0.0..=1.0).contains(&scores.entropy));
        assert!((0.0..=1.0).contains(&scores.compression));
    }

    let aggregate = snapshot.aggregate.unwrap();
    assert!(aggregate.entropy < 1.0);
    assert!(aggregate.compression > 0.0);
}

#[test]
fn test_snapshot_json_shape() {
    let mut h = Harness::breach();
    h.run_until(ScenarioPhase::AwaitingTamper).unwrap();
    h.orchestrator.select_event(4).unwrap();
    h.orchestrator.submit_tamper(4, "0").unwrap();

    let json = serde_json::to_value(h.orchestrator.snapshot()).unwrap();
    assert_eq!(json["phase"], "write_blocked");
    assert_eq!(json["selected"], 4);
    assert_eq!(json["events"][4]["type"], "DATA_EXPORT");
    assert_eq!(json["events"][4]["timestamp"], "14:06:00");
    assert_eq!(json["tamper"]["proposed_event"]["details"]["records"], 0);
    assert_eq!(json["tamper"]["proposed_event"]["details"]["anomaly"], false);
    assert_eq!(json["tamper"]["authoritative_root"], json["root"]);
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(12));
    assert_eq!(json["receipts"][5]["kind"], EventKind::TokenRevoke.as_str());
}
