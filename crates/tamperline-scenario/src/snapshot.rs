//! Read-only view of an orchestrator for renderers.

use std::time::Duration;

use serde::Serialize;
use tamperline_analyze::Scores;
use tamperline_ledger::{Receipt, TamperResult, TreeNode};
use tamperline_types::{Digest, Event};
use tracing::warn;

use crate::orchestrator::Orchestrator;
use crate::phase::ScenarioPhase;

/// Everything a renderer draws, copied out of the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub script: String,
    pub phase: ScenarioPhase,
    pub events: Vec<Event>,
    pub leaves: Vec<Digest>,
    pub nodes: Vec<TreeNode>,
    pub root: Option<Digest>,
    /// Analyzer scores per event, index-aligned with `events`.
    pub scores: Vec<Scores>,
    /// Scores over the concatenation of every event; `None` when empty.
    pub aggregate: Option<Scores>,
    pub receipts: Vec<Receipt>,
    pub selected: Option<usize>,
    pub tamper: Option<TamperResult>,
    pub narration: Vec<String>,
    /// Whether the ledger re-verifies from its events.
    pub verified: bool,
    pub halted: Option<String>,
    /// Deadline of the pending wake.
    pub next_deadline: Option<Duration>,
}

impl Snapshot {
    pub(crate) fn capture(o: &Orchestrator) -> Self {
        let ledger = o.ledger();
        let aggregate = if ledger.is_empty() {
            None
        } else {
            match ledger.canonical_stream() {
                Ok(bytes) => Some(Scores::of(&bytes)),
                Err(e) => {
                    warn!(error = %e, "failed to serialize ledger for aggregate scores");
                    None
                }
            }
        };

        Self {
            script: o.script().name.clone(),
            phase: o.phase(),
            events: ledger.events().to_vec(),
            leaves: ledger.leaves().to_vec(),
            nodes: ledger.nodes().to_vec(),
            root: ledger.root().copied(),
            scores: o.scores().to_vec(),
            aggregate,
            receipts: ledger.receipts(),
            selected: o.selected(),
            tamper: o.last_tamper().cloned(),
            narration: o.narration().to_vec(),
            verified: ledger.verify(),
            halted: o.halted().map(str::to_string),
            next_deadline: o.next_wake().map(|w| w.deadline),
        }
    }

    /// The selected event, if any.
    pub fn selected_event(&self) -> Option<&Event> {
        self.selected.and_then(|i| self.events.get(i))
    }
}
