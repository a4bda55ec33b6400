//! Receipts: per-event proofs of recording.

use chrono::NaiveTime;
use serde::Serialize;
use tamperline_types::{Digest, Event, EventKind};

/// Proof that an event was recorded at a given ledger position.
///
/// `leaf` is always the real leaf digest of the recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Ledger position.
    pub index: usize,
    /// The event's narrative id.
    pub event_id: u64,
    /// The event's kind.
    pub kind: EventKind,
    /// The event's wall-clock time.
    pub timestamp: NaiveTime,
    /// Leaf digest of the event.
    pub leaf: Digest,
}

impl Receipt {
    pub(crate) fn new(index: usize, event: &Event, leaf: Digest) -> Self {
        Self {
            index,
            event_id: event.id,
            kind: event.kind,
            timestamp: event.timestamp,
            leaf,
        }
    }
}
