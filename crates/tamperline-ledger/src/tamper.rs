//! Tamper simulator: what a retroactive edit would have to change.

use serde::Serialize;
use tamperline_analyze::{ScoreShift, Scores};
use tamperline_types::{Digest, Event};
use tracing::warn;

use crate::error::LedgerError;
use crate::ledger::MerkleLedger;
use crate::node::Tree;

/// Description of a rejected write.
///
/// Produced once per tamper attempt and purely descriptive: nothing in the
/// ledger accepts it, so a simulated edit can never become authoritative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TamperResult {
    /// Ledger position the attacker tried to rewrite.
    pub target_index: usize,
    /// The recorded event, unchanged.
    pub original_event: Event,
    /// The attacker's replacement.
    pub proposed_event: Event,
    /// Leaf digest on record.
    pub original_leaf: Digest,
    /// Leaf digest the replacement would have.
    pub proposed_leaf: Digest,
    /// Node-array indices from the target leaf up to the root. Each would
    /// need recomputing for the edit to go unnoticed.
    pub invalidated_nodes: Vec<usize>,
    /// Root on record when the attempt was made.
    pub authoritative_root: Digest,
    /// Root the tree would have with the replacement leaf.
    pub forged_root: Digest,
    /// Analyzer scores of the original and proposed serializations.
    pub shift: ScoreShift,
}

impl TamperResult {
    /// Number of digests ("signatures") the edit would invalidate.
    pub fn signatures_to_recompute(&self) -> usize {
        self.invalidated_nodes.len()
    }

    /// Whether the replacement hashes differently from the record.
    pub fn leaf_changed(&self) -> bool {
        self.proposed_leaf != self.original_leaf
    }

    /// Whether the edit would change the published root.
    pub fn root_changed(&self) -> bool {
        self.forged_root != self.authoritative_root
    }
}

/// Evaluate replacing event `index` with `proposed` without committing it.
///
/// Fails with [`LedgerError::OutOfRange`] before doing any work when
/// `index` is not a recorded position. `ledger` is only borrowed shared, so
/// it cannot change.
pub fn attempt_tamper(
    ledger: &MerkleLedger,
    index: usize,
    proposed: Event,
) -> Result<TamperResult, LedgerError> {
    let original_event = ledger.event(index)?.clone();

    let original_bytes = original_event.canonical_bytes()?;
    let proposed_bytes = proposed.canonical_bytes()?;
    let proposed_leaf = Digest::of(&proposed_bytes);

    let original_leaf = ledger.leaves()[index];
    let invalidated_nodes = ledger.path_to_root(index)?;

    // Index was checked above, so the ledger is non-empty and has a root.
    let authoritative_root = ledger
        .root()
        .copied()
        .ok_or(LedgerError::OutOfRange { index, len: 0 })?;
    let forged = Tree::build(&ledger.leaves_with(index, proposed_leaf));
    let forged_root = forged.root().unwrap_or(authoritative_root);

    let shift = ScoreShift {
        before: Scores::of(&original_bytes),
        after: Scores::of(&proposed_bytes),
    };

    warn!(
        index,
        original = %original_leaf,
        proposed = %proposed_leaf,
        invalidated = invalidated_nodes.len(),
        "tamper attempt rejected"
    );

    Ok(TamperResult {
        target_index: index,
        original_event,
        proposed_event: proposed,
        original_leaf,
        proposed_leaf,
        invalidated_nodes,
        authoritative_root,
        forged_root,
        shift,
    })
}
