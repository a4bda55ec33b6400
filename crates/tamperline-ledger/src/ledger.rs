//! Core ledger: ordered events, their leaf digests and the tree over them.

use tamperline_types::{Digest, Event};
use tracing::debug;

use crate::error::LedgerError;
use crate::node::{Tree, TreeNode};
use crate::receipt::Receipt;

type Result<T> = std::result::Result<T, LedgerError>;

/// Append-only Merkle ledger.
///
/// Invariants:
/// - `leaves.len() == events.len()`, index-aligned, in insertion order.
/// - the node array is the unique tree built bottom-up from the leaves.
/// - `root` is `None` iff there are no events.
///
/// Events are only ever appended; there is no remove, reorder or replace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MerkleLedger {
    events: Vec<Event>,
    leaves: Vec<Digest>,
    tree: Tree,
    root: Option<Digest>,
}

impl MerkleLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from a batch of events, in order.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Result<Self> {
        let mut ledger = Self::new();
        for event in events {
            ledger.append(event)?;
        }
        Ok(ledger)
    }

    /// Leaf digest of an event: the digest of its canonical serialization.
    pub fn leaf_digest(event: &Event) -> Result<Digest> {
        Ok(Digest::of(&event.canonical_bytes()?))
    }

    /// Append one event and rebuild the tree. Returns the new leaf digest.
    ///
    /// The leaf is computed before anything is touched, so a serialization
    /// failure leaves the ledger exactly as it was.
    pub fn append(&mut self, event: Event) -> Result<Digest> {
        let leaf = Self::leaf_digest(&event)?;

        self.events.push(event);
        self.leaves.push(leaf);
        self.tree = Tree::build(&self.leaves);
        self.root = self.tree.root();

        debug!(
            index = self.events.len() - 1,
            leaf = %leaf,
            root = %self.root.map(|r| r.to_string()).unwrap_or_default(),
            nodes = self.tree.nodes.len(),
            "appended ledger event"
        );

        Ok(leaf)
    }

    /// Rebuild from `events` alone and compare against the stored root.
    ///
    /// An empty ledger verifies trivially. Never panics; an event that no
    /// longer serializes counts as a failed verification.
    pub fn verify(&self) -> bool {
        if self.events.is_empty() {
            return self.root.is_none();
        }

        match Self::from_events(self.events.iter().cloned()) {
            Ok(rebuilt) => rebuilt.root == self.root && rebuilt.leaves == self.leaves,
            Err(e) => {
                debug!(error = %e, "verification rebuild failed");
                false
            }
        }
    }

    /// Current root digest, `None` for an empty ledger.
    pub fn root(&self) -> Option<&Digest> {
        self.root.as_ref()
    }

    /// Recorded events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Event at `index`.
    pub fn event(&self, index: usize) -> Result<&Event> {
        self.events.get(index).ok_or(LedgerError::OutOfRange {
            index,
            len: self.events.len(),
        })
    }

    /// Leaf digests, index-aligned with [`events`](Self::events).
    pub fn leaves(&self) -> &[Digest] {
        &self.leaves
    }

    /// The full node array: level 0 first, each level left to right.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.tree.nodes
    }

    /// Node slices per level, leaves first, root last.
    pub fn levels(&self) -> Vec<&[TreeNode]> {
        self.tree.levels()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Node-array indices from the leaf of event `index` up to the root.
    pub fn path_to_root(&self, index: usize) -> Result<Vec<usize>> {
        self.event(index)?;
        Ok(self.tree.path_from_leaf(index))
    }

    /// One receipt per recorded event, carrying its real leaf digest.
    pub fn receipts(&self) -> Vec<Receipt> {
        self.events
            .iter()
            .zip(&self.leaves)
            .enumerate()
            .map(|(index, (event, leaf))| Receipt::new(index, event, *leaf))
            .collect()
    }

    /// Concatenated canonical bytes of every event, in order.
    ///
    /// Input for whole-ledger analyzer scores.
    pub fn canonical_stream(&self) -> Result<Vec<u8>> {
        let mut stream = Vec::new();
        for event in &self.events {
            stream.extend_from_slice(&event.canonical_bytes()?);
        }
        Ok(stream)
    }

    /// Leaves with one entry replaced, for tamper simulation.
    pub(crate) fn leaves_with(&self, index: usize, leaf: Digest) -> Vec<Digest> {
        let mut leaves = self.leaves.clone();
        leaves[index] = leaf;
        leaves
    }
}
