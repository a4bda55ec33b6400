//! Append-only, Merkle-hashed ledger of narrated events.
//!
//! The [`MerkleLedger`] records [`Event`](tamperline_types::Event)s in
//! order, hashes each into a leaf [`Digest`](tamperline_types::Digest) and
//! rebuilds a binary hash tree over the leaves on every append. Any change to
//! a recorded event changes its leaf and every ancestor up to the root, so
//! retroactive edits are evident.
//!
//! The [`attempt_tamper`] simulator computes what such an edit would touch
//! without mutating the ledger: there is no API that folds a
//! [`TamperResult`] back into a ledger.

mod error;
mod ledger;
mod node;
mod receipt;
mod tamper;

#[cfg(test)]
mod tests;

pub use error::LedgerError;
pub use ledger::MerkleLedger;
pub use node::{NodeKind, TreeNode};
pub use receipt::Receipt;
pub use tamper::{TamperResult, attempt_tamper};
