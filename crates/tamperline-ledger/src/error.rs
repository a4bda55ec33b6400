//! Error types for the ledger crate.

use tamperline_types::EventError;

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// An index refers to an event that was never recorded.
    #[error("event index {index} out of range (ledger holds {len} events)")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// Number of recorded events.
        len: usize,
    },

    /// An event could not be canonically serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] EventError),
}
