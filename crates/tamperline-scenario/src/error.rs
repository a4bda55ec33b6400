//! Error types for scenario playback.

use tamperline_ledger::LedgerError;

use crate::phase::ScenarioPhase;

/// Errors that can occur while building or playing a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The ledger refused an operation.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A script table is malformed.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Two consecutive stages are not connected in the phase table.
    #[error("transition {from} -> {to} is not allowed")]
    InvalidTransition {
        /// Phase being left.
        from: ScenarioPhase,
        /// Phase being entered.
        to: ScenarioPhase,
    },

    /// A tamper attempt was submitted outside a stage that waits for one.
    #[error("not awaiting a tamper attempt (phase {phase})")]
    NotAwaitingTamper {
        /// Phase at the time of the attempt.
        phase: ScenarioPhase,
    },

    /// A scripted step failed earlier; only a restart clears this.
    #[error("scenario halted: {reason}")]
    Halted {
        /// What failed.
        reason: String,
    },

    /// No built-in script has this name.
    #[error("unknown script: {0}")]
    UnknownScript(String),
}
