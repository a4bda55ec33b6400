//! Scripted scenario playback over a Merkle ledger.
//!
//! This crate provides:
//!
//! - [`Orchestrator`]: timed phase machine that plays a [`Script`]: appends
//!   events, runs tamper attempts and narrates.
//! - [`Script`]: the data table of stages and cues, with the built-in
//!   [`breach`](Script::breach) and [`soc`](Script::soc) scripts.
//! - [`Scheduler`]: single pending [`Wake`] with generation-based
//!   cancellation.
//! - [`Clock`]: injected time source ([`SystemClock`], [`ManualClock`]).
//! - [`forge`]: the attacker's per-kind edit of a recorded event.
//! - [`Snapshot`]: serializable state for renderers.

pub mod catalog;
pub mod clock;
pub mod error;
pub mod forge;
pub mod orchestrator;
pub mod phase;
pub mod scheduler;
pub mod script;
pub mod snapshot;

pub use catalog::{SCRIPT_NAMES, SOC_TAMPER_INDEX, breach_events};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ScenarioError;
pub use forge::forge;
pub use orchestrator::Orchestrator;
pub use phase::ScenarioPhase;
pub use scheduler::{Scheduler, Wake};
pub use script::{Cue, CueAction, Exit, Script, Stage};
pub use snapshot::Snapshot;

#[cfg(test)]
mod tests;
