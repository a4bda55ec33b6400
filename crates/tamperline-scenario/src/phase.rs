//! Scenario phases and the table of allowed transitions.

use std::fmt;

use serde::Serialize;

/// One named state of the scenario machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPhase {
    /// Nothing recorded yet.
    Idle,
    /// Events are being appended.
    Recording,
    /// Waiting for the viewer to try rewriting an event.
    AwaitingTamper,
    /// An intrusion is being narrated.
    AttackDetected,
    /// A tamper attempt was rejected.
    WriteBlocked,
    /// Comparison or triage.
    Analyzing,
    /// The intrusion has been contained.
    Contained,
    /// Closing summary.
    Reporting,
}

impl ScenarioPhase {
    /// Phases reachable from this one in a single step.
    pub const fn successors(&self) -> &'static [ScenarioPhase] {
        match self {
            Self::Idle => &[Self::Recording],
            Self::Recording => &[Self::AwaitingTamper, Self::AttackDetected],
            Self::AwaitingTamper | Self::AttackDetected => &[Self::WriteBlocked],
            Self::WriteBlocked => &[Self::Analyzing],
            Self::Analyzing => &[Self::Contained, Self::Reporting],
            Self::Contained => &[Self::Reporting],
            Self::Reporting => &[],
        }
    }

    /// Whether the table allows `self -> next`.
    pub fn can_transition_to(&self, next: ScenarioPhase) -> bool {
        self.successors().contains(&next)
    }

    /// Whether no phase follows this one.
    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// Lower-case name used in logs and narration.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::AwaitingTamper => "awaiting_tamper",
            Self::AttackDetected => "attack_detected",
            Self::WriteBlocked => "write_blocked",
            Self::Analyzing => "analyzing",
            Self::Contained => "contained",
            Self::Reporting => "reporting",
        }
    }
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
