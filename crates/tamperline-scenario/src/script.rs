//! Narration scripts: the data table one orchestrator plays.
//!
//! A [`Script`] is a list of [`Stage`]s, one per phase visited. Each stage
//! runs its [`Cue`]s in order, each after a delay measured from the
//! previous cue (or from entering the stage), then leaves according to its
//! [`Exit`].

use std::time::Duration;

use chrono::NaiveTime;
use tamperline_types::Event;

use crate::error::ScenarioError;
use crate::phase::ScenarioPhase;

/// A complete scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Short name, e.g. `"breach"`.
    pub name: String,
    /// Stages in playback order. The first is always [`ScenarioPhase::Idle`].
    pub stages: Vec<Stage>,
}

/// One phase of a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub phase: ScenarioPhase,
    pub cues: Vec<Cue>,
    pub exit: Exit,
}

/// A timed scripted action.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Delay after the previous cue, or after entering the stage.
    pub after: Duration,
    pub action: CueAction,
}

/// What a cue does when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum CueAction {
    /// Append an event to the ledger.
    Append(Event),
    /// Attempt to rewrite event `index` with `value`. Always the last cue of
    /// an [`Exit::OnTamper`] stage; the stage ends with the attempt.
    Tamper { index: usize, value: String },
    /// Append a `WRITE_REJECTED` event describing the last tamper attempt.
    RecordRejection { id: u64, timestamp: NaiveTime },
    /// Add a line of narration.
    Narrate(String),
}

/// How a stage ends once its cues are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Move on automatically after the given pause.
    Dwell(Duration),
    /// Wait for [`advance`](crate::Orchestrator::advance).
    OnRequest,
    /// Wait for a tamper attempt, then move to `WriteBlocked`.
    OnTamper,
    /// Stay here until restart.
    Terminal,
}

impl Stage {
    /// A stage with no cues.
    pub fn new(phase: ScenarioPhase, exit: Exit) -> Self {
        Self {
            phase,
            cues: Vec::new(),
            exit,
        }
    }

    /// Add a cue firing `after_ms` milliseconds after the previous one.
    pub fn cue(mut self, after_ms: u64, action: CueAction) -> Self {
        self.cues.push(Cue {
            after: Duration::from_millis(after_ms),
            action,
        });
        self
    }

    /// Shorthand for an [`CueAction::Append`] cue.
    pub fn append(self, after_ms: u64, event: Event) -> Self {
        self.cue(after_ms, CueAction::Append(event))
    }

    /// Shorthand for a [`CueAction::Narrate`] cue.
    pub fn narrate(self, after_ms: u64, line: &str) -> Self {
        self.cue(after_ms, CueAction::Narrate(line.to_string()))
    }
}

fn invalid(msg: impl Into<String>) -> ScenarioError {
    ScenarioError::InvalidScript(msg.into())
}

impl Script {
    /// Check the table is playable.
    ///
    /// - at least one stage, the first in `Idle`;
    /// - each consecutive pair of phases is allowed by the phase table;
    /// - an `OnTamper` stage is followed by `WriteBlocked`;
    /// - a `Tamper` cue is the last cue of an `OnTamper` stage and targets
    ///   an event appended before it;
    /// - a `RecordRejection` cue comes after an `OnTamper` stage;
    /// - the last stage, and only the last, is `Terminal`.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let Some(first) = self.stages.first() else {
            return Err(invalid(format!("script {:?} has no stages", self.name)));
        };
        if first.phase != ScenarioPhase::Idle {
            return Err(invalid(format!(
                "first stage must be idle, found {}",
                first.phase
            )));
        }

        let last = self.stages.len() - 1;
        let mut appended = 0usize;
        let mut tampered = false;

        for (i, stage) in self.stages.iter().enumerate() {
            if let Some(next) = self.stages.get(i + 1) {
                if !stage.phase.can_transition_to(next.phase) {
                    return Err(ScenarioError::InvalidTransition {
                        from: stage.phase,
                        to: next.phase,
                    });
                }
                if stage.exit == Exit::OnTamper && next.phase != ScenarioPhase::WriteBlocked {
                    return Err(invalid(format!(
                        "stage {i} waits for a tamper attempt but is followed by {}",
                        next.phase
                    )));
                }
            }

            match (stage.exit, i == last) {
                (Exit::Terminal, false) => {
                    return Err(invalid(format!("stage {i} is terminal but not last")));
                }
                (exit, true) if exit != Exit::Terminal => {
                    return Err(invalid("last stage must be terminal"));
                }
                _ => {}
            }

            for (c, cue) in stage.cues.iter().enumerate() {
                match &cue.action {
                    CueAction::Append(_) => appended += 1,
                    CueAction::RecordRejection { .. } => {
                        if !tampered {
                            return Err(invalid(format!(
                                "stage {i} records a rejection before any tamper stage"
                            )));
                        }
                        appended += 1;
                    }
                    CueAction::Tamper { index, .. } => {
                        if stage.exit != Exit::OnTamper || c + 1 != stage.cues.len() {
                            return Err(invalid(format!(
                                "tamper cue in stage {i} must be the last cue of a tamper stage"
                            )));
                        }
                        if *index >= appended {
                            return Err(invalid(format!(
                                "tamper cue in stage {i} targets event {index}, only {appended} appended"
                            )));
                        }
                    }
                    CueAction::Narrate(_) => {}
                }
            }

            if stage.exit == Exit::OnTamper {
                tampered = true;
            }
        }

        Ok(())
    }

    /// Copy of this script with every delay divided by `factor`.
    ///
    /// `factor > 1` plays faster. Fails for a non-positive or non-finite
    /// factor, or one so small a delay overflows.
    pub fn scaled(&self, factor: f64) -> Result<Script, ScenarioError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(invalid(format!("pacing factor must be positive, got {factor}")));
        }

        let scale = |d: Duration| -> Result<Duration, ScenarioError> {
            let nanos = (d.as_nanos() as f64 / factor).round();
            if nanos > u64::MAX as f64 {
                return Err(invalid(format!("{d:?} overflows at pacing factor {factor}")));
            }
            Ok(Duration::from_nanos(nanos as u64))
        };

        let mut scaled = self.clone();
        for stage in &mut scaled.stages {
            for cue in &mut stage.cues {
                cue.after = scale(cue.after)?;
            }
            if let Exit::Dwell(d) = stage.exit {
                stage.exit = Exit::Dwell(scale(d)?);
            }
        }
        Ok(scaled)
    }

    /// Total scripted delay, ignoring time spent waiting on the viewer.
    pub fn scripted_duration(&self) -> Duration {
        self.stages
            .iter()
            .map(|stage| {
                let cues: Duration = stage.cues.iter().map(|c| c.after).sum();
                match stage.exit {
                    Exit::Dwell(d) => cues + d,
                    _ => cues,
                }
            })
            .sum()
    }
}
