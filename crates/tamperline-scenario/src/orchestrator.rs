//! The scenario orchestrator: plays a [`Script`] against a ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use tamperline_analyze::Scores;
use tamperline_ledger::{MerkleLedger, TamperResult, attempt_tamper};
use tamperline_types::{Event, EventKind};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::ScenarioError;
use crate::forge::forge;
use crate::phase::ScenarioPhase;
use crate::scheduler::{Scheduler, Wake};
use crate::script::{CueAction, Exit, Script, Stage};
use crate::snapshot::Snapshot;

type Result<T> = std::result::Result<T, ScenarioError>;

/// Timed phase machine driving one [`MerkleLedger`].
///
/// Single-threaded and cooperative: nothing happens between calls. Timed
/// steps run when the host calls [`tick`](Self::tick) or hands back the
/// pending [`Wake`] through [`on_wake`](Self::on_wake). Each step's deadline
/// is chained from the previous step's deadline, not from when the host
/// got around to running it, so playback is deterministic however late
/// the host is.
#[derive(Debug)]
pub struct Orchestrator {
    script: Arc<Script>,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,

    stage: usize,
    /// Next cue to run in the current stage.
    cue: usize,
    phase: ScenarioPhase,

    ledger: MerkleLedger,
    scores: Vec<Scores>,
    narration: Vec<String>,
    selected: Option<usize>,
    last_tamper: Option<TamperResult>,
    halted: Option<String>,
}

impl Orchestrator {
    /// Validate `script` and start in `Idle`.
    ///
    /// Fails with [`ScenarioError::Halted`] when the idle stage's immediate
    /// steps fail.
    pub fn new(script: Script, clock: Arc<dyn Clock>) -> Result<Self> {
        script.validate()?;

        let mut orchestrator = Self {
            script: Arc::new(script),
            clock,
            scheduler: Scheduler::new(),
            stage: 0,
            cue: 0,
            phase: ScenarioPhase::Idle,
            ledger: MerkleLedger::new(),
            scores: Vec::new(),
            narration: Vec::new(),
            selected: None,
            last_tamper: None,
            halted: None,
        };
        orchestrator.initialize()?;
        Ok(orchestrator)
    }

    /// Reset to an empty ledger in `Idle`, cancelling any pending wake.
    ///
    /// Runs the idle stage's zero-delay steps. If one fails the scenario
    /// halts and the error is returned; the reason stays in
    /// [`halted`](Self::halted) until the next restart.
    pub fn initialize(&mut self) -> Result<()> {
        self.scheduler.cancel();

        self.stage = 0;
        self.cue = 0;
        self.phase = ScenarioPhase::Idle;
        self.ledger = MerkleLedger::new();
        self.scores.clear();
        self.narration.clear();
        self.selected = None;
        self.last_tamper = None;
        self.halted = None;

        info!(
            script = %self.script.name,
            generation = self.scheduler.generation(),
            "scenario initialized"
        );

        let now = self.clock.now();
        self.guard(|o| o.pump(now))
    }

    /// Same as [`initialize`](Self::initialize); callable from any phase.
    pub fn restart(&mut self) -> Result<()> {
        info!(script = %self.script.name, from = %self.phase, "scenario restarted");
        self.initialize()
    }

    /// Move on from a stage that waits for the viewer.
    ///
    /// Returns `Ok(false)` and does nothing while a step is pending, while
    /// the stage still has cues to play, or when the stage does not exit on
    /// request.
    pub fn advance(&mut self) -> Result<bool> {
        self.ensure_running()?;

        if self.scheduler.pending().is_some()
            || !self.cues_done()
            || self.current_stage().exit != Exit::OnRequest
        {
            debug!(phase = %self.phase, "advance ignored");
            return Ok(false);
        }

        let now = self.clock.now();
        self.guard(|o| {
            o.enter_next_stage()?;
            o.pump(now)
        })?;
        Ok(true)
    }

    /// Mark event `index` as selected.
    pub fn select_event(&mut self, index: usize) -> Result<&Event> {
        self.ensure_running()?;
        let event = self.ledger.event(index)?;
        self.selected = Some(index);
        Ok(event)
    }

    /// The viewer tries to rewrite event `index` with `value`.
    ///
    /// Only accepted while the current stage waits for a tamper attempt and
    /// has played all its cues. An out-of-range index leaves phase and
    /// ledger untouched. On success the stage moves to `WriteBlocked`.
    pub fn submit_tamper(&mut self, index: usize, value: &str) -> Result<TamperResult> {
        self.ensure_running()?;

        if self.current_stage().exit != Exit::OnTamper || !self.cues_done() {
            return Err(ScenarioError::NotAwaitingTamper { phase: self.phase });
        }

        let result = attempt_tamper(&self.ledger, index, forge(self.ledger.event(index)?, value))?;
        self.selected = Some(index);
        self.record_tamper(result.clone());

        let now = self.clock.now();
        self.guard(|o| {
            o.enter_next_stage()?;
            o.pump(now)
        })?;
        Ok(result)
    }

    /// Run every step that is due at the clock's current time.
    ///
    /// Returns the number of wakes fired. A clock that jumped far ahead
    /// replays each intermediate step at its own deadline.
    pub fn tick(&mut self) -> Result<usize> {
        self.ensure_running()?;

        let now = self.clock.now();
        let mut fired = 0;
        while let Some(wake) = self.scheduler.take_due(now) {
            self.fire(wake)?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Host timer callback for a wake obtained from
    /// [`next_wake`](Self::next_wake).
    ///
    /// A wake from before a restart, or one that has been superseded, is
    /// ignored and `Ok(false)` returned.
    pub fn on_wake(&mut self, wake: Wake) -> Result<bool> {
        self.ensure_running()?;

        match self.scheduler.claim(&wake) {
            Some(wake) => {
                self.fire(wake)?;
                Ok(true)
            }
            None => {
                warn!(
                    deadline_ms = wake.deadline.as_millis() as u64,
                    generation = wake.generation,
                    current = self.scheduler.generation(),
                    "ignoring stale wake"
                );
                Ok(false)
            }
        }
    }

    /// The pending wake, if any.
    pub fn next_wake(&self) -> Option<Wake> {
        self.scheduler.pending()
    }

    /// Current phase.
    pub fn phase(&self) -> ScenarioPhase {
        self.phase
    }

    /// The ledger being narrated.
    pub fn ledger(&self) -> &MerkleLedger {
        &self.ledger
    }

    /// The script being played.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Result of the most recent tamper attempt.
    pub fn last_tamper(&self) -> Option<&TamperResult> {
        self.last_tamper.as_ref()
    }

    /// Why the scenario halted, if it did.
    pub fn halted(&self) -> Option<&str> {
        self.halted.as_deref()
    }

    /// Whether the current stage waits for a tamper attempt right now.
    pub fn awaiting_tamper(&self) -> bool {
        self.halted.is_none() && self.current_stage().exit == Exit::OnTamper && self.cues_done()
    }

    /// Whether the current stage waits for [`advance`](Self::advance) right
    /// now.
    pub fn awaiting_request(&self) -> bool {
        self.halted.is_none()
            && self.scheduler.pending().is_none()
            && self.current_stage().exit == Exit::OnRequest
            && self.cues_done()
    }

    /// Read-only copy of everything a renderer needs.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// Analyzer scores per recorded event.
    pub fn scores(&self) -> &[Scores] {
        &self.scores
    }

    /// Narration lines so far.
    pub fn narration(&self) -> &[String] {
        &self.narration
    }

    /// Index of the selected event.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn current_stage(&self) -> &Stage {
        // `stage` only ever indexes a validated, non-empty stage list.
        &self.script.stages[self.stage]
    }

    fn cues_done(&self) -> bool {
        self.cue >= self.current_stage().cues.len()
    }

    fn ensure_running(&self) -> Result<()> {
        match &self.halted {
            Some(reason) => Err(ScenarioError::Halted {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Run `step`; on failure halt the scenario and report it halted.
    fn guard(&mut self, step: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        step(self).map_err(|e| self.halt(e))
    }

    fn halt(&mut self, cause: ScenarioError) -> ScenarioError {
        let reason = cause.to_string();
        error!(phase = %self.phase, stage = self.stage, cue = self.cue, %reason, "scenario halted");
        self.scheduler.cancel();
        self.halted = Some(reason.clone());
        ScenarioError::Halted { reason }
    }

    fn fire(&mut self, wake: Wake) -> Result<()> {
        debug!(deadline_ms = wake.deadline.as_millis() as u64, phase = %self.phase, "wake fired");
        self.guard(|o| {
            o.perform(wake.deadline)?;
            o.pump(wake.deadline)
        })
    }

    /// Delay before the next timed step of the current stage, `None` when
    /// the stage waits on the viewer or is terminal.
    fn next_delay(&self) -> Option<Duration> {
        let stage = self.current_stage();
        match stage.cues.get(self.cue) {
            Some(cue) => Some(cue.after),
            None => match stage.exit {
                Exit::Dwell(d) => Some(d),
                Exit::OnRequest | Exit::OnTamper | Exit::Terminal => None,
            },
        }
    }

    /// Run zero-delay steps inline from `base`, then schedule the next
    /// timed one.
    fn pump(&mut self, base: Duration) -> Result<()> {
        while self.halted.is_none() {
            match self.next_delay() {
                Some(delay) if delay.is_zero() => self.perform(base)?,
                Some(delay) => {
                    let wake = self.scheduler.schedule(base + delay);
                    debug!(
                        deadline_ms = wake.deadline.as_millis() as u64,
                        generation = wake.generation,
                        "step scheduled"
                    );
                    break;
                }
                None => break,
            }
        }
        Ok(())
    }

    /// Run the next step: the next cue if any, otherwise the dwell exit.
    fn perform(&mut self, at: Duration) -> Result<()> {
        let script = Arc::clone(&self.script);
        let stage = &script.stages[self.stage];

        let Some(cue) = stage.cues.get(self.cue) else {
            return self.enter_next_stage();
        };
        self.cue += 1;

        match &cue.action {
            CueAction::Append(event) => {
                self.append(event.clone())?;
            }
            CueAction::Narrate(line) => {
                info!(phase = %self.phase, at_ms = at.as_millis() as u64, "{line}");
                self.narration.push(line.clone());
            }
            CueAction::Tamper { index, value } => {
                let proposed = forge(self.ledger.event(*index)?, value);
                let result = attempt_tamper(&self.ledger, *index, proposed)?;
                self.record_tamper(result);
                self.enter_next_stage()?;
            }
            CueAction::RecordRejection { id, timestamp } => {
                match self.rejection_event(*id, *timestamp) {
                    Some(event) => {
                        self.append(event)?;
                    }
                    None => warn!(id, "no tamper attempt to record a rejection for"),
                }
            }
        }
        Ok(())
    }

    fn append(&mut self, event: Event) -> Result<()> {
        let bytes = event.canonical_bytes().map_err(tamperline_ledger::LedgerError::from)?;
        self.ledger.append(event)?;
        self.scores.push(Scores::of(&bytes));
        Ok(())
    }

    fn record_tamper(&mut self, result: TamperResult) {
        self.narration.push(format!(
            "Write to event {} rejected: {} signatures would need recomputing.",
            result.original_event.id,
            result.signatures_to_recompute()
        ));
        self.last_tamper = Some(result);
    }

    /// `WRITE_REJECTED` event describing the last tamper attempt.
    fn rejection_event(&self, id: u64, timestamp: NaiveTime) -> Option<Event> {
        let tamper = self.last_tamper.as_ref()?;
        Some(
            Event::new(id, timestamp, EventKind::WriteRejected)
                .with("target_event", tamper.original_event.id as i64)
                .with("target_kind", tamper.original_event.kind.as_str())
                .with("original_leaf", tamper.original_leaf.to_string())
                .with("proposed_leaf", tamper.proposed_leaf.to_string())
                .with("signatures", tamper.signatures_to_recompute())
                .with("result", "BLOCKED"),
        )
    }

    fn enter_next_stage(&mut self) -> Result<()> {
        let from = self.phase;
        let next = self.stage + 1;
        let Some(stage) = self.script.stages.get(next) else {
            return Err(ScenarioError::InvalidScript(format!(
                "no stage after {from}"
            )));
        };
        if !from.can_transition_to(stage.phase) {
            return Err(ScenarioError::InvalidTransition {
                from,
                to: stage.phase,
            });
        }

        self.stage = next;
        self.cue = 0;
        self.phase = stage.phase;
        info!(
            from = %from,
            to = %self.phase,
            events = self.ledger.len(),
            "phase transition"
        );
        Ok(())
    }
}
