//! Drives an orchestrator in real time, or instantly on a manual clock.

use std::io::Write;
use std::ops::ControlFlow;
use std::time::Instant as StdInstant;

use anyhow::{Result, bail};
use tamperline_scenario::{ManualClock, Orchestrator, ScenarioPhase, Wake};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::render;

/// How `play` answers the viewer's steps.
#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Answer prompts from `tamper_index`/`tamper_value` instead of stdin.
    pub auto: bool,
    /// Print only the final snapshot, as JSON.
    pub json: bool,
    pub tamper_index: usize,
    pub tamper_value: String,
}

/// A line typed during interactive play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Select(usize),
    Tamper(usize, String),
    Status,
    Restart,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let index = |s: &str| {
            s.parse::<usize>()
                .map_err(|_| format!("expected an event index, got {s:?}"))
        };

        let command = match word {
            "" => return Ok(None),
            "next" | "n" => Self::Next,
            "select" | "s" => Self::Select(index(rest)?),
            "tamper" | "t" => {
                let (n, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Self::Tamper(index(n)?, value.trim().to_string())
            }
            "status" => Self::Status,
            "restart" | "r" => Self::Restart,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(format!("unknown command {other:?}, try `help`")),
        };
        Ok(Some(command))
    }
}

/// What has already been printed, so each change is shown once.
#[derive(Debug, Default)]
struct Progress {
    phase: Option<ScenarioPhase>,
    events: usize,
    narration: usize,
    tamper: bool,
}

impl Progress {
    fn report<W: Write>(&mut self, o: &Orchestrator, out: &mut W) -> std::io::Result<()> {
        let ledger = o.ledger();
        if ledger.len() < self.events || o.narration().len() < self.narration {
            writeln!(out, "-- restarted --")?;
            *self = Self::default();
        }

        if self.phase != Some(o.phase()) {
            writeln!(out, "== {} ==", o.phase())?;
            self.phase = Some(o.phase());
        }

        for line in &o.narration()[self.narration..] {
            writeln!(out, "  > {line}")?;
        }
        self.narration = o.narration().len();

        let fresh = self.events..ledger.len();
        for index in fresh.clone() {
            let event = &ledger.events()[index];
            let leaf = &ledger.leaves()[index];
            writeln!(out, "{}", render::event_line(index, event, leaf))?;
        }
        // Root after the newest event only; earlier roots are not kept.
        if !fresh.is_empty()
            && let Some(root) = ledger.root()
        {
            writeln!(out, "    root {}", root.short())?;
        }
        self.events = ledger.len();

        match (o.last_tamper(), self.tamper) {
            (Some(result), false) => {
                writeln!(out, "{}", render::tamper_report(result))?;
                self.tamper = true;
            }
            (None, true) => self.tamper = false,
            _ => {}
        }
        Ok(())
    }
}

enum Step {
    Wake(Wake),
    Line(Option<String>),
}

/// Play `o` in real time until it ends, the input closes with nothing left
/// to wait for, or the viewer quits.
///
/// `origin` is the instant the orchestrator's clock measures from, so a
/// wake deadline maps to `origin + deadline`.
pub async fn play<R, W>(
    o: &mut Orchestrator,
    origin: StdInstant,
    input: R,
    out: &mut W,
    opts: &PlayOptions,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut input_open = !opts.auto;
    let mut progress = Progress::default();

    if !opts.auto && !opts.json {
        writeln!(out, "{}", render::HELP)?;
    }

    loop {
        if !opts.json {
            progress.report(o, out)?;
        }

        if let Some(reason) = o.halted()
            && !input_open
        {
            bail!("scenario halted: {reason}");
        }

        if opts.auto {
            if o.awaiting_request() {
                o.advance()?;
                continue;
            }
            if o.awaiting_tamper() {
                o.submit_tamper(opts.tamper_index, &opts.tamper_value)?;
                continue;
            }
        }

        let wake = o.next_wake();
        if wake.is_none() && !input_open {
            break;
        }

        let step = match wake {
            Some(wake) => {
                let deadline = Instant::from_std(origin + wake.deadline);
                tokio::select! {
                    () = sleep_until(deadline) => Step::Wake(wake),
                    line = lines.next_line(), if input_open => Step::Line(line?),
                }
            }
            None => Step::Line(lines.next_line().await?),
        };

        match step {
            Step::Wake(wake) => {
                if let Err(e) = o.on_wake(wake) {
                    writeln!(out, "error: {e}")?;
                }
            }
            Step::Line(None) => {
                debug!("input closed");
                input_open = false;
            }
            Step::Line(Some(line)) => {
                if handle_line(o, &line, out)?.is_break() {
                    break;
                }
            }
        }
    }

    if opts.json {
        serde_json::to_writer_pretty(&mut *out, &o.snapshot())?;
        writeln!(out)?;
    }
    Ok(())
}

/// Apply one typed command. Command errors are printed, not returned.
pub fn handle_line<W: Write>(
    o: &mut Orchestrator,
    line: &str,
    out: &mut W,
) -> Result<ControlFlow<()>> {
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(ControlFlow::Continue(())),
        Err(msg) => {
            writeln!(out, "{msg}")?;
            return Ok(ControlFlow::Continue(()));
        }
    };

    match command {
        Command::Next => match o.advance() {
            Ok(true) => {}
            Ok(false) => writeln!(out, "nothing to advance in {}", o.phase())?,
            Err(e) => writeln!(out, "error: {e}")?,
        },
        Command::Select(index) => match o.select_event(index) {
            Ok(event) => writeln!(out, "selected [{index}] {event}")?,
            Err(e) => writeln!(out, "error: {e}")?,
        },
        Command::Tamper(index, value) => {
            if let Err(e) = o.submit_tamper(index, &value) {
                writeln!(out, "error: {e}")?;
            }
        }
        Command::Status => writeln!(out, "{}", render::status_line(o))?,
        Command::Restart => {
            if let Err(e) = o.restart() {
                writeln!(out, "error: {e}")?;
            }
        }
        Command::Help => writeln!(out, "{}", render::HELP)?,
        Command::Quit => return Ok(ControlFlow::Break(())),
    }
    Ok(ControlFlow::Continue(()))
}

/// Play `o` to the end without waiting, answering prompts with `index` and
/// `value`.
pub fn run_instantly(o: &mut Orchestrator, clock: &ManualClock, index: usize, value: &str) -> Result<()> {
    loop {
        if let Some(reason) = o.halted() {
            bail!("scenario halted: {reason}");
        }

        if o.awaiting_request() {
            o.advance()?;
        } else if o.awaiting_tamper() {
            o.submit_tamper(index, value)?;
        } else if let Some(wake) = o.next_wake() {
            clock.set(wake.deadline);
            o.tick()?;
        } else {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tamperline_scenario::{Script, SystemClock};
    use tamperline_types::EventKind;

    fn manual(script: Script) -> (Arc<ManualClock>, Orchestrator) {
        let clock = Arc::new(ManualClock::new());
        let o = Orchestrator::new(script, clock.clone()).unwrap();
        (clock, o)
    }

    fn realtime(script: Script) -> (StdInstant, Orchestrator) {
        let clock = Arc::new(SystemClock::new());
        let origin = clock.origin();
        (origin, Orchestrator::new(script, clock).unwrap())
    }

    fn opts(auto: bool, json: bool) -> PlayOptions {
        PlayOptions {
            auto,
            json,
            tamper_index: 4,
            tamper_value: "0".to_string(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("next"), Ok(Some(Command::Next)));
        assert_eq!(Command::parse("  n  "), Ok(Some(Command::Next)));
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("select 3"), Ok(Some(Command::Select(3))));
        assert_eq!(
            Command::parse("tamper 4 0"),
            Ok(Some(Command::Tamper(4, "0".to_string())))
        );
        assert_eq!(
            Command::parse("tamper 5 user request"),
            Ok(Some(Command::Tamper(5, "user request".to_string())))
        );
        assert_eq!(
            Command::parse("tamper 5"),
            Ok(Some(Command::Tamper(5, String::new())))
        );
        assert_eq!(Command::parse("quit"), Ok(Some(Command::Quit)));
        assert!(Command::parse("select x").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn test_handle_line_drives_breach() {
        let (clock, mut o) = manual(Script::breach());
        let mut out = Vec::new();

        handle_line(&mut o, "next", &mut out).unwrap();
        assert_eq!(o.phase(), ScenarioPhase::Recording);

        // Too early to tamper; the error is printed, not returned.
        handle_line(&mut o, "tamper 0 1", &mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("not awaiting a tamper attempt"));

        clock.set(std::time::Duration::from_millis(16_400));
        o.tick().unwrap();
        assert_eq!(o.phase(), ScenarioPhase::AwaitingTamper);

        handle_line(&mut o, "select 4", &mut out).unwrap();
        assert_eq!(o.selected(), Some(4));
        handle_line(&mut o, "tamper 4 0", &mut out).unwrap();
        assert_eq!(o.phase(), ScenarioPhase::WriteBlocked);

        assert!(handle_line(&mut o, "quit", &mut out).unwrap().is_break());
    }

    #[test]
    fn test_handle_line_restart() {
        let (_clock, mut o) = manual(Script::breach());
        let mut out = Vec::new();
        handle_line(&mut o, "next", &mut out).unwrap();
        handle_line(&mut o, "restart", &mut out).unwrap();
        assert_eq!(o.phase(), ScenarioPhase::Idle);
        assert!(o.next_wake().is_none());
    }

    #[test]
    fn test_run_instantly_finishes_both_scripts() {
        let (clock, mut o) = manual(Script::breach());
        run_instantly(&mut o, &clock, 4, "0").unwrap();
        assert_eq!(o.phase(), ScenarioPhase::Reporting);
        assert_eq!(o.last_tamper().map(|t| t.target_index), Some(4));

        let (clock, mut o) = manual(Script::soc());
        run_instantly(&mut o, &clock, 4, "0").unwrap();
        assert_eq!(o.phase(), ScenarioPhase::Reporting);
        assert!(
            o.ledger()
                .events()
                .iter()
                .any(|e| e.kind == EventKind::WriteRejected)
        );
    }

    #[test]
    fn test_run_instantly_finishes_paced_script() {
        let (clock, mut o) = manual(Script::breach().scaled(1000.0).unwrap());
        run_instantly(&mut o, &clock, 4, "0").unwrap();
        assert_eq!(o.phase(), ScenarioPhase::Reporting);
        assert_eq!(o.ledger().len(), 6);
    }

    #[test]
    fn test_progress_prints_root_once_per_batch() {
        let (clock, mut o) = manual(Script::breach());
        let mut progress = Progress::default();
        let mut out = Vec::new();
        o.advance().unwrap();

        // Three appends land in one tick.
        clock.set(std::time::Duration::from_millis(7_200));
        assert_eq!(o.tick().unwrap(), 3);
        progress.report(&o, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let roots: Vec<&str> = text.lines().filter(|l| l.starts_with("    root ")).collect();
        assert_eq!(roots, vec![format!("    root {}", o.ledger().root().unwrap().short())]);
        assert_eq!(text.lines().filter(|l| l.starts_with('[')).count(), 3);
    }

    #[test]
    fn test_run_instantly_reports_bad_tamper_index() {
        let (clock, mut o) = manual(Script::breach());
        assert!(run_instantly(&mut o, &clock, 99, "0").is_err());
        assert_eq!(o.phase(), ScenarioPhase::AwaitingTamper);
    }

    #[tokio::test]
    async fn test_play_auto_runs_to_report() {
        let (origin, mut o) = realtime(Script::soc().scaled(1000.0).unwrap());
        let mut out = Vec::new();

        play(&mut o, origin, &b""[..], &mut out, &opts(true, false))
            .await
            .unwrap();

        assert_eq!(o.phase(), ScenarioPhase::Reporting);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("== reporting =="));
        assert!(text.contains("WRITE REJECTED"));
        assert!(text.contains("WRITE_REJECTED"));
    }

    #[tokio::test]
    async fn test_play_json_prints_snapshot() {
        let (origin, mut o) = realtime(Script::breach().scaled(1000.0).unwrap());
        let mut out = Vec::new();

        play(&mut o, origin, &b""[..], &mut out, &opts(true, true))
            .await
            .unwrap();

        let snapshot: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(snapshot["phase"], "reporting");
        assert_eq!(snapshot["tamper"]["target_index"], 4);
    }

    #[tokio::test]
    async fn test_play_interactive_stops_at_prompt_when_input_ends() {
        let (origin, mut o) = realtime(Script::breach().scaled(1000.0).unwrap());
        let mut out = Vec::new();

        play(&mut o, origin, &b"next\n"[..], &mut out, &opts(false, false))
            .await
            .unwrap();

        assert_eq!(o.phase(), ScenarioPhase::AwaitingTamper);
        assert_eq!(o.ledger().len(), 6);
    }

    #[tokio::test]
    async fn test_play_quit() {
        let (origin, mut o) = realtime(Script::breach());
        let mut out = Vec::new();

        play(&mut o, origin, &b"next\nquit\n"[..], &mut out, &opts(false, false))
            .await
            .unwrap();

        assert_eq!(o.phase(), ScenarioPhase::Recording);
        assert!(o.ledger().is_empty());
    }
}
