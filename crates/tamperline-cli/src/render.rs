//! Plain-text rendering of ledger state and tamper reports.

use std::io::{self, Write};

use tamperline_analyze::Scores;
use tamperline_ledger::{MerkleLedger, TamperResult};
use tamperline_scenario::Orchestrator;
use tamperline_types::{Digest, Event};

/// Commands accepted on stdin during interactive play.
pub const HELP: &str = "\
commands:
  next                 advance a stage that waits for you
  select N             select event N
  tamper N VALUE       try to rewrite event N with VALUE
  status               show the current phase and root
  restart              start over
  quit                 stop";

/// One recorded event with its leaf digest.
pub fn event_line(index: usize, event: &Event, leaf: &Digest) -> String {
    format!("[{index}] {event}  leaf {}", leaf.short())
}

/// Scores with their verdicts.
pub fn scores_line(scores: &Scores) -> String {
    format!(
        "entropy {:.3} ({}), compression {:.3} ({})",
        scores.entropy,
        scores.entropy_verdict(),
        scores.compression,
        scores.compression_verdict()
    )
}

/// Node digests per level, root last. One line per level.
pub fn tree_levels(ledger: &MerkleLedger) -> String {
    ledger
        .levels()
        .iter()
        .enumerate()
        .map(|(level, nodes)| {
            let digests: Vec<String> = nodes.iter().map(|n| n.digest.short()).collect();
            format!("  L{level}: {}\n", digests.join(" "))
        })
        .collect()
}

/// Multi-line report of a rejected write.
pub fn tamper_report(result: &TamperResult) -> String {
    let shift = &result.shift;
    [
        format!(
            "WRITE REJECTED: event {} ({}) at index {}",
            result.original_event.id, result.original_event.kind, result.target_index
        ),
        format!("  original : {}", result.original_event),
        format!("  proposed : {}", result.proposed_event),
        format!(
            "  leaf     : {} -> {}",
            result.original_leaf, result.proposed_leaf
        ),
        format!(
            "  path     : {:?} ({} signatures to recompute)",
            result.invalidated_nodes,
            result.signatures_to_recompute()
        ),
        format!("  root     : {} (unchanged)", result.authoritative_root),
        format!("  forged   : {}", result.forged_root),
        format!(
            "  entropy  : {:.3} -> {:.3} ({})",
            shift.before.entropy,
            shift.after.entropy,
            shift.after.entropy_verdict()
        ),
        format!(
            "  compress : {:.3} -> {:.3} ({})",
            shift.before.compression,
            shift.after.compression,
            shift.after.compression_verdict()
        ),
    ]
    .join("\n")
}

/// One-line status.
pub fn status_line(o: &Orchestrator) -> String {
    let root = o
        .ledger()
        .root()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let line = format!(
        "phase {} | {} events | root {root}",
        o.phase(),
        o.ledger().len()
    );
    match o.halted() {
        Some(reason) => format!("{line} | halted: {reason}"),
        None => line,
    }
}

/// Full dump of a finished scenario.
pub fn write_inspection<W: Write>(out: &mut W, o: &Orchestrator) -> io::Result<()> {
    let ledger = o.ledger();

    writeln!(out, "script {} ended in {}", o.script().name, o.phase())?;
    writeln!(out)?;
    writeln!(out, "events:")?;
    for (index, (event, leaf)) in ledger.events().iter().zip(ledger.leaves()).enumerate() {
        writeln!(out, "  {}", event_line(index, event, leaf))?;
    }

    writeln!(out)?;
    writeln!(out, "tree:")?;
    write!(out, "{}", tree_levels(ledger))?;
    if let Some(root) = ledger.root() {
        writeln!(out, "  root: {root}")?;
    }
    writeln!(out, "  verified: {}", ledger.verify())?;

    if let Some(scores) = o.snapshot().aggregate {
        writeln!(out, "  scores: {}", scores_line(&scores))?;
    }

    if let Some(result) = o.last_tamper() {
        writeln!(out)?;
        writeln!(out, "{}", tamper_report(result))?;
    }

    if !o.narration().is_empty() {
        writeln!(out)?;
        writeln!(out, "narration:")?;
        for line in o.narration() {
            writeln!(out, "  > {line}")?;
        }
    }
    Ok(())
}
