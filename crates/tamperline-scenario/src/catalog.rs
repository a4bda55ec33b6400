//! Built-in scripts.

use std::time::Duration;

use tamperline_types::{Event, EventKind, wall_clock};

use crate::error::ScenarioError;
use crate::phase::ScenarioPhase;
use crate::script::{CueAction, Exit, Script, Stage};

/// Names accepted by [`Script::by_name`].
pub const SCRIPT_NAMES: &[&str] = &["breach", "soc"];

/// Event targeted by the SOC pivot attempt: the backup integrity check.
pub const SOC_TAMPER_INDEX: usize = 3;

const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// The six events of the OAuth token breach.
pub fn breach_events() -> Vec<Event> {
    vec![
        Event::new(1, wall_clock(14, 0, 0), EventKind::TokenGrant)
            .with("app", "Drift-Integration")
            .with("user", "admin@acme.com")
            .with("permissions", vec!["read", "write"]),
        Event::new(2, wall_clock(14, 5, 23), EventKind::DataAccess)
            .with("resource", "contacts")
            .with("records", 2847),
        Event::new(3, wall_clock(14, 5, 24), EventKind::DataAccess)
            .with("resource", "accounts")
            .with("records", 1203),
        Event::new(4, wall_clock(14, 5, 25), EventKind::DataAccess)
            .with("resource", "deals")
            .with("records", 892),
        Event::new(5, wall_clock(14, 6, 0), EventKind::DataExport)
            .with("resource", "all")
            .with("records", 4942)
            .with("anomaly", true),
        Event::new(6, wall_clock(14, 6, 1), EventKind::TokenRevoke)
            .with("reason", "abuse_detected")
            .with("by", "system"),
    ]
}

fn token_auth(id: u64, sec: u32, identity: &str, origin: &str) -> Event {
    Event::new(id, wall_clock(14, 2, sec), EventKind::TokenAuth)
        .with("identity", identity)
        .with("origin", origin)
        .with("status", "valid")
        .with("source", "TOKENTRACKER")
}

fn triage(id: u64, sec: u32, kind: EventKind, output: &str, detail: &str, confidence: f64) -> Event {
    Event::new(id, wall_clock(14, 2, sec), kind)
        .with("output", output)
        .with("detail", detail)
        .with("confidence", confidence)
        .with("source", "DECISIONLOG")
}

impl Script {
    /// Guided walkthrough of an OAuth token breach.
    ///
    /// Six events are recorded 2.4 s apart. After a 2 s pause the viewer
    /// picks an event and tries to rewrite it; the rejection is held for
    /// 6 s, then the comparison waits for the viewer before the close.
    pub fn breach() -> Self {
        let mut recording = Stage::new(ScenarioPhase::Recording, Exit::Dwell(ms(2000)));
        for event in breach_events() {
            recording = recording.append(2400, event);
        }

        Self {
            name: "breach".to_string(),
            stages: vec![
                Stage::new(ScenarioPhase::Idle, Exit::OnRequest)
                    .narrate(0, "An integration token is about to be abused."),
                recording,
                Stage::new(ScenarioPhase::AwaitingTamper, Exit::OnTamper)
                    .narrate(0, "Pick any recorded event and try to rewrite it."),
                Stage::new(ScenarioPhase::WriteBlocked, Exit::Dwell(ms(6000)))
                    .narrate(0, "Write rejected: the rewritten leaf does not match the root."),
                Stage::new(ScenarioPhase::Analyzing, Exit::OnRequest)
                    .narrate(0, "Original and proposed records, side by side."),
                Stage::new(ScenarioPhase::Reporting, Exit::Terminal)
                    .narrate(0, "History stays as recorded."),
            ],
        }
    }

    /// Automatic security-operations run.
    ///
    /// Routine token authentications and a backup integrity check are
    /// recorded, a stolen service token is detected and blocked, the
    /// attacker pivots and tries to rewrite the integrity record, the write
    /// is rejected and receipted, three triage decisions are logged and the
    /// incident is contained.
    pub fn soc() -> Self {
        let recording = Stage::new(ScenarioPhase::Recording, Exit::Dwell(Duration::ZERO))
            .append(800, token_auth(1, 0, "admin@corp.io", "NYC"))
            .append(1000, token_auth(2, 1, "dev@corp.io", "LONDON"))
            .append(1200, token_auth(3, 2, "ops@corp.io", "BERLIN"))
            .append(
                0,
                Event::new(4, wall_clock(14, 2, 2), EventKind::IntegrityCheck)
                    .with("sets", 47)
                    .with("status", "verified")
                    .with("target", "Backup_DB_04")
                    .with("detail", "All 47 backup sets verified")
                    .with("source", "BACKUPPROOF"),
            )
            .append(1000, token_auth(5, 3, "security@corp.io", "NYC"))
            .append(1000, token_auth(6, 4, "analyst@corp.io", "SF"));

        let attack = Stage::new(ScenarioPhase::AttackDetected, Exit::OnTamper)
            .append(
                1000,
                Event::new(7, wall_clock(14, 2, 5), EventKind::TokenAuth)
                    .with("identity", "svc_okta_sync")
                    .with("origin", "???")
                    .with("status", "suspicious")
                    .with("alert", "ANOMALY: OAUTH TOKEN REUSE DETECTED")
                    .with("source", "TOKENTRACKER"),
            )
            .append(
                800,
                Event::new(8, wall_clock(14, 2, 5), EventKind::TokenBlocked)
                    .with("identity", "svc_okta_sync")
                    .with("origin", "ST. PETERSBURG")
                    .with("status", "blocked")
                    .with("detail", "APT29 pattern: svc_okta_sync from ST. PETERSBURG")
                    .with("source", "TOKENTRACKER"),
            )
            .narrate(1500, "Stolen token blocked at login.")
            .narrate(1500, "...")
            .narrate(2000, "The attacker pivots to the backups.")
            .cue(
                1000,
                CueAction::Tamper {
                    index: SOC_TAMPER_INDEX,
                    value: "Backup_DB_04 replaced from attacker snapshot".to_string(),
                },
            );

        let blocked = Stage::new(ScenarioPhase::WriteBlocked, Exit::Dwell(ms(2700)))
            .cue(
                1200,
                CueAction::RecordRejection {
                    id: 9,
                    timestamp: wall_clock(14, 2, 12),
                },
            )
            .append(
                800,
                Event::new(10, wall_clock(14, 2, 14), EventKind::AccountSuspended)
                    .with("result", "LOGGED")
                    .with("detail", "Compromised token source suspended")
                    .with("source", "BACKUPPROOF"),
            );

        let analyzing = Stage::new(ScenarioPhase::Analyzing, Exit::Dwell(ms(1000)))
            .append(
                1500,
                triage(
                    11,
                    20,
                    EventKind::ThreatClassify,
                    "NATION-STATE APT (CONFIDENCE: 0.94)",
                    "APT29 TOKEN REUSE PATTERN",
                    0.94,
                ),
            )
            .append(
                1500,
                triage(
                    12,
                    21,
                    EventKind::KillChainStage,
                    "PRIVILEGE ESCALATION DETECTED",
                    "Lateral movement via compromised OAuth",
                    0.97,
                ),
            )
            .append(
                1500,
                triage(
                    13,
                    22,
                    EventKind::AutoResponse,
                    "TOKEN ROTATION + BACKUP LOCK",
                    "Automatic containment executed",
                    0.91,
                ),
            );

        Self {
            name: "soc".to_string(),
            stages: vec![
                Stage::new(ScenarioPhase::Idle, Exit::OnRequest),
                recording,
                attack,
                blocked,
                analyzing,
                Stage::new(ScenarioPhase::Contained, Exit::Dwell(ms(1000)))
                    .narrate(0, "Token rotated, backups locked."),
                Stage::new(ScenarioPhase::Reporting, Exit::Terminal)
                    .narrate(0, "Incident report generated from ledger receipts."),
            ],
        }
    }

    /// Look up a built-in script.
    pub fn by_name(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "breach" => Ok(Self::breach()),
            "soc" => Ok(Self::soc()),
            other => Err(ScenarioError::UnknownScript(other.to_string())),
        }
    }
}
