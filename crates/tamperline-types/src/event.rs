//! Event model carried by the ledger.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// Build a wall-clock timestamp for scripted events.
///
/// Out-of-range components fall back to midnight.
pub fn wall_clock(hour: u32, min: u32, sec: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, sec).unwrap_or(NaiveTime::MIN)
}

/// A single immutable ledger record.
///
/// Events are never mutated once recorded. A tamper attempt builds a new
/// candidate `Event` and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Narrative sequence number.
    pub id: u64,
    /// Wall-clock time shown in the narration (`HH:MM:SS`).
    pub timestamp: NaiveTime,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Free-form fields, kept sorted by name.
    pub details: BTreeMap<String, FieldValue>,
}

/// Enumerated event tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// An OAuth token was granted to an integration.
    TokenGrant,
    /// A resource was read.
    DataAccess,
    /// Records left the system in bulk.
    DataExport,
    /// A token was revoked.
    TokenRevoke,
    /// Routine token authentication.
    TokenAuth,
    /// A token was blocked by policy.
    TokenBlocked,
    /// Backup sets were hashed and verified.
    IntegrityCheck,
    /// A write to recorded history was refused.
    WriteRejected,
    /// The source of a compromised token was suspended.
    AccountSuspended,
    /// Triage: threat classification.
    ThreatClassify,
    /// Triage: kill chain stage assessment.
    KillChainStage,
    /// Triage: automatic containment action.
    AutoResponse,
}

impl EventKind {
    /// Wire name, as it appears in the canonical serialization.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenGrant => "TOKEN_GRANT",
            Self::DataAccess => "DATA_ACCESS",
            Self::DataExport => "DATA_EXPORT",
            Self::TokenRevoke => "TOKEN_REVOKE",
            Self::TokenAuth => "TOKEN_AUTH",
            Self::TokenBlocked => "TOKEN_BLOCKED",
            Self::IntegrityCheck => "INTEGRITY_CHECK",
            Self::WriteRejected => "WRITE_REJECTED",
            Self::AccountSuspended => "ACCOUNT_SUSPENDED",
            Self::ThreatClassify => "THREAT_CLASSIFY",
            Self::KillChainStage => "KILL_CHAIN_STAGE",
            Self::AutoResponse => "AUTO_RESPONSE",
        }
    }

    /// The detail field an attacker would edit to rewrite this event.
    pub const fn modifiable_field(&self) -> &'static str {
        match self {
            Self::DataAccess | Self::DataExport => "records",
            Self::TokenRevoke => "reason",
            Self::TokenGrant => "permissions",
            Self::TokenAuth | Self::TokenBlocked => "origin",
            _ => "detail",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detail value. Serialized untagged, so JSON stays plain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Count(i64),
    Score(f64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Count(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Count(i64::from(v))
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        Self::Count(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Score(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(v) => write!(f, "{v}"),
            Self::Count(v) => write!(f, "{v}"),
            Self::Score(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::List(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}

impl Event {
    /// Create an event with no details.
    pub fn new(id: u64, timestamp: NaiveTime, kind: EventKind) -> Self {
        Self {
            id,
            timestamp,
            kind,
            details: BTreeMap::new(),
        }
    }

    /// Builder-style detail insertion.
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.details.insert(field.to_string(), value.into());
        self
    }

    /// Look up a detail field.
    pub fn detail(&self, field: &str) -> Option<&FieldValue> {
        self.details.get(field)
    }

    /// Canonical serialization: compact JSON with fields in declaration
    /// order and details sorted by name.
    ///
    /// Fails on an empty field name or a non-finite score rather than
    /// letting the encoder silently emit `null`.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, EventError> {
        for (field, value) in &self.details {
            if field.is_empty() {
                return Err(EventError::EmptyFieldName);
            }
            if let FieldValue::Score(score) = value
                && !score.is_finite()
            {
                return Err(EventError::NonFiniteScore {
                    field: field.clone(),
                });
            }
        }

        Ok(serde_json::to_vec(self)?)
    }
}

impl fmt::Display for Event {
    /// `"14:06:00 | DATA_EXPORT | anomaly: true, records: 4942, resource: all"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | ", self.timestamp.format("%H:%M:%S"), self.kind)?;
        for (i, (field, value)) in self.details.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {value}")?;
        }
        Ok(())
    }
}
