//! The attacker's edit of a recorded event.

use tamperline_types::{Digest, Event, EventKind};

/// Length of the `_noise` field added to every forged event.
const NOISE_LEN: usize = 13;

/// Build the attacker's replacement for `original` from a user-supplied
/// `value`.
///
/// The edit depends on the kind: exports and accesses get `records` set to
/// the leading integer of `value` (0 if none), exports also lose their
/// `anomaly` flag; grants are narrowed to read-only; revokes get `reason`
/// (default `user_request`) and `by: user`; everything else has its
/// [`modifiable_field`](EventKind::modifiable_field) set to `value`.
///
/// A `_noise` field derived from the original and `value` mimics the junk a
/// hasty rewrite leaves behind. It is deterministic, so replays forge the
/// same event.
pub fn forge(original: &Event, value: &str) -> Event {
    let forged = original.clone();
    let forged = match original.kind {
        EventKind::DataExport => forged
            .with("records", leading_count(value))
            .with("anomaly", false),
        EventKind::DataAccess => forged.with("records", leading_count(value)),
        EventKind::TokenGrant => forged.with("permissions", vec!["read"]),
        EventKind::TokenRevoke => {
            let reason = if value.is_empty() { "user_request" } else { value };
            forged.with("reason", reason).with("by", "user")
        }
        kind => forged.with(kind.modifiable_field(), value),
    };

    let seed = format!("{}|{}|{}", original.id, original.kind, value);
    let mut noise = Digest::of(seed.as_bytes()).to_string();
    noise.truncate(NOISE_LEN);
    forged.with("_noise", noise)
}

/// Leading signed integer of `value`, ignoring leading whitespace; 0 when
/// there is none or it overflows.
fn leading_count(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    match rest[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}
