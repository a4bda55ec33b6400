//! Tests for the ledger crate.


use tamperline_types::{Event, EventKind, wall_clock};

/// The six events of the breach walkthrough.
fn breach_events() -> Vec<Event> {
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

/// Numbered filler events.
fn numbered(n: usize) -> Vec<Event> {
    (0..n)
        .map(|i| {
            Event::new(i as u64, wall_clock(9, 0, 0), EventKind::TokenAuth).with("seq", i)
        })
        .collect()
}
