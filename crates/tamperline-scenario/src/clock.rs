//! Time sources for scenario playback.
//!
//! The orchestrator never reads the system time directly. It asks an
//! injected [`Clock`] for the elapsed time since the clock's origin, so
//! tests drive playback with a [`ManualClock`] and the binary uses a
//! [`SystemClock`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Time elapsed since the clock's origin. Never decreases.
    fn now(&self) -> Duration;
}

/// Wall time measured from a fixed [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant `now()` is measured from.
    ///
    /// Hosts convert a wake deadline into an `Instant` as
    /// `origin() + deadline`.
    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Keeps whole nanoseconds, so `set(d)` followed by `now()` reads back `d`
/// exactly. Durations past `u64::MAX` nanoseconds saturate.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    /// Start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let now = self.nanos.load(Ordering::SeqCst);
        self.nanos
            .fetch_max(now.saturating_add(saturating_nanos(by)), Ordering::SeqCst);
    }

    /// Jump to `to` if it is later than the current time.
    pub fn set(&self, to: Duration) {
        self.nanos.fetch_max(saturating_nanos(to), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
