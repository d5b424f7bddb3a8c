//! Clock capability for timestamping scans
//!
//! The attendance log and scan events carry a plain seconds counter. The
//! source of that counter is injectable so the scan pipeline can be tested
//! with deterministic timestamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of scan timestamps, in whole seconds.
pub trait Clock: Send + Sync {
    /// Current timestamp in seconds.
    fn now_secs(&self) -> u64;
}

/// Seconds since process start.
///
/// Matches the original demo behavior: the counter resets on restart and
/// is not comparable across runs. Default clock.
pub struct UptimeClock {
    started: Instant,
}

impl UptimeClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for UptimeClock {
    fn now_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Unix wall-clock seconds.
pub struct WallClock;

impl Clock for WallClock {
    fn now_secs(&self) -> u64 {
        // Pre-1970 system time would go negative; clamp to zero
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Manually advanced clock for tests.
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, secs: u64) {
        self.now.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
