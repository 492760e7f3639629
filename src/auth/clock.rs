//! Wall-clock seconds used for token expiry.

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in whole epoch seconds.
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> i64;
}

/// UTC system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Settable clock for simulated time.
///
/// Generators replaying historical data, and tests, drive token expiry
/// through this instead of the system clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self { now: AtomicI64::new(start) }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
