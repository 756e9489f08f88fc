//! Clock abstraction
//!
//! Every time-gated behaviour in the protocol (timelock readiness,
//! challenge deadlines, voting windows, maturity) is a comparison against
//! a caller-supplied timestamp. The `Clock` trait is the single source of
//! those timestamps; tests drive a `ManualClock` to warp time
//! deterministically.

use crate::types::Timestamp;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current unix timestamp
pub trait Clock: Send + Sync {
    /// Current time in unix seconds
    fn now(&self) -> Timestamp;
}

/// Wall-clock backed implementation
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Jump forward by `secs`
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Set the absolute time
    pub fn set(&self, t: Timestamp) {
        self.now.store(t, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
