//! Timelock scheduler
//!
//! Generic two-phase gate for high-impact admin operations. The first call
//! with a given (kind, params) pair schedules the operation; a later call
//! with identical parameters, made after the delay has elapsed, consumes
//! the fingerprint and tells the caller to proceed with the mutation in the
//! same logical step. Consumed fingerprints are terminal - replays fail -
//! except that a caller whose mutation failed and was rolled back reopens
//! the fingerprint, keeping the operation retryable.
//!
//! Any difference in the parameter bytes produces a different fingerprint
//! and therefore an independent lifecycle.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// BLAKE3 fingerprint identifying one timelocked operation
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpFingerprint([u8; 32]);

impl OpFingerprint {
    /// Derive the fingerprint from the operation kind and parameter bytes
    pub fn derive(kind: &str, params: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.as_bytes());
        hasher.update(&(params.len() as u64).to_le_bytes());
        hasher.update(params);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for OpFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpFingerprint({})", &self.to_hex()[..16])
    }
}

/// Timelock errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelockError {
    /// Scheduled but the delay has not elapsed
    #[error("operation not ready until {ready_at}")]
    NotReady { ready_at: Timestamp },

    /// Fingerprint already consumed
    #[error("operation already executed")]
    AlreadyExecuted,
}

/// Result alias for timelock operations
pub type Result<T> = std::result::Result<T, TimelockError>;

/// Outcome of a `check_and_schedule` call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// First sighting: the operation is now scheduled
    Pending { ready_at: Timestamp },
    /// The delay has elapsed; the caller performs the mutation now
    Proceed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct OpState {
    scheduled_at: Timestamp,
    ready_at: Timestamp,
    executed: bool,
}

/// Two-phase schedule-then-execute gate keyed by operation fingerprint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timelock {
    delay_secs: i64,
    ops: HashMap<OpFingerprint, OpState>,
}

impl Timelock {
    /// Create a scheduler with a fixed delay
    pub fn new(delay_secs: i64) -> Self {
        Self {
            delay_secs,
            ops: HashMap::new(),
        }
    }

    pub fn delay_secs(&self) -> i64 {
        self.delay_secs
    }

    /// Audit identifier for a scheduled operation: fingerprint salted with
    /// the wall time of first scheduling, so an operation re-posted against
    /// a fresh scheduler at a different moment carries a distinct id.
    pub fn op_id(&self, fingerprint: &OpFingerprint) -> Option<String> {
        self.ops.get(fingerprint).map(|state| {
            let mut hasher = blake3::Hasher::new();
            hasher.update(fingerprint.as_bytes());
            hasher.update(&state.scheduled_at.to_le_bytes());
            hex::encode(&hasher.finalize().as_bytes()[..16])
        })
    }

    /// Schedule on first call, gate on later ones.
    ///
    /// - never seen: schedules for `now + delay`, returns `Pending`
    /// - scheduled, delay not elapsed: `Err(NotReady)`
    /// - ready: marks executed (terminal) and returns `Proceed`
    /// - executed: `Err(AlreadyExecuted)`
    pub fn check_and_schedule(&mut self, kind: &str, params: &[u8], now: Timestamp) -> Result<Gate> {
        let fingerprint = OpFingerprint::derive(kind, params);

        match self.ops.get_mut(&fingerprint) {
            None => {
                let ready_at = now + self.delay_secs;
                self.ops.insert(
                    fingerprint,
                    OpState {
                        scheduled_at: now,
                        ready_at,
                        executed: false,
                    },
                );
                info!(kind, fingerprint = %fingerprint.to_hex(), ready_at, "timelock operation scheduled");
                Ok(Gate::Pending { ready_at })
            }
            Some(state) if state.executed => Err(TimelockError::AlreadyExecuted),
            Some(state) if now < state.ready_at => Err(TimelockError::NotReady {
                ready_at: state.ready_at,
            }),
            Some(state) => {
                state.executed = true;
                info!(kind, fingerprint = %fingerprint.to_hex(), "timelock operation executed");
                Ok(Gate::Proceed)
            }
        }
    }

    /// Clear a consumed fingerprint so the operation can be attempted
    /// again at its original schedule. Callers use this when the mutation
    /// behind a `Proceed` gate fails and is rolled back: a gate must not
    /// stay consumed by an execution that never took effect.
    pub fn reopen(&mut self, fingerprint: &OpFingerprint) {
        if let Some(state) = self.ops.get_mut(fingerprint) {
            state.executed = false;
            info!(fingerprint = %fingerprint.to_hex(), "timelock operation reopened");
        }
    }

    /// Look up the state of an operation without mutating it
    pub fn status(&self, kind: &str, params: &[u8], now: Timestamp) -> Option<Gate> {
        let fingerprint = OpFingerprint::derive(kind, params);
        self.ops.get(&fingerprint).map(|state| {
            if !state.executed && now >= state.ready_at {
                Gate::Proceed
            } else {
                Gate::Pending {
                    ready_at: state.ready_at,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: i64 = 2 * 86_400;

    #[test]
    fn test_first_call_schedules() {
        let mut timelock = Timelock::new(DELAY);
        let gate = timelock.check_and_schedule("set_rate", b"500:900", 100).unwrap();
        assert_eq!(gate, Gate::Pending { ready_at: 100 + DELAY });
    }

    #[test]
    fn test_idempotence_ladder() {
        let mut timelock = Timelock::new(DELAY);
        let params = b"withdraw:1000";

        // schedule
        timelock.check_and_schedule("emergency", params, 0).unwrap();

        // pre-delay replays always fail not-ready
        for t in [1, DELAY / 2, DELAY - 1] {
            let err = timelock.check_and_schedule("emergency", params, t).unwrap_err();
            assert_eq!(err, TimelockError::NotReady { ready_at: DELAY });
        }

        // first post-delay call proceeds
        let gate = timelock.check_and_schedule("emergency", params, DELAY).unwrap();
        assert_eq!(gate, Gate::Proceed);

        // subsequent calls with the same parameters are exhausted
        let err = timelock
            .check_and_schedule("emergency", params, DELAY + 1_000_000)
            .unwrap_err();
        assert_eq!(err, TimelockError::AlreadyExecuted);
    }

    #[test]
    fn test_parameter_change_is_independent() {
        let mut timelock = Timelock::new(DELAY);

        timelock.check_and_schedule("set_rate", b"500:900", 0).unwrap();
        // Different params: independent lifecycle, schedules fresh
        let gate = timelock.check_and_schedule("set_rate", b"500:901", 0).unwrap();
        assert!(matches!(gate, Gate::Pending { .. }));

        // Different kind, same params: also independent
        let gate = timelock.check_and_schedule("set_split", b"500:900", 0).unwrap();
        assert!(matches!(gate, Gate::Pending { .. }));
    }

    #[test]
    fn test_op_id_salted_by_schedule_time() {
        let mut a = Timelock::new(DELAY);
        let mut b = Timelock::new(DELAY);
        a.check_and_schedule("set_rate", b"p", 10).unwrap();
        b.check_and_schedule("set_rate", b"p", 20).unwrap();

        let fp = OpFingerprint::derive("set_rate", b"p");
        assert_ne!(a.op_id(&fp).unwrap(), b.op_id(&fp).unwrap());
    }

    #[test]
    fn test_reopen_restores_the_gate() {
        let mut timelock = Timelock::new(DELAY);
        let fp = OpFingerprint::derive("emergency", b"w:1000");

        timelock.check_and_schedule("emergency", b"w:1000", 0).unwrap();
        assert_eq!(
            timelock.check_and_schedule("emergency", b"w:1000", DELAY).unwrap(),
            Gate::Proceed
        );

        // Rolled-back execution hands the gate back at the same schedule
        timelock.reopen(&fp);
        assert_eq!(
            timelock.check_and_schedule("emergency", b"w:1000", DELAY + 1).unwrap(),
            Gate::Proceed
        );

        // Without a reopen the fingerprint stays exhausted
        let err = timelock
            .check_and_schedule("emergency", b"w:1000", DELAY + 2)
            .unwrap_err();
        assert_eq!(err, TimelockError::AlreadyExecuted);

        // Reopening an unknown fingerprint is a no-op
        timelock.reopen(&OpFingerprint::derive("other", b""));
    }

    #[test]
    fn test_status_is_read_only() {
        let mut timelock = Timelock::new(DELAY);
        assert!(timelock.status("x", b"y", 0).is_none());

        timelock.check_and_schedule("x", b"y", 0).unwrap();
        assert_eq!(
            timelock.status("x", b"y", 1),
            Some(Gate::Pending { ready_at: DELAY })
        );
        assert_eq!(timelock.status("x", b"y", DELAY), Some(Gate::Proceed));
        // status never consumed the op
        assert_eq!(
            timelock.check_and_schedule("x", b"y", DELAY).unwrap(),
            Gate::Proceed
        );
    }
}
