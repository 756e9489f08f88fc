//! Global coupon rate state
//!
//! The effective rate is `base + green premium`. Finalized impact reports
//! raise the premium in fixed 50 bps steps; the premium never pushes the
//! effective rate past `max_bps`, and once the next full step no longer
//! fits, further finalizations have no rate effect.

use serde::{Deserialize, Serialize};
use verdant_core::types::Bps;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateState {
    base_bps: Bps,
    premium_bps: Bps,
    max_bps: Bps,
}

impl RateState {
    /// Create rate state with a zero premium. `base` must not exceed `max`.
    pub fn new(base_bps: Bps, max_bps: Bps) -> Self {
        debug_assert!(base_bps <= max_bps);
        Self {
            base_bps,
            premium_bps: 0,
            max_bps,
        }
    }

    pub fn base_bps(&self) -> Bps {
        self.base_bps
    }

    pub fn premium_bps(&self) -> Bps {
        self.premium_bps
    }

    pub fn max_bps(&self) -> Bps {
        self.max_bps
    }

    /// Rate applied by purchase, claim, and redemption paths. Read by
    /// value at the moment of each operation - never cached across calls.
    pub fn effective_bps(&self) -> Bps {
        self.base_bps + self.premium_bps
    }

    /// Raise the premium by one step if the full step still fits under the
    /// cap. Returns the new effective rate, or `None` when at cap.
    pub fn raise_premium(&mut self, step: Bps) -> Option<Bps> {
        if self.premium_bps + step <= self.max_bps - self.base_bps {
            self.premium_bps += step;
            Some(self.effective_bps())
        } else {
            None
        }
    }

    /// Replace the rate bounds, clamping the premium so the effective rate
    /// stays within the new cap.
    pub fn set_bounds(&mut self, base_bps: Bps, max_bps: Bps) {
        self.base_bps = base_bps;
        self.max_bps = max_bps;
        self.premium_bps = self.premium_bps.min(max_bps.saturating_sub(base_bps));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_core::types::GREEN_STEP_BPS;

    #[test]
    fn test_effective_rate() {
        let rate = RateState::new(500, 900);
        assert_eq!(rate.effective_bps(), 500);
    }

    #[test]
    fn test_premium_steps_until_cap() {
        let mut rate = RateState::new(500, 700);

        // 200 bps of headroom admits exactly four 50 bps steps
        assert_eq!(rate.raise_premium(GREEN_STEP_BPS), Some(550));
        assert_eq!(rate.raise_premium(GREEN_STEP_BPS), Some(600));
        assert_eq!(rate.raise_premium(GREEN_STEP_BPS), Some(650));
        assert_eq!(rate.raise_premium(GREEN_STEP_BPS), Some(700));

        // At cap: no effect, rate unchanged
        assert_eq!(rate.raise_premium(GREEN_STEP_BPS), None);
        assert_eq!(rate.effective_bps(), 700);
    }

    #[test]
    fn test_partial_headroom_rejects_full_step() {
        // 30 bps of headroom cannot admit a 50 bps step
        let mut rate = RateState::new(500, 530);
        assert_eq!(rate.raise_premium(GREEN_STEP_BPS), None);
        assert_eq!(rate.effective_bps(), 500);
    }

    #[test]
    fn test_set_bounds_clamps_premium() {
        let mut rate = RateState::new(500, 900);
        rate.raise_premium(50);
        rate.raise_premium(50);
        assert_eq!(rate.effective_bps(), 600);

        rate.set_bounds(500, 550);
        assert_eq!(rate.premium_bps(), 50);
        assert_eq!(rate.effective_bps(), 550);
    }
}
