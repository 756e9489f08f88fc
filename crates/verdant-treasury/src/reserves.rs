//! Reserve accounting and the purchase allocation split

use crate::error::{Result, TreasuryError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use verdant_core::types::{Amount, Bps, Reserve, BPS_DENOMINATOR};

/// Four non-negative reserves, mutated only through allocate/deduct
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    principal: Amount,
    coupon: Amount,
    project: Amount,
    emergency: Amount,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of one reserve
    pub fn balance(&self, reserve: Reserve) -> Amount {
        *self.slot(reserve)
    }

    /// Sum of all reserves
    pub fn total(&self) -> Amount {
        self.principal + self.coupon + self.project + self.emergency
    }

    /// Invariant check: reserves must be covered by actual custody
    pub fn covered_by(&self, custodial_balance: Amount) -> bool {
        self.total() <= custodial_balance
    }

    /// Increase a reserve
    pub fn allocate(&mut self, reserve: Reserve, amount: Amount) {
        let slot = self.slot_mut(reserve);
        *slot = slot.saturating_add(amount);
        info!(reserve = %reserve, amount, "treasury allocation");
    }

    /// Decrease a reserve, flooring at zero. Returns the amount actually
    /// deducted; a shortfall is reported to the caller, never an error.
    pub fn deduct(&mut self, reserve: Reserve, amount: Amount) -> Amount {
        let slot = self.slot_mut(reserve);
        let deducted = amount.min(*slot);
        *slot -= deducted;
        if deducted < amount {
            warn!(
                reserve = %reserve,
                requested = amount,
                deducted,
                "treasury deduction capped at available balance"
            );
        } else {
            info!(reserve = %reserve, amount, "treasury deduction");
        }
        deducted
    }

    fn slot(&self, reserve: Reserve) -> &Amount {
        match reserve {
            Reserve::Principal => &self.principal,
            Reserve::Coupon => &self.coupon,
            Reserve::Project => &self.project,
            Reserve::Emergency => &self.emergency,
        }
    }

    fn slot_mut(&mut self, reserve: Reserve) -> &mut Amount {
        match reserve {
            Reserve::Principal => &mut self.principal,
            Reserve::Coupon => &mut self.coupon,
            Reserve::Project => &mut self.project,
            Reserve::Emergency => &mut self.emergency,
        }
    }
}

/// Basis-point split of a purchase remainder (after the coupon reservation)
/// across principal, project, and emergency reserves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSplit {
    pub principal_bps: Bps,
    pub project_bps: Bps,
    pub emergency_bps: Bps,
}

impl AllocationSplit {
    pub fn new(principal_bps: Bps, project_bps: Bps, emergency_bps: Bps) -> Result<Self> {
        let split = Self {
            principal_bps,
            project_bps,
            emergency_bps,
        };
        split.validate()?;
        Ok(split)
    }

    /// The three shares must sum to exactly 10,000 bps
    pub fn validate(&self) -> Result<()> {
        let total = self.principal_bps + self.project_bps + self.emergency_bps;
        if total != BPS_DENOMINATOR {
            return Err(TreasuryError::SplitMismatch { total });
        }
        Ok(())
    }

    /// Split `remainder` into (principal, project, emergency). The
    /// emergency share absorbs flooring remainders so the three parts
    /// always sum to `remainder` exactly - no rounding leakage.
    pub fn apply(&self, remainder: Amount) -> (Amount, Amount, Amount) {
        let principal = remainder * self.principal_bps as Amount / BPS_DENOMINATOR as Amount;
        let project = remainder * self.project_bps as Amount / BPS_DENOMINATOR as Amount;
        let emergency = remainder - principal - project;
        (principal, project, emergency)
    }
}

impl Default for AllocationSplit {
    /// 70% principal / 25% project / 5% emergency
    fn default() -> Self {
        Self {
            principal_bps: 7_000,
            project_bps: 2_500,
            emergency_bps: 500,
        }
    }
}
