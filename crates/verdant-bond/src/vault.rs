//! Bond vault - the lifecycle orchestrator
//!
//! One vault per issuance. Owns the treasury, the global rate state, the
//! standard pool and all tranches, and the timelock gating admin
//! operations. Every public operation is a serialized transaction: either
//! all of its ledger mutations commit, or none do. External transfers run
//! before local mutations on the payout side (and collection runs first on
//! the purchase side) so a collaborator failure leaves no partial state.
//!
//! Outbound payouts are uniformly capped at the custodial balance of the
//! payment asset, mirroring the treasury's deduct-floors-at-zero policy.

use crate::error::{BondError, Result};
use crate::interest::{accrue, coupon_for_window};
use crate::pool::{BondPool, HolderPosition, TranchePool, TrancheSpec};
use crate::rate::RateState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};
use verdant_core::collab::{BondTokenLedger, CapabilityOracle, CircuitBreaker, PaymentLedger, Role};
use verdant_core::events::{Event, EventLog};
use verdant_core::timelock::{Gate, OpFingerprint, Timelock};
use verdant_core::types::{
    short_addr, Address, Amount, Bps, Reserve, Timestamp, TrancheId, BPS_DENOMINATOR,
};
use verdant_treasury::{AllocationSplit, Treasury};

/// Issuance parameters for a vault
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BondConfig {
    pub face_value: Amount,
    pub total_supply: Amount,
    pub maturity_date: Timestamp,
    pub base_rate_bps: Bps,
    pub max_rate_bps: Bps,
    pub split: AllocationSplit,
    /// Early-redemption penalty on face value
    pub penalty_bps: Bps,
    /// Delay for timelocked admin operations
    pub timelock_delay_secs: i64,
}

/// Timelocked admin operations. The parameter bytes feed the timelock
/// fingerprint, so any change in parameters is an independent operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminOp {
    SetRateBounds { base_bps: Bps, max_bps: Bps },
    SetAllocationSplit { split: AllocationSplit },
    EmergencyWithdraw { to: Address, amount: Amount },
}

impl AdminOp {
    /// Reject malformed parameters up front. An invalid operation must
    /// never reach the scheduler: its fingerprint would be consumed by an
    /// execution that can only fail.
    pub fn validate(&self) -> Result<()> {
        match *self {
            AdminOp::SetRateBounds { base_bps, max_bps } if base_bps > max_bps => {
                Err(BondError::InvalidRateBounds { base_bps, max_bps })
            }
            AdminOp::SetAllocationSplit { split } => Ok(split.validate()?),
            _ => Ok(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AdminOp::SetRateBounds { .. } => "set_rate_bounds",
            AdminOp::SetAllocationSplit { .. } => "set_allocation_split",
            AdminOp::EmergencyWithdraw { .. } => "emergency_withdraw",
        }
    }

    pub fn param_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            AdminOp::SetRateBounds { base_bps, max_bps } => {
                bytes.extend_from_slice(&base_bps.to_le_bytes());
                bytes.extend_from_slice(&max_bps.to_le_bytes());
            }
            AdminOp::SetAllocationSplit { split } => {
                bytes.extend_from_slice(&split.principal_bps.to_le_bytes());
                bytes.extend_from_slice(&split.project_bps.to_le_bytes());
                bytes.extend_from_slice(&split.emergency_bps.to_le_bytes());
            }
            AdminOp::EmergencyWithdraw { to, amount } => {
                bytes.extend_from_slice(to);
                bytes.extend_from_slice(&amount.to_le_bytes());
            }
        }
        bytes
    }
}

/// Point-in-time reporting snapshot
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VaultStats {
    pub issued_supply: Amount,
    pub available_supply: Amount,
    pub effective_rate_bps: Bps,
    pub treasury_total: Amount,
    pub custodial_balance: Amount,
    pub tranche_count: usize,
}

/// The bond lifecycle state machine
pub struct BondVault {
    standard: BondPool,
    /// Standard-pool accrual clocks; quantities live in the token ledger
    claims: HashMap<Address, Timestamp>,
    tranches: BTreeMap<TrancheId, TranchePool>,
    next_tranche: TrancheId,
    treasury: Treasury,
    split: AllocationSplit,
    rate: RateState,
    penalty_bps: Bps,
    early_redemption_enabled: bool,
    matured_fired: bool,
    timelock: Timelock,
    caps: Arc<dyn CapabilityOracle>,
    breaker: Arc<dyn CircuitBreaker>,
    token: Arc<dyn BondTokenLedger>,
    payments: Arc<dyn PaymentLedger>,
    events: EventLog,
}

impl BondVault {
    pub fn new(
        config: BondConfig,
        caps: Arc<dyn CapabilityOracle>,
        breaker: Arc<dyn CircuitBreaker>,
        token: Arc<dyn BondTokenLedger>,
        payments: Arc<dyn PaymentLedger>,
    ) -> Result<Self> {
        config.split.validate()?;
        if config.base_rate_bps > config.max_rate_bps {
            return Err(BondError::InvalidRateBounds {
                base_bps: config.base_rate_bps,
                max_bps: config.max_rate_bps,
            });
        }
        Ok(Self {
            standard: BondPool::new(config.face_value, config.total_supply, config.maturity_date),
            claims: HashMap::new(),
            tranches: BTreeMap::new(),
            next_tranche: 1,
            treasury: Treasury::new(),
            split: config.split,
            rate: RateState::new(config.base_rate_bps, config.max_rate_bps),
            penalty_bps: config.penalty_bps,
            early_redemption_enabled: false,
            matured_fired: false,
            timelock: Timelock::new(config.timelock_delay_secs),
            caps,
            breaker,
            token,
            payments,
            events: EventLog::new(),
        })
    }

    // === Accessors ===

    pub fn standard_pool(&self) -> &BondPool {
        &self.standard
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn split(&self) -> AllocationSplit {
        self.split
    }

    pub fn rate(&self) -> RateState {
        self.rate
    }

    /// Mutable rate handle for the impact verification engine
    pub fn rate_mut(&mut self) -> &mut RateState {
        &mut self.rate
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn tranche(&self, id: TrancheId) -> Option<&TranchePool> {
        self.tranches.get(&id)
    }

    /// Standard-pool accrual clock for a holder (0 = no position)
    pub fn last_claim(&self, holder: &Address) -> Timestamp {
        self.claims.get(holder).copied().unwrap_or(0)
    }

    /// Sum-of-reserves invariant against actual custody
    pub fn reserves_covered(&self) -> bool {
        self.treasury.covered_by(self.payments.custodial_balance())
    }

    pub fn stats(&self) -> VaultStats {
        VaultStats {
            issued_supply: self.standard.issued_supply(),
            available_supply: self.standard.available_supply,
            effective_rate_bps: self.rate.effective_bps(),
            treasury_total: self.treasury.total(),
            custodial_balance: self.payments.custodial_balance(),
            tranche_count: self.tranches.len(),
        }
    }

    // === Standard pool lifecycle ===

    /// Buy `qty` units from the available supply.
    ///
    /// The cost splits into a coupon reservation proportional to the time
    /// remaining until maturity at the current effective rate, with the
    /// remainder divided by the configured basis-point split. The four
    /// allocations always sum to the cost exactly.
    pub fn purchase(&mut self, buyer: &Address, qty: Amount, now: Timestamp) -> Result<()> {
        self.ensure_not_paused()?;
        self.note_maturity(now);

        if qty == 0 {
            return Err(BondError::ZeroAmount);
        }
        if self.standard.is_matured(now) {
            return Err(BondError::PoolMatured);
        }
        if qty > self.standard.available_supply {
            return Err(BondError::InsufficientSupply {
                requested: qty,
                available: self.standard.available_supply,
            });
        }

        let cost = qty * self.standard.face_value;
        let remaining = (self.standard.maturity_date - now) as u64;
        let coupon_alloc = coupon_for_window(
            self.rate.effective_bps(),
            self.standard.face_value,
            qty,
            remaining,
        )
        .min(cost);
        let (principal_alloc, project_alloc, emergency_alloc) =
            self.split.apply(cost - coupon_alloc);

        // Collect first; a failed collection leaves no state behind.
        self.payments.transfer_from(buyer, cost)?;
        if let Err(e) = self.token.mint(buyer, qty) {
            // Unwind the collection; the refund cannot fail for a ledger
            // that just accepted the same amount.
            let _ = self.payments.transfer(buyer, cost);
            return Err(BondError::Payment(e));
        }

        self.credit_reserve(Reserve::Coupon, coupon_alloc);
        self.credit_reserve(Reserve::Principal, principal_alloc);
        self.credit_reserve(Reserve::Project, project_alloc);
        self.credit_reserve(Reserve::Emergency, emergency_alloc);
        self.standard.available_supply -= qty;
        self.claims.insert(*buyer, now);

        info!(buyer = %short_addr(buyer), qty, cost, coupon_alloc, "bond purchase");
        self.events.record(Event::Purchased {
            buyer: *buyer,
            qty,
            cost,
            coupon_alloc,
        });
        Ok(())
    }

    /// Pay out the coupon accrued since the holder's last claim and reset
    /// the clock. Payout is capped at the coupon reserve and at custody.
    pub fn claim_coupon(&mut self, holder: &Address, now: Timestamp) -> Result<()> {
        self.ensure_not_paused()?;
        self.note_maturity(now);

        let qty = self.token.balance_of(holder);
        let last_claim = self.last_claim(holder);
        if qty == 0 || last_claim == 0 {
            return Err(BondError::NoPosition);
        }

        let amount = accrue(
            last_claim,
            self.rate.effective_bps(),
            self.standard.face_value,
            qty,
            now,
        );
        if amount == 0 {
            return Err(BondError::NothingAccrued);
        }

        let payout = amount
            .min(self.treasury.balance(Reserve::Coupon))
            .min(self.payments.custodial_balance());
        if payout < amount {
            warn!(
                holder = %short_addr(holder),
                accrued = amount,
                payout,
                "coupon payout capped below accrual"
            );
        }
        if payout > 0 {
            self.payments.transfer(holder, payout)?;
        }
        self.debit_reserve(Reserve::Coupon, payout);
        self.claims.insert(*holder, now);

        info!(holder = %short_addr(holder), payout, "coupon claimed");
        self.events.record(Event::CouponClaimed {
            holder: *holder,
            amount: payout,
        });
        Ok(())
    }

    /// Maturity redemption: burn the full holding and pay principal plus
    /// outstanding coupon in a single transfer.
    pub fn redeem(&mut self, holder: &Address, now: Timestamp) -> Result<()> {
        self.ensure_not_paused()?;
        self.note_maturity(now);

        if !self.standard.is_matured(now) {
            return Err(BondError::NotMatured);
        }
        let qty = self.token.balance_of(holder);
        if qty == 0 {
            return Err(BondError::NoPosition);
        }

        let accrual = accrue(
            self.last_claim(holder),
            self.rate.effective_bps(),
            self.standard.face_value,
            qty,
            now,
        );
        let principal_due = qty * self.standard.face_value;
        let principal_pay = principal_due.min(self.treasury.balance(Reserve::Principal));
        let coupon_pay = accrual.min(self.treasury.balance(Reserve::Coupon));

        let custody = self.payments.custodial_balance();
        let principal_paid = principal_pay.min(custody);
        let coupon_paid = coupon_pay.min(custody - principal_paid);
        let total = principal_paid + coupon_paid;
        if total < principal_due + accrual {
            warn!(
                holder = %short_addr(holder),
                due = principal_due + accrual,
                total,
                "redemption payout capped below amount due"
            );
        }

        self.token.burn(holder, qty)?;
        if total > 0 {
            if let Err(e) = self.payments.transfer(holder, total) {
                // Restore the burned units; re-minting what was just
                // burned cannot fail.
                let _ = self.token.mint(holder, qty);
                return Err(BondError::Payment(e));
            }
        }
        self.debit_reserve(Reserve::Principal, principal_paid);
        self.debit_reserve(Reserve::Coupon, coupon_paid);
        self.standard.available_supply += qty;
        self.claims.remove(holder);

        info!(holder = %short_addr(holder), qty, total, "bond redeemed at maturity");
        self.events.record(Event::Redeemed {
            holder: *holder,
            qty,
            principal: principal_paid,
            coupon: coupon_paid,
        });
        Ok(())
    }

    /// Early redemption (standard pool only). The penalty on face value is
    /// credited to the emergency reserve, never returned to the payer.
    /// Partial redemption leaves the rest of the holding accruing from its
    /// original clock.
    pub fn redeem_early(&mut self, holder: &Address, qty: Amount, now: Timestamp) -> Result<()> {
        self.ensure_not_paused()?;
        self.note_maturity(now);

        if !self.early_redemption_enabled {
            return Err(BondError::EarlyRedemptionDisabled);
        }
        if qty == 0 {
            return Err(BondError::ZeroAmount);
        }
        let holding = self.token.balance_of(holder);
        if holding == 0 {
            return Err(BondError::NoPosition);
        }
        if qty > holding {
            return Err(BondError::InsufficientSupply {
                requested: qty,
                available: holding,
            });
        }

        let face = self.standard.face_value;
        let principal_gross = qty * face;
        let penalty = principal_gross * self.penalty_bps as Amount / BPS_DENOMINATOR as Amount;
        let accrual = accrue(
            self.last_claim(holder),
            self.rate.effective_bps(),
            face,
            qty,
            now,
        );

        let principal_ded = principal_gross.min(self.treasury.balance(Reserve::Principal));
        let coupon_ded = accrual.min(self.treasury.balance(Reserve::Coupon));
        let penalty_credit = penalty.min(principal_ded);
        let payout = (principal_ded - penalty_credit + coupon_ded)
            .min(self.payments.custodial_balance());

        self.token.burn(holder, qty)?;
        if payout > 0 {
            if let Err(e) = self.payments.transfer(holder, payout) {
                let _ = self.token.mint(holder, qty);
                return Err(BondError::Payment(e));
            }
        }
        self.debit_reserve(Reserve::Principal, principal_ded);
        self.debit_reserve(Reserve::Coupon, coupon_ded);
        self.credit_reserve(Reserve::Emergency, penalty_credit);
        self.standard.available_supply += qty;
        if qty == holding {
            self.claims.remove(holder);
        }

        info!(holder = %short_addr(holder), qty, payout, penalty = penalty_credit, "early redemption");
        self.events.record(Event::RedeemedEarly {
            holder: *holder,
            qty,
            payout,
            penalty: penalty_credit,
        });
        Ok(())
    }

    /// Hook invoked after a bond-token transfer: a recipient with no claim
    /// state starts accruing from now; the sender's clock for their
    /// remaining balance is untouched.
    pub fn on_token_transfer(&mut self, _from: &Address, to: &Address, now: Timestamp) -> Result<()> {
        self.ensure_not_paused()?;
        if self.last_claim(to) == 0 && self.token.balance_of(to) > 0 {
            self.claims.insert(*to, now);
        }
        Ok(())
    }

    // === Tranches ===

    /// Create an independently parameterized sub-pool (issuer capability)
    pub fn create_tranche(
        &mut self,
        caller: &Address,
        spec: TrancheSpec,
        now: Timestamp,
    ) -> Result<TrancheId> {
        self.ensure_not_paused()?;
        if !self.caps.has_capability(caller, Role::Issuer) {
            return Err(BondError::Unauthorized);
        }
        if spec.face_value == 0 || spec.total_supply == 0 {
            return Err(BondError::InvalidTranche("face value and supply must be non-zero"));
        }
        if spec.maturity_date <= now {
            return Err(BondError::InvalidTranche("maturity must be in the future"));
        }

        let id = self.next_tranche;
        self.next_tranche += 1;
        self.tranches.insert(id, TranchePool::new(id, spec));

        info!(tranche = id, rate_bps = spec.rate_bps, seniority = spec.seniority, "tranche created");
        self.events.record(Event::TrancheCreated {
            tranche: id,
            face_value: spec.face_value,
            rate_bps: spec.rate_bps,
            seniority: spec.seniority,
        });
        Ok(id)
    }

    /// Purchase from a tranche. Quantities are recorded locally; the cost
    /// split uses the tranche's own rate and maturity.
    pub fn purchase_tranche(
        &mut self,
        id: TrancheId,
        buyer: &Address,
        qty: Amount,
        now: Timestamp,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        self.note_maturity(now);
        if qty == 0 {
            return Err(BondError::ZeroAmount);
        }

        let tranche = self
            .tranches
            .get_mut(&id)
            .ok_or(BondError::UnknownTranche(id))?;
        if tranche.is_matured(now) {
            return Err(BondError::PoolMatured);
        }
        if qty > tranche.available_supply {
            return Err(BondError::InsufficientSupply {
                requested: qty,
                available: tranche.available_supply,
            });
        }

        let cost = qty * tranche.face_value;
        let remaining = (tranche.maturity_date - now) as u64;
        let coupon_alloc =
            coupon_for_window(tranche.rate_bps, tranche.face_value, qty, remaining).min(cost);
        let (principal_alloc, project_alloc, emergency_alloc) =
            self.split.apply(cost - coupon_alloc);

        self.payments.transfer_from(buyer, cost)?;

        tranche.record_purchase(buyer, qty, now);
        self.credit_reserve(Reserve::Coupon, coupon_alloc);
        self.credit_reserve(Reserve::Principal, principal_alloc);
        self.credit_reserve(Reserve::Project, project_alloc);
        self.credit_reserve(Reserve::Emergency, emergency_alloc);

        info!(tranche = id, buyer = %short_addr(buyer), qty, cost, "tranche purchase");
        self.events.record(Event::TranchePurchased {
            tranche: id,
            buyer: *buyer,
            qty,
            cost,
        });
        Ok(())
    }

    /// Claim the coupon accrued on a tranche position
    pub fn claim_tranche_coupon(
        &mut self,
        id: TrancheId,
        holder: &Address,
        now: Timestamp,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        self.note_maturity(now);

        let tranche = self
            .tranches
            .get_mut(&id)
            .ok_or(BondError::UnknownTranche(id))?;
        let HolderPosition {
            quantity,
            last_claim_time,
        } = tranche.position(holder);
        if quantity == 0 || last_claim_time == 0 {
            return Err(BondError::NoPosition);
        }

        let amount = accrue(last_claim_time, tranche.rate_bps, tranche.face_value, quantity, now);
        if amount == 0 {
            return Err(BondError::NothingAccrued);
        }

        let payout = amount
            .min(self.treasury.balance(Reserve::Coupon))
            .min(self.payments.custodial_balance());
        if payout > 0 {
            self.payments.transfer(holder, payout)?;
        }
        tranche.touch_claim(holder, now);
        self.debit_reserve(Reserve::Coupon, payout);

        info!(tranche = id, holder = %short_addr(holder), payout, "tranche coupon claimed");
        self.events.record(Event::TrancheCouponClaimed {
            tranche: id,
            holder: *holder,
            amount: payout,
        });
        Ok(())
    }

    /// Maturity redemption of a full tranche position
    pub fn redeem_tranche(&mut self, id: TrancheId, holder: &Address, now: Timestamp) -> Result<()> {
        self.ensure_not_paused()?;
        self.note_maturity(now);

        let tranche = self
            .tranches
            .get_mut(&id)
            .ok_or(BondError::UnknownTranche(id))?;
        if !tranche.is_matured(now) {
            return Err(BondError::NotMatured);
        }
        let HolderPosition {
            quantity,
            last_claim_time,
        } = tranche.position(holder);
        if quantity == 0 {
            return Err(BondError::NoPosition);
        }

        let accrual = accrue(last_claim_time, tranche.rate_bps, tranche.face_value, quantity, now);
        let principal_due = quantity * tranche.face_value;
        let principal_pay = principal_due.min(self.treasury.balance(Reserve::Principal));
        let coupon_pay = accrual.min(self.treasury.balance(Reserve::Coupon));

        let custody = self.payments.custodial_balance();
        let principal_paid = principal_pay.min(custody);
        let coupon_paid = coupon_pay.min(custody - principal_paid);
        let total = principal_paid + coupon_paid;

        if total > 0 {
            self.payments.transfer(holder, total)?;
        }
        tranche.available_supply += quantity;
        tranche.clear_position(holder);
        self.debit_reserve(Reserve::Principal, principal_paid);
        self.debit_reserve(Reserve::Coupon, coupon_paid);

        info!(tranche = id, holder = %short_addr(holder), qty = quantity, total, "tranche redeemed");
        self.events.record(Event::TrancheRedeemed {
            tranche: id,
            holder: *holder,
            qty: quantity,
            payout: total,
        });
        Ok(())
    }

    // === Issuer controls ===

    /// Enable or disable the early-redemption path and set its penalty
    pub fn set_early_redemption(
        &mut self,
        caller: &Address,
        enabled: bool,
        penalty_bps: Bps,
    ) -> Result<()> {
        if !self.caps.has_capability(caller, Role::Issuer) {
            return Err(BondError::Unauthorized);
        }
        self.configure_early_redemption(enabled, penalty_bps)
    }

    /// Apply the early-redemption settings without a capability check.
    /// Used by governance execution, where the vote carries the authority.
    pub fn configure_early_redemption(&mut self, enabled: bool, penalty_bps: Bps) -> Result<()> {
        self.ensure_not_paused()?;
        self.early_redemption_enabled = enabled;
        self.penalty_bps = penalty_bps;
        info!(enabled, penalty_bps, "early redemption toggled");
        Ok(())
    }

    // === Timelocked admin surface ===

    /// Capability-checked admin entry point. First call schedules the
    /// operation; a later call with identical parameters, after the delay,
    /// performs it.
    pub fn admin(&mut self, caller: &Address, op: AdminOp, now: Timestamp) -> Result<Gate> {
        if !self.caps.has_capability(caller, Role::Admin) {
            return Err(BondError::Unauthorized);
        }
        self.apply_admin(op, now)
    }

    /// Timelock-gated application without a capability check. Used by
    /// governance execution, where authority was established by the vote.
    pub fn apply_admin(&mut self, op: AdminOp, now: Timestamp) -> Result<Gate> {
        // Emergency withdrawal is the designed recovery path and must stay
        // available while paused; everything else rejects.
        if !matches!(op, AdminOp::EmergencyWithdraw { .. }) {
            self.ensure_not_paused()?;
        }
        op.validate()?;

        let fingerprint = OpFingerprint::derive(op.kind(), &op.param_bytes());
        let gate = self
            .timelock
            .check_and_schedule(op.kind(), &op.param_bytes(), now)?;
        let op_id = self.timelock.op_id(&fingerprint).unwrap_or_default();

        match gate {
            Gate::Pending { ready_at } => {
                self.events.record(Event::OperationScheduled { op_id, ready_at });
            }
            Gate::Proceed => {
                if let Err(e) = self.perform_admin(&op) {
                    // The mutation never took effect; hand the gate back
                    // so the identical operation stays retryable.
                    self.timelock.reopen(&fingerprint);
                    return Err(e);
                }
                self.events.record(Event::OperationExecuted { op_id });
            }
        }
        Ok(gate)
    }

    /// Apply an already-validated, timelock-cleared operation
    fn perform_admin(&mut self, op: &AdminOp) -> Result<()> {
        match *op {
            AdminOp::SetRateBounds { base_bps, max_bps } => {
                self.rate.set_bounds(base_bps, max_bps);
                info!(base_bps, max_bps, effective = self.rate.effective_bps(), "rate bounds updated");
                self.events.record(Event::RateUpdated {
                    effective_bps: self.rate.effective_bps(),
                });
            }
            AdminOp::SetAllocationSplit { split } => {
                self.split = split;
                info!(?split, "allocation split updated");
            }
            AdminOp::EmergencyWithdraw { to, amount } => {
                let payout = amount
                    .min(self.treasury.balance(Reserve::Emergency))
                    .min(self.payments.custodial_balance());
                // Transfer first: a refused payout must leave the reserve
                // untouched.
                if payout > 0 {
                    self.payments.transfer(&to, payout)?;
                }
                self.debit_reserve(Reserve::Emergency, payout);
                warn!(to = %short_addr(&to), requested = amount, payout, "emergency withdrawal");
                self.events.record(Event::EmergencyWithdrawal { to, amount: payout });
            }
        }
        Ok(())
    }

    // === Internal ===

    /// Move funds into a reserve and announce it
    fn credit_reserve(&mut self, reserve: Reserve, amount: Amount) {
        if amount == 0 {
            return;
        }
        self.treasury.allocate(reserve, amount);
        self.events.record(Event::TreasuryAllocated { reserve, amount });
    }

    /// Draw from a reserve, flooring at its balance, and announce both the
    /// requested and the actually-deducted amount
    fn debit_reserve(&mut self, reserve: Reserve, requested: Amount) -> Amount {
        if requested == 0 {
            return 0;
        }
        let deducted = self.treasury.deduct(reserve, requested);
        self.events.record(Event::TreasuryDeducted {
            reserve,
            requested,
            deducted,
        });
        deducted
    }

    fn ensure_not_paused(&self) -> Result<()> {
        if self.breaker.is_paused() {
            return Err(BondError::Paused);
        }
        Ok(())
    }

    /// One-shot maturity announcement: fires the first time any lifecycle
    /// operation observes `now >= maturity_date`, never twice.
    fn note_maturity(&mut self, now: Timestamp) {
        if !self.matured_fired && self.standard.is_matured(now) {
            self.matured_fired = true;
            info!(at = now, "standard pool matured");
            self.events.record(Event::Matured { at: now });
        }
    }
}
