//! Bond pools and holder positions
//!
//! The standard pool defers ownership quantities to the external bond-token
//! ledger and keeps only last-claim clocks locally. Tranche pools are
//! self-contained: each carries its own risk parameters and records both
//! quantity and clock per holder.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use verdant_core::types::{Address, Amount, Bps, Timestamp, TrancheId};

/// Per-holder record: units held and the accrual clock.
///
/// `last_claim_time == 0` means the holder has never purchased or has fully
/// redeemed; any non-zero value is a real timestamp at or before now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderPosition {
    pub quantity: Amount,
    pub last_claim_time: Timestamp,
}

/// The standard issuance pool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BondPool {
    pub face_value: Amount,
    pub total_supply: Amount,
    pub available_supply: Amount,
    pub maturity_date: Timestamp,
}

impl BondPool {
    pub fn new(face_value: Amount, total_supply: Amount, maturity_date: Timestamp) -> Self {
        Self {
            face_value,
            total_supply,
            available_supply: total_supply,
            maturity_date,
        }
    }

    /// Units already issued (derived, never stored separately)
    pub fn issued_supply(&self) -> Amount {
        self.total_supply - self.available_supply
    }

    pub fn is_matured(&self, now: Timestamp) -> bool {
        now >= self.maturity_date
    }
}

/// Parameters for creating a tranche
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrancheSpec {
    pub face_value: Amount,
    pub rate_bps: Bps,
    pub total_supply: Amount,
    pub maturity_date: Timestamp,
    /// Lower rank is more senior
    pub seniority: u8,
}

/// An independently parameterized sub-pool with local position records
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranchePool {
    pub id: TrancheId,
    pub face_value: Amount,
    pub rate_bps: Bps,
    pub total_supply: Amount,
    pub available_supply: Amount,
    pub maturity_date: Timestamp,
    pub seniority: u8,
    positions: HashMap<Address, HolderPosition>,
}

impl TranchePool {
    pub fn new(id: TrancheId, spec: TrancheSpec) -> Self {
        Self {
            id,
            face_value: spec.face_value,
            rate_bps: spec.rate_bps,
            total_supply: spec.total_supply,
            available_supply: spec.total_supply,
            maturity_date: spec.maturity_date,
            seniority: spec.seniority,
            positions: HashMap::new(),
        }
    }

    pub fn issued_supply(&self) -> Amount {
        self.total_supply - self.available_supply
    }

    pub fn is_matured(&self, now: Timestamp) -> bool {
        now >= self.maturity_date
    }

    pub fn position(&self, holder: &Address) -> HolderPosition {
        self.positions.get(holder).copied().unwrap_or_default()
    }

    /// Record a purchase: add units and reset the accrual clock
    pub fn record_purchase(&mut self, holder: &Address, qty: Amount, now: Timestamp) {
        let position = self.positions.entry(*holder).or_default();
        position.quantity += qty;
        position.last_claim_time = now;
        self.available_supply -= qty;
    }

    /// Reset the accrual clock after a coupon payout
    pub fn touch_claim(&mut self, holder: &Address, now: Timestamp) {
        if let Some(position) = self.positions.get_mut(holder) {
            position.last_claim_time = now;
        }
    }

    /// Zero out a fully redeemed position
    pub fn clear_position(&mut self, holder: &Address) {
        self.positions.remove(holder);
    }
}
