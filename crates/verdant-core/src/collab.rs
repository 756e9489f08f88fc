//! External collaborator interfaces
//!
//! The core never reimplements role checking, pause gating, or token
//! accounting - it invokes them through these seams. Each trait takes
//! `&self`; implementations are expected to manage their own interior
//! mutability so a single collaborator handle can be shared across
//! components.
//!
//! In-memory reference adapters are provided for wiring tests and local
//! deployments. They are not consensus-grade ledgers - real deployments
//! substitute the chain-native implementations.

use crate::types::{Address, Amount};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors surfaced by collaborator calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollabError {
    /// Token or payment balance too low for the requested movement
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// Transfer refused by the external ledger
    #[error("transfer rejected by external ledger: {0}")]
    TransferRejected(String),
}

/// Result alias for collaborator calls
pub type Result<T> = std::result::Result<T, CollabError>;

/// Privileged roles consulted before protected operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May create impact reports, tranches, and toggle early redemption
    Issuer,
    /// May attest to and challenge impact reports
    Verifier,
    /// May drive timelocked admin operations
    Admin,
}

/// Capability collaborator: "does caller hold permission P"
pub trait CapabilityOracle: Send + Sync {
    fn has_capability(&self, caller: &Address, role: Role) -> bool;
}

/// Circuit-breaker collaborator gating all mutating entry points
pub trait CircuitBreaker: Send + Sync {
    fn is_paused(&self) -> bool;
}

/// Fungible-token ledger recording bond ownership for the standard pool
pub trait BondTokenLedger: Send + Sync {
    fn mint(&self, holder: &Address, qty: Amount) -> Result<()>;
    fn burn(&self, holder: &Address, qty: Amount) -> Result<()>;
    fn balance_of(&self, holder: &Address) -> Amount;
    fn transfer(&self, from: &Address, to: &Address, qty: Amount) -> Result<()>;
}

/// Payment-asset ledger holding the protocol's custodial funds
pub trait PaymentLedger: Send + Sync {
    /// Balance held by the protocol itself - every outbound payout is
    /// capped at this value before the transfer is attempted
    fn custodial_balance(&self) -> Amount;

    /// Pay out from custody to a holder
    fn transfer(&self, to: &Address, amount: Amount) -> Result<()>;

    /// Pull purchase cost from a buyer into custody
    fn transfer_from(&self, from: &Address, amount: Amount) -> Result<()>;
}

// === In-memory reference adapters ===

/// Fixed role table
#[derive(Default)]
pub struct StaticCapabilities {
    grants: RwLock<HashMap<Address, HashSet<Role>>>,
}

impl StaticCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, who: Address, role: Role) {
        self.grants.write().entry(who).or_default().insert(role);
    }

    pub fn revoke(&self, who: &Address, role: Role) {
        if let Some(roles) = self.grants.write().get_mut(who) {
            roles.remove(&role);
        }
    }
}

impl CapabilityOracle for StaticCapabilities {
    fn has_capability(&self, caller: &Address, role: Role) -> bool {
        self.grants
            .read()
            .get(caller)
            .map(|roles| roles.contains(&role))
            .unwrap_or(false)
    }
}

/// Toggleable pause flag
#[derive(Default)]
pub struct PauseSwitch {
    paused: AtomicBool,
}

impl PauseSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }
}

impl CircuitBreaker for PauseSwitch {
    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// Simple mint/burn/transfer ledger over a balance map
#[derive(Default)]
pub struct InMemoryTokenLedger {
    balances: RwLock<HashMap<Address, Amount>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_outstanding(&self) -> Amount {
        self.balances.read().values().sum()
    }
}

impl BondTokenLedger for InMemoryTokenLedger {
    fn mint(&self, holder: &Address, qty: Amount) -> Result<()> {
        let mut balances = self.balances.write();
        *balances.entry(*holder).or_insert(0) += qty;
        Ok(())
    }

    fn burn(&self, holder: &Address, qty: Amount) -> Result<()> {
        let mut balances = self.balances.write();
        let balance = balances.entry(*holder).or_insert(0);
        if *balance < qty {
            return Err(CollabError::InsufficientBalance {
                needed: qty,
                available: *balance,
            });
        }
        *balance -= qty;
        Ok(())
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.read().get(holder).copied().unwrap_or(0)
    }

    fn transfer(&self, from: &Address, to: &Address, qty: Amount) -> Result<()> {
        let mut balances = self.balances.write();
        let from_balance = balances.get(from).copied().unwrap_or(0);
        if from_balance < qty {
            return Err(CollabError::InsufficientBalance {
                needed: qty,
                available: from_balance,
            });
        }
        balances.insert(*from, from_balance - qty);
        *balances.entry(*to).or_insert(0) += qty;
        Ok(())
    }
}

/// Payment-asset ledger with an explicit custody account
pub struct InMemoryPaymentLedger {
    balances: RwLock<HashMap<Address, Amount>>,
    custody: Address,
}

impl InMemoryPaymentLedger {
    pub fn new(custody: Address) -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            custody,
        }
    }

    /// Fund any account directly (test/bootstrap helper)
    pub fn credit(&self, who: &Address, amount: Amount) {
        *self.balances.write().entry(*who).or_insert(0) += amount;
    }

    pub fn balance_of(&self, who: &Address) -> Amount {
        self.balances.read().get(who).copied().unwrap_or(0)
    }

    fn move_funds(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut balances = self.balances.write();
        let from_balance = balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(CollabError::InsufficientBalance {
                needed: amount,
                available: from_balance,
            });
        }
        balances.insert(*from, from_balance - amount);
        *balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

impl PaymentLedger for InMemoryPaymentLedger {
    fn custodial_balance(&self) -> Amount {
        self.balance_of(&self.custody)
    }

    fn transfer(&self, to: &Address, amount: Amount) -> Result<()> {
        let custody = self.custody;
        self.move_funds(&custody, to, amount)
    }

    fn transfer_from(&self, from: &Address, amount: Amount) -> Result<()> {
        let custody = self.custody;
        self.move_funds(from, &custody, amount)
    }
}
