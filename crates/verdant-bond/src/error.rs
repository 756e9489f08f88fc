//! Bond lifecycle error types

use thiserror::Error;
use verdant_core::collab::CollabError;
use verdant_core::timelock::TimelockError;
use verdant_core::types::{Amount, Bps, TrancheId};
use verdant_treasury::TreasuryError;

/// Result type alias for bond operations
pub type Result<T> = std::result::Result<T, BondError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BondError {
    // === Validation ===
    /// Quantity or amount must be non-zero
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Not enough unissued supply
    #[error("insufficient supply: requested {requested}, available {available}")]
    InsufficientSupply { requested: Amount, available: Amount },

    /// Tranche id does not exist
    #[error("unknown tranche: {0}")]
    UnknownTranche(TrancheId),

    /// Tranche parameters out of range
    #[error("invalid tranche parameters: {0}")]
    InvalidTranche(&'static str),

    /// Base rate must not exceed the maximum rate
    #[error("invalid rate bounds: base {base_bps} bps exceeds max {max_bps} bps")]
    InvalidRateBounds { base_bps: Bps, max_bps: Bps },

    // === State preconditions ===
    /// Purchase attempted after maturity
    #[error("pool has matured")]
    PoolMatured,

    /// Maturity redemption attempted before maturity
    #[error("pool has not matured yet")]
    NotMatured,

    /// Caller holds no bonds in this pool
    #[error("no position held")]
    NoPosition,

    /// Accrual computed to zero - nothing to pay
    #[error("no coupon accrued")]
    NothingAccrued,

    /// Issuer has not enabled the early-redemption path
    #[error("early redemption is disabled")]
    EarlyRedemptionDisabled,

    // === Authorization ===
    /// Circuit breaker is engaged
    #[error("protocol is paused")]
    Paused,

    /// Caller lacks the required capability
    #[error("caller lacks required capability")]
    Unauthorized,

    // === Delegated ===
    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error(transparent)]
    Timelock(#[from] TimelockError),

    /// External transfer failed - the whole operation was rejected
    #[error("payment collaborator failed: {0}")]
    Payment(#[from] CollabError),
}
