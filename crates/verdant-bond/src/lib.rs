//! # Verdant Bond
//!
//! The bond lifecycle engine: issuance pools, time-proportional coupon
//! accrual, maturity and early redemption, tranche sub-pools, and the
//! timelocked admin surface.
//!
//! ## Lifecycle
//!
//! ```text
//!   available ──purchase──► issued (accruing) ──redeem──► redeemed
//!                              │        ▲
//!                              └─claim──┘  (coupon, resets clock)
//! ```
//!
//! The vault owns the global rate state (base rate + green premium) and the
//! treasury; the impact engine raises the premium as reports finalize, and
//! every purchase/claim/redemption reads the effective rate by value at the
//! moment of the call.

pub mod error;
pub mod interest;
pub mod pool;
pub mod rate;
pub mod vault;

pub use error::{BondError, Result};
pub use interest::{accrue, coupon_for_window};
pub use pool::{BondPool, HolderPosition, TranchePool, TrancheSpec};
pub use rate::RateState;
pub use vault::{AdminOp, BondConfig, BondVault, VaultStats};
