//! Core type definitions for the Verdant protocol
//!
//! Amounts are `u128` in the payment asset's smallest unit. Rates are
//! expressed in basis points (1 bps = 1/100 of a percent). Timestamps are
//! unix seconds supplied by the caller's clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account address (32 raw bytes, ledger-agnostic)
pub type Address = [u8; 32];

/// Monetary amount in the payment asset's smallest unit
pub type Amount = u128;

/// Rate or share expressed in basis points
pub type Bps = u64;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Basis-point denominator: 10,000 bps = 100%
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Seconds per year for interest accrual: fixed 365-day year, no
/// leap-year adjustment. Changing this changes observable payouts.
pub const SECONDS_PER_YEAR: u64 = 365 * 86_400;

/// Rate premium step applied when an impact report finalizes (50 bps)
pub const GREEN_STEP_BPS: Bps = 50;

/// Deadline extension granted to a challenged impact report (7 days)
pub const CHALLENGE_EXTENSION_SECS: i64 = 7 * 86_400;

/// Tranche identifier (assigned sequentially by the vault)
pub type TrancheId = u64;

/// Impact report identifier
pub type ReportId = u64;

/// Governance proposal identifier
pub type ProposalId = u64;

/// Render an address as a short hex prefix for logs
pub fn short_addr(addr: &Address) -> String {
    hex::encode(&addr[..4])
}

/// Reserve selector for the multi-reserve treasury
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reserve {
    /// Backs principal repayment at maturity
    Principal,
    /// Backs periodic coupon payments
    Coupon,
    /// Funds the external green project
    Project,
    /// Buffer for shortfalls; receives early-redemption penalties
    Emergency,
}

impl Reserve {
    /// All reserves, in canonical order
    pub const ALL: [Reserve; 4] = [
        Reserve::Principal,
        Reserve::Coupon,
        Reserve::Project,
        Reserve::Emergency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Reserve::Principal => "principal",
            Reserve::Coupon => "coupon",
            Reserve::Project => "project",
            Reserve::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Reserve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
