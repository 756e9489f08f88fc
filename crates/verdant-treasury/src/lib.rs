//! # Verdant Treasury
//!
//! Multi-reserve ledger backing the bond lifecycle. Four named reserves
//! (principal, coupon, project, emergency) are each mutated only through
//! the allocate/deduct primitives.
//!
//! ## Deduction policy
//!
//! `deduct` never fails and never underflows: it caps at the available
//! reserve balance and reports the amount actually deducted. Payout paths
//! must still pay out whatever they can, so availability wins over strict
//! accounting here. Callers needing strict semantics check preconditions
//! before calling.
//!
//! ## Invariant
//!
//! The sum of all reserves never exceeds the custodial balance of the
//! external payment asset (equality is expected absent manual transfers).
//! `Treasury::covered_by` checks it.

pub mod error;
pub mod reserves;

pub use error::{Result, TreasuryError};
pub use reserves::{AllocationSplit, Treasury};

pub use verdant_core::types::Reserve;
