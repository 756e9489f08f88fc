//! # verdant-impact
//!
//! Threshold-consensus verification of environmental impact reports.
//!
//! Issuers post reports describing realized project impact; independent
//! verifiers attest to them. When a report collects the configured number
//! of distinct attestations it finalizes and earns the issuance a green
//! premium: the global coupon rate steps up by a fixed increment, capped
//! at the issuance maximum. Any verifier may instead challenge a pending
//! report, which voids the attestations collected so far and extends the
//! verification deadline.

pub mod error;
pub mod registry;
pub mod report;

pub use error::{ImpactError, Result};
pub use registry::ImpactRegistry;
pub use report::{ImpactReport, ReportStatus};
