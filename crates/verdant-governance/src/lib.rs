//! # verdant-governance
//!
//! Token-weighted governance over the bond issuance.
//!
//! Token holders propose parameter changes, vote with their live bond-token
//! balance, and execute passed proposals against the vault. Quorum and
//! majority are both required; each proposal admits exactly one execution
//! attempt after its voting window closes. Actions routed at timelocked
//! setters are merely *scheduled* by that execution - the mutation lands
//! when an admin re-posts the identical operation after the delay.

pub mod engine;
pub mod error;
pub mod executor;
pub mod proposal;

pub use engine::{GovernanceConfig, GovernanceEngine};
pub use error::{GovernanceError, Result};
pub use executor::ProposalTarget;
pub use proposal::{Proposal, ProposalAction, ProposalStatus};
