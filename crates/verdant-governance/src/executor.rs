//! Proposal execution seam
//!
//! The engine hands a passed proposal's action to a `ProposalTarget`. The
//! trait returns the timelock gate so the engine can report whether the
//! action landed immediately or was merely scheduled; failures come back as
//! a message and surface as `ExecutionFailed` on the proposal.

use crate::proposal::ProposalAction;
use verdant_bond::{AdminOp, BondVault};
use verdant_core::timelock::Gate;
use verdant_core::types::Timestamp;

/// Anything a passed proposal can mutate
pub trait ProposalTarget {
    fn apply(&mut self, action: &ProposalAction, now: Timestamp) -> Result<Gate, String>;
}

impl ProposalTarget for BondVault {
    fn apply(&mut self, action: &ProposalAction, now: Timestamp) -> Result<Gate, String> {
        match *action {
            ProposalAction::SetRateBounds { base_bps, max_bps } => self
                .apply_admin(AdminOp::SetRateBounds { base_bps, max_bps }, now)
                .map_err(|e| e.to_string()),
            ProposalAction::SetAllocationSplit { split } => self
                .apply_admin(AdminOp::SetAllocationSplit { split }, now)
                .map_err(|e| e.to_string()),
            ProposalAction::EmergencyWithdraw { to, amount } => self
                .apply_admin(AdminOp::EmergencyWithdraw { to, amount }, now)
                .map_err(|e| e.to_string()),
            ProposalAction::SetEarlyRedemption {
                enabled,
                penalty_bps,
            } => self
                .configure_early_redemption(enabled, penalty_bps)
                .map(|_| Gate::Proceed)
                .map_err(|e| e.to_string()),
            // Routed to the governance engine before the target is reached
            ProposalAction::SetGovernanceParams { .. } => {
                Err("governance parameters are not a vault action".into())
            }
        }
    }
}
