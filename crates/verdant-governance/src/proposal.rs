//! Proposals and their stored actions

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use verdant_core::types::{Address, Amount, Bps, ProposalId, Timestamp};
use verdant_treasury::AllocationSplit;

/// The mutation a passed proposal performs. Serializable so its byte
/// encoding can feed a timelock fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalAction {
    SetRateBounds {
        base_bps: Bps,
        max_bps: Bps,
    },
    SetAllocationSplit {
        split: AllocationSplit,
    },
    SetEarlyRedemption {
        enabled: bool,
        penalty_bps: Bps,
    },
    EmergencyWithdraw {
        to: Address,
        amount: Amount,
    },
    /// Applies to the governance engine itself, through its own timelock
    SetGovernanceParams {
        quorum: Amount,
        voting_period_secs: i64,
    },
}

/// Terminal resolution of a proposal (every variant but `Open` is final)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Open,
    Executed,
    QuorumFailed,
    Rejected,
    ExecutionFailed,
}

/// One governance proposal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub description: String,
    pub action: ProposalAction,
    pub vote_start: Timestamp,
    pub vote_end: Timestamp,
    pub for_votes: Amount,
    pub against_votes: Amount,
    pub status: ProposalStatus,
    pub(crate) voters: HashSet<Address>,
}

impl Proposal {
    pub(crate) fn new(
        id: ProposalId,
        proposer: Address,
        description: String,
        action: ProposalAction,
        vote_start: Timestamp,
        vote_end: Timestamp,
    ) -> Self {
        Self {
            id,
            proposer,
            description,
            action,
            vote_start,
            vote_end,
            for_votes: 0,
            against_votes: 0,
            status: ProposalStatus::Open,
            voters: HashSet::new(),
        }
    }

    pub fn voting_open(&self, now: Timestamp) -> bool {
        now >= self.vote_start && now <= self.vote_end
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    pub fn votes_cast(&self) -> Amount {
        self.for_votes + self.against_votes
    }

    pub fn is_resolved(&self) -> bool {
        self.status != ProposalStatus::Open
    }
}
