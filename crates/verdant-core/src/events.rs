//! Observable audit events
//!
//! Each component appends the events it commits to an owned `EventLog`.
//! The log is append-only and serializable, so an indexer can replay the
//! full state-change history.

use crate::types::{Address, Amount, Bps, ProposalId, ReportId, Reserve, Timestamp, TrancheId};
use serde::{Deserialize, Serialize};

/// Everything the protocol announces about its state changes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    // === Bond lifecycle ===
    Purchased {
        buyer: Address,
        qty: Amount,
        cost: Amount,
        coupon_alloc: Amount,
    },
    CouponClaimed {
        holder: Address,
        amount: Amount,
    },
    Redeemed {
        holder: Address,
        qty: Amount,
        principal: Amount,
        coupon: Amount,
    },
    RedeemedEarly {
        holder: Address,
        qty: Amount,
        payout: Amount,
        penalty: Amount,
    },
    Matured {
        at: Timestamp,
    },

    // === Tranches ===
    TrancheCreated {
        tranche: TrancheId,
        face_value: Amount,
        rate_bps: Bps,
        seniority: u8,
    },
    TranchePurchased {
        tranche: TrancheId,
        buyer: Address,
        qty: Amount,
        cost: Amount,
    },
    TrancheCouponClaimed {
        tranche: TrancheId,
        holder: Address,
        amount: Amount,
    },
    TrancheRedeemed {
        tranche: TrancheId,
        holder: Address,
        qty: Amount,
        payout: Amount,
    },

    // === Impact verification ===
    ReportAdded {
        report: ReportId,
        uri: String,
    },
    ReportVerified {
        report: ReportId,
        verifier: Address,
        count: u32,
    },
    ReportChallenged {
        report: ReportId,
        challenger: Address,
        new_deadline: Timestamp,
    },
    ReportFinalized {
        report: ReportId,
    },
    RateUpdated {
        effective_bps: Bps,
    },

    // === Governance ===
    ProposalCreated {
        proposal: ProposalId,
        proposer: Address,
        vote_end: Timestamp,
    },
    VoteCast {
        proposal: ProposalId,
        voter: Address,
        support: bool,
        weight: Amount,
    },
    ProposalExecuted {
        proposal: ProposalId,
    },

    // === Timelock ===
    OperationScheduled {
        op_id: String,
        ready_at: Timestamp,
    },
    OperationExecuted {
        op_id: String,
    },

    // === Treasury ===
    TreasuryAllocated {
        reserve: Reserve,
        amount: Amount,
    },
    TreasuryDeducted {
        reserve: Reserve,
        requested: Amount,
        deducted: Amount,
    },
    EmergencyWithdrawal {
        to: Address,
        amount: Amount,
    },
}

/// Append-only event journal
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: Event) {
        self.entries.push(event);
    }

    pub fn entries(&self) -> &[Event] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count events matching a predicate (test helper for one-shot events)
    pub fn count_matching(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(e)).count()
    }
}
