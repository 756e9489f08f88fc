//! Proposal lifecycle engine
//!
//! Voting weight is the voter's live bond-token balance at the moment the
//! vote is cast - there is no snapshot. A later balance change does not
//! retroactively adjust an already-cast weight.
//!
//! Execution is a single valid attempt per proposal, only after the window
//! closes. Quorum failure, majority failure, and payload failure are three
//! distinct terminal outcomes; only the quorum and majority checks happen
//! inside the engine, the payload runs against the supplied target.

use crate::error::{GovernanceError, Result};
use crate::executor::ProposalTarget;
use crate::proposal::{Proposal, ProposalAction, ProposalStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use verdant_core::collab::{BondTokenLedger, CapabilityOracle, CircuitBreaker, Role};
use verdant_core::events::{Event, EventLog};
use verdant_core::timelock::{Gate, OpFingerprint, Timelock};
use verdant_core::types::{short_addr, Address, Amount, ProposalId, Timestamp};

/// Engine parameters, themselves changeable only by a timelocked proposal
#[derive(Clone, Copy, Debug)]
pub struct GovernanceConfig {
    /// Minimum total weight (for + against) for a proposal to be decidable
    pub quorum: Amount,
    pub voting_period_secs: i64,
    /// Delay on `SetGovernanceParams`
    pub timelock_delay_secs: i64,
}

pub struct GovernanceEngine {
    quorum: Amount,
    voting_period_secs: i64,
    proposals: HashMap<ProposalId, Proposal>,
    next_id: ProposalId,
    timelock: Timelock,
    token: Arc<dyn BondTokenLedger>,
    caps: Arc<dyn CapabilityOracle>,
    breaker: Arc<dyn CircuitBreaker>,
    events: EventLog,
}

impl GovernanceEngine {
    pub fn new(
        config: GovernanceConfig,
        token: Arc<dyn BondTokenLedger>,
        caps: Arc<dyn CapabilityOracle>,
        breaker: Arc<dyn CircuitBreaker>,
    ) -> Self {
        Self {
            quorum: config.quorum,
            voting_period_secs: config.voting_period_secs,
            proposals: HashMap::new(),
            next_id: 1,
            timelock: Timelock::new(config.timelock_delay_secs),
            token,
            caps,
            breaker,
            events: EventLog::new(),
        }
    }

    pub fn quorum(&self) -> Amount {
        self.quorum
    }

    pub fn voting_period_secs(&self) -> i64 {
        self.voting_period_secs
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Open a proposal for voting until `now + voting_period`
    pub fn create_proposal(
        &mut self,
        proposer: &Address,
        description: String,
        action: ProposalAction,
        now: Timestamp,
    ) -> Result<ProposalId> {
        self.ensure_not_paused()?;
        if description.is_empty() {
            return Err(GovernanceError::EmptyDescription);
        }

        let id = self.next_id;
        self.next_id += 1;
        let vote_end = now + self.voting_period_secs;
        self.proposals.insert(
            id,
            Proposal::new(id, *proposer, description, action, now, vote_end),
        );

        info!(proposal = id, proposer = %short_addr(proposer), vote_end, "proposal created");
        self.events.record(Event::ProposalCreated {
            proposal: id,
            proposer: *proposer,
            vote_end,
        });
        Ok(id)
    }

    /// Cast a vote weighted by the voter's current bond-token balance
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        id: ProposalId,
        support: bool,
        now: Timestamp,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        let weight = self.token.balance_of(voter);

        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        if proposal.is_resolved() {
            return Err(GovernanceError::AlreadyResolved);
        }
        if !proposal.voting_open(now) {
            return Err(GovernanceError::VotingClosed {
                vote_end: proposal.vote_end,
            });
        }
        if proposal.has_voted(voter) {
            return Err(GovernanceError::AlreadyVoted);
        }
        if weight == 0 {
            return Err(GovernanceError::ZeroVotingWeight);
        }

        proposal.voters.insert(*voter);
        if support {
            proposal.for_votes += weight;
        } else {
            proposal.against_votes += weight;
        }

        info!(proposal = id, voter = %short_addr(voter), support, weight, "vote cast");
        self.events.record(Event::VoteCast {
            proposal: id,
            voter: *voter,
            support,
            weight,
        });
        Ok(())
    }

    /// Resolve a proposal after its window closes: exactly one attempt.
    ///
    /// Quorum and majority must both hold; a failing attempt terminally
    /// rejects the proposal. On success the stored action runs once -
    /// against the engine's own timelock for `SetGovernanceParams`, against
    /// `target` for everything else. An action routed at a timelocked
    /// setter only *schedules* here; the proposal is still marked executed,
    /// and an admin completes the operation after the delay.
    pub fn execute(
        &mut self,
        id: ProposalId,
        target: &mut dyn ProposalTarget,
        now: Timestamp,
    ) -> Result<Gate> {
        self.ensure_not_paused()?;

        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        if proposal.is_resolved() {
            return Err(GovernanceError::AlreadyResolved);
        }
        if now <= proposal.vote_end {
            return Err(GovernanceError::VotingStillOpen {
                vote_end: proposal.vote_end,
            });
        }

        let cast = proposal.votes_cast();
        if cast < self.quorum {
            proposal.status = ProposalStatus::QuorumFailed;
            warn!(proposal = id, cast, quorum = self.quorum, "proposal failed quorum");
            return Err(GovernanceError::QuorumNotReached {
                cast,
                quorum: self.quorum,
            });
        }
        if proposal.for_votes <= proposal.against_votes {
            proposal.status = ProposalStatus::Rejected;
            warn!(
                proposal = id,
                for_votes = proposal.for_votes,
                against_votes = proposal.against_votes,
                "proposal rejected by vote"
            );
            return Err(GovernanceError::Rejected {
                for_votes: proposal.for_votes,
                against_votes: proposal.against_votes,
            });
        }

        let action = proposal.action;
        let gate = match action {
            ProposalAction::SetGovernanceParams {
                quorum,
                voting_period_secs,
            } => self.schedule_params(quorum, voting_period_secs, now),
            other => target.apply(&other, now).map_err(GovernanceError::ExecutionFailed),
        };

        // Re-borrow: the action ran against other engine state
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        match gate {
            Ok(gate) => {
                proposal.status = ProposalStatus::Executed;
                info!(proposal = id, ?gate, "proposal executed");
                self.events.record(Event::ProposalExecuted { proposal: id });
                Ok(gate)
            }
            Err(err) => {
                proposal.status = ProposalStatus::ExecutionFailed;
                warn!(proposal = id, %err, "proposal payload failed");
                Err(err)
            }
        }
    }

    /// Complete a scheduled governance-parameter change (admin capability).
    /// The parameters must match the scheduled operation exactly - the
    /// timelock fingerprint is derived from them.
    pub fn apply_params(
        &mut self,
        caller: &Address,
        quorum: Amount,
        voting_period_secs: i64,
        now: Timestamp,
    ) -> Result<Gate> {
        self.ensure_not_paused()?;
        if !self.caps.has_capability(caller, Role::Admin) {
            return Err(GovernanceError::Unauthorized);
        }
        self.schedule_params(quorum, voting_period_secs, now)
    }

    fn schedule_params(
        &mut self,
        quorum: Amount,
        voting_period_secs: i64,
        now: Timestamp,
    ) -> Result<Gate> {
        if voting_period_secs <= 0 {
            return Err(GovernanceError::InvalidParams(
                "voting period must be positive",
            ));
        }

        let mut params = Vec::with_capacity(24);
        params.extend_from_slice(&quorum.to_le_bytes());
        params.extend_from_slice(&voting_period_secs.to_le_bytes());
        let kind = "set_governance_params";

        let gate = self.timelock.check_and_schedule(kind, &params, now)?;
        let op_id = self
            .timelock
            .op_id(&OpFingerprint::derive(kind, &params))
            .unwrap_or_default();
        match gate {
            Gate::Pending { ready_at } => {
                self.events.record(Event::OperationScheduled { op_id, ready_at });
            }
            Gate::Proceed => {
                self.quorum = quorum;
                self.voting_period_secs = voting_period_secs;
                info!(quorum, voting_period_secs, "governance parameters updated");
                self.events.record(Event::OperationExecuted { op_id });
            }
        }
        Ok(gate)
    }

    fn ensure_not_paused(&self) -> Result<()> {
        if self.breaker.is_paused() {
            return Err(GovernanceError::Paused);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_core::collab::{InMemoryTokenLedger, PauseSwitch, StaticCapabilities};

    const PERIOD: i64 = 3 * 86_400;
    const DELAY: i64 = 2 * 86_400;

    fn addr(b: u8) -> Address {
        [b; 32]
    }

    fn action() -> ProposalAction {
        ProposalAction::SetEarlyRedemption {
            enabled: true,
            penalty_bps: 300,
        }
    }

    /// Target that records whether it was invoked
    struct Recorder {
        applied: Vec<ProposalAction>,
        fail: bool,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                applied: Vec::new(),
                fail: false,
            }
        }
    }

    impl ProposalTarget for Recorder {
        fn apply(
            &mut self,
            action: &ProposalAction,
            _now: Timestamp,
        ) -> std::result::Result<Gate, String> {
            if self.fail {
                return Err("target refused".into());
            }
            self.applied.push(*action);
            Ok(Gate::Proceed)
        }
    }

    struct Harness {
        engine: GovernanceEngine,
        token: Arc<InMemoryTokenLedger>,
        breaker: Arc<PauseSwitch>,
        caps: Arc<StaticCapabilities>,
    }

    fn harness(quorum: Amount) -> Harness {
        let token = Arc::new(InMemoryTokenLedger::new());
        let caps = Arc::new(StaticCapabilities::new());
        let breaker = Arc::new(PauseSwitch::new());
        let engine = GovernanceEngine::new(
            GovernanceConfig {
                quorum,
                voting_period_secs: PERIOD,
                timelock_delay_secs: DELAY,
            },
            token.clone(),
            caps.clone(),
            breaker.clone(),
        );
        Harness {
            engine,
            token,
            breaker,
            caps,
        }
    }

    #[test]
    fn test_vote_weight_is_live_balance() {
        let mut h = harness(10);
        let alice = addr(1);
        let bob = addr(2);
        h.token.mint(&alice, 60).unwrap();
        h.token.mint(&bob, 40).unwrap();

        let id = h
            .engine
            .create_proposal(&alice, "enable early redemption".into(), action(), 0)
            .unwrap();

        h.engine.cast_vote(&alice, id, true, 10).unwrap();
        // Alice buys more afterwards; her cast weight does not change
        h.token.mint(&alice, 1_000).unwrap();
        h.engine.cast_vote(&bob, id, false, 20).unwrap();

        let p = h.engine.proposal(id).unwrap();
        assert_eq!(p.for_votes, 60);
        assert_eq!(p.against_votes, 40);
    }

    #[test]
    fn test_vote_preconditions() {
        let mut h = harness(10);
        let alice = addr(1);
        h.token.mint(&alice, 60).unwrap();
        let id = h
            .engine
            .create_proposal(&alice, "x".into(), action(), 0)
            .unwrap();

        assert!(matches!(
            h.engine.cast_vote(&addr(9), id, true, 10),
            Err(GovernanceError::ZeroVotingWeight)
        ));
        h.engine.cast_vote(&alice, id, true, 10).unwrap();
        assert!(matches!(
            h.engine.cast_vote(&alice, id, true, 20),
            Err(GovernanceError::AlreadyVoted)
        ));
        assert!(matches!(
            h.engine.cast_vote(&alice, 99, true, 20),
            Err(GovernanceError::UnknownProposal(99))
        ));

        let late = addr(2);
        h.token.mint(&late, 5).unwrap();
        assert!(matches!(
            h.engine.cast_vote(&late, id, true, PERIOD + 1),
            Err(GovernanceError::VotingClosed { .. })
        ));
    }

    #[test]
    fn test_quorum_and_majority_are_distinct_failures() {
        let mut h = harness(100);
        let alice = addr(1);
        let bob = addr(2);
        h.token.mint(&alice, 30).unwrap();
        h.token.mint(&bob, 120).unwrap();
        let mut target = Recorder::new();

        // Below quorum regardless of direction
        let id = h
            .engine
            .create_proposal(&alice, "a".into(), action(), 0)
            .unwrap();
        h.engine.cast_vote(&alice, id, true, 10).unwrap();
        let err = h.engine.execute(id, &mut target, PERIOD + 1).unwrap_err();
        assert!(matches!(err, GovernanceError::QuorumNotReached { cast: 30, .. }));
        assert_eq!(
            h.engine.proposal(id).unwrap().status,
            ProposalStatus::QuorumFailed
        );

        // Quorum met but majority against
        let id = h
            .engine
            .create_proposal(&alice, "b".into(), action(), 0)
            .unwrap();
        h.engine.cast_vote(&alice, id, true, 10).unwrap();
        h.engine.cast_vote(&bob, id, false, 10).unwrap();
        let err = h.engine.execute(id, &mut target, PERIOD + 1).unwrap_err();
        assert!(matches!(err, GovernanceError::Rejected { .. }));
        assert_eq!(h.engine.proposal(id).unwrap().status, ProposalStatus::Rejected);

        // Both failures are terminal
        assert!(matches!(
            h.engine.execute(id, &mut target, PERIOD + 2),
            Err(GovernanceError::AlreadyResolved)
        ));
        assert!(target.applied.is_empty());
    }

    #[test]
    fn test_execute_applies_payload_once() {
        let mut h = harness(10);
        let alice = addr(1);
        h.token.mint(&alice, 50).unwrap();
        let mut target = Recorder::new();

        let id = h
            .engine
            .create_proposal(&alice, "x".into(), action(), 0)
            .unwrap();
        h.engine.cast_vote(&alice, id, true, 10).unwrap();

        assert!(matches!(
            h.engine.execute(id, &mut target, PERIOD),
            Err(GovernanceError::VotingStillOpen { .. })
        ));

        let gate = h.engine.execute(id, &mut target, PERIOD + 1).unwrap();
        assert_eq!(gate, Gate::Proceed);
        assert_eq!(target.applied, vec![action()]);
        assert_eq!(h.engine.proposal(id).unwrap().status, ProposalStatus::Executed);

        assert!(matches!(
            h.engine.execute(id, &mut target, PERIOD + 2),
            Err(GovernanceError::AlreadyResolved)
        ));
        assert_eq!(target.applied.len(), 1);
    }

    #[test]
    fn test_payload_failure_is_terminal_and_distinct() {
        let mut h = harness(10);
        let alice = addr(1);
        h.token.mint(&alice, 50).unwrap();
        let mut target = Recorder::new();
        target.fail = true;

        let id = h
            .engine
            .create_proposal(&alice, "x".into(), action(), 0)
            .unwrap();
        h.engine.cast_vote(&alice, id, true, 10).unwrap();

        let err = h.engine.execute(id, &mut target, PERIOD + 1).unwrap_err();
        assert!(matches!(err, GovernanceError::ExecutionFailed(_)));
        assert_eq!(
            h.engine.proposal(id).unwrap().status,
            ProposalStatus::ExecutionFailed
        );

        target.fail = false;
        assert!(matches!(
            h.engine.execute(id, &mut target, PERIOD + 2),
            Err(GovernanceError::AlreadyResolved)
        ));
    }

    #[test]
    fn test_governance_params_go_through_timelock() {
        let mut h = harness(10);
        let alice = addr(1);
        let admin = addr(0xAD);
        h.caps.grant(admin, Role::Admin);
        h.token.mint(&alice, 50).unwrap();
        let mut target = Recorder::new();

        let id = h
            .engine
            .create_proposal(
                &alice,
                "double the quorum".into(),
                ProposalAction::SetGovernanceParams {
                    quorum: 20,
                    voting_period_secs: PERIOD,
                },
                0,
            )
            .unwrap();
        h.engine.cast_vote(&alice, id, true, 10).unwrap();

        // Execution schedules; the proposal is resolved but nothing changed
        let gate = h.engine.execute(id, &mut target, PERIOD + 1).unwrap();
        assert!(matches!(gate, Gate::Pending { .. }));
        assert_eq!(h.engine.quorum(), 10);
        assert_eq!(h.engine.proposal(id).unwrap().status, ProposalStatus::Executed);

        // Non-admin cannot complete it
        assert!(matches!(
            h.engine.apply_params(&alice, 20, PERIOD, PERIOD + 1 + DELAY),
            Err(GovernanceError::Unauthorized)
        ));

        // Admin completes it after the delay
        let gate = h
            .engine
            .apply_params(&admin, 20, PERIOD, PERIOD + 1 + DELAY)
            .unwrap();
        assert_eq!(gate, Gate::Proceed);
        assert_eq!(h.engine.quorum(), 20);
    }

    #[test]
    fn test_pause_blocks_governance() {
        let mut h = harness(10);
        let alice = addr(1);
        h.token.mint(&alice, 50).unwrap();
        let id = h
            .engine
            .create_proposal(&alice, "x".into(), action(), 0)
            .unwrap();

        h.breaker.set_paused(true);
        let mut target = Recorder::new();
        assert!(matches!(
            h.engine.create_proposal(&alice, "y".into(), action(), 1),
            Err(GovernanceError::Paused)
        ));
        assert!(matches!(
            h.engine.cast_vote(&alice, id, true, 10),
            Err(GovernanceError::Paused)
        ));
        assert!(matches!(
            h.engine.execute(id, &mut target, PERIOD + 1),
            Err(GovernanceError::Paused)
        ));
    }
}
