//! Governance errors

use thiserror::Error;
use verdant_core::timelock::TimelockError;
use verdant_core::types::{Amount, ProposalId, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("unknown proposal {0}")]
    UnknownProposal(ProposalId),

    #[error("proposal description must be non-empty")]
    EmptyDescription,

    #[error("voting window closed at {vote_end}")]
    VotingClosed { vote_end: Timestamp },

    #[error("voting window open until {vote_end}")]
    VotingStillOpen { vote_end: Timestamp },

    #[error("voter has already voted on this proposal")]
    AlreadyVoted,

    #[error("voter holds no bond tokens")]
    ZeroVotingWeight,

    #[error("quorum not reached: {cast} of {quorum} required votes")]
    QuorumNotReached { cast: Amount, quorum: Amount },

    #[error("proposal rejected: {for_votes} for, {against_votes} against")]
    Rejected {
        for_votes: Amount,
        against_votes: Amount,
    },

    #[error("proposal already resolved")]
    AlreadyResolved,

    #[error("proposal execution failed: {0}")]
    ExecutionFailed(String),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(&'static str),

    #[error("caller lacks the required capability")]
    Unauthorized,

    #[error("protocol is paused")]
    Paused,

    #[error(transparent)]
    Timelock(#[from] TimelockError),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
