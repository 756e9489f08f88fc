//! Impact verification errors

use thiserror::Error;
use verdant_core::types::{ReportId, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImpactError {
    #[error("unknown report {0}")]
    UnknownReport(ReportId),

    #[error("report {0} already finalized")]
    AlreadyFinalized(ReportId),

    #[error("verification deadline {deadline} has passed")]
    DeadlinePassed { deadline: Timestamp },

    #[error("verifier has already attested to this report")]
    AlreadyAttested,

    #[error("invalid report: {0}")]
    InvalidReport(&'static str),

    #[error("caller lacks the required capability")]
    Unauthorized,

    #[error("protocol is paused")]
    Paused,
}

pub type Result<T> = std::result::Result<T, ImpactError>;
