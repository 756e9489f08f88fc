//! Treasury error types

use thiserror::Error;
use verdant_core::types::Bps;

/// Result type alias for treasury operations
pub type Result<T> = std::result::Result<T, TreasuryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    /// Allocation split percentages must sum to exactly 10,000 bps
    #[error("allocation split sums to {total} bps, expected 10000")]
    SplitMismatch { total: Bps },
}
