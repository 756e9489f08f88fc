//! Impact report records

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use verdant_core::types::{Address, ReportId, Timestamp};

/// Lifecycle stage of a report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Collecting attestations
    Pending,
    /// Threshold reached; the rate effect (if any) has been applied
    Finalized,
    /// Deadline passed without reaching the threshold
    Expired,
}

/// One posted impact report and its attestation state.
///
/// The report body lives off-protocol behind `uri`; `hash` is the BLAKE3
/// digest of that body, fixed at submission so attestors sign off on
/// exactly one version of the evidence. `metrics` carries the claimed
/// outcomes as ordered (name, value) pairs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImpactReport {
    pub id: ReportId,
    pub submitter: Address,
    pub uri: String,
    pub hash: [u8; 32],
    pub metrics: Vec<(String, u128)>,
    pub submitted_at: Timestamp,
    pub deadline: Timestamp,
    /// Distinct attestations required to finalize
    pub threshold: u32,
    pub(crate) attestors: HashSet<Address>,
    pub(crate) finalized: bool,
    /// Challenges survive in the record after the attestor set is rebuilt
    pub challenge_count: u32,
}

impl ImpactReport {
    pub(crate) fn new(
        id: ReportId,
        submitter: Address,
        uri: String,
        hash: [u8; 32],
        metrics: Vec<(String, u128)>,
        threshold: u32,
        submitted_at: Timestamp,
        deadline: Timestamp,
    ) -> Self {
        Self {
            id,
            submitter,
            uri,
            hash,
            metrics,
            submitted_at,
            deadline,
            threshold,
            attestors: HashSet::new(),
            finalized: false,
            challenge_count: 0,
        }
    }

    /// Attestations collected since the last challenge reset
    pub fn verification_count(&self) -> u32 {
        self.attestors.len() as u32
    }

    pub fn has_attested(&self, verifier: &Address) -> bool {
        self.attestors.contains(verifier)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn status(&self, now: Timestamp) -> ReportStatus {
        if self.finalized {
            ReportStatus::Finalized
        } else if now > self.deadline {
            ReportStatus::Expired
        } else {
            ReportStatus::Pending
        }
    }
}
