//! Impact report registry and threshold consensus
//!
//! A single registry serves the whole issuance. Reports accumulate distinct
//! verifier attestations; at the threshold the report finalizes and the
//! registry steps the issuance's green premium up through the rate state it
//! is handed. The rate handle is borrowed per call rather than owned, so
//! the bond vault remains the single owner of the rate.

use crate::error::{ImpactError, Result};
use crate::report::ImpactReport;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use verdant_bond::RateState;
use verdant_core::collab::{CapabilityOracle, CircuitBreaker, Role};
use verdant_core::events::{Event, EventLog};
use verdant_core::types::{
    short_addr, Address, ReportId, Timestamp, CHALLENGE_EXTENSION_SECS, GREEN_STEP_BPS,
};

/// Registry of impact reports for one issuance
pub struct ImpactRegistry {
    /// Attestation window granted to a fresh report
    verification_window_secs: i64,
    reports: HashMap<ReportId, ImpactReport>,
    next_id: ReportId,
    caps: Arc<dyn CapabilityOracle>,
    breaker: Arc<dyn CircuitBreaker>,
    events: EventLog,
}

impl ImpactRegistry {
    pub fn new(
        verification_window_secs: i64,
        caps: Arc<dyn CapabilityOracle>,
        breaker: Arc<dyn CircuitBreaker>,
    ) -> Self {
        Self {
            verification_window_secs,
            reports: HashMap::new(),
            next_id: 1,
            caps,
            breaker,
            events: EventLog::new(),
        }
    }

    pub fn report(&self, id: ReportId) -> Option<&ImpactReport> {
        self.reports.get(&id)
    }

    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Post a new report (issuer capability). The deadline is the current
    /// time plus the registry's verification window.
    pub fn add_report(
        &mut self,
        issuer: &Address,
        uri: String,
        hash: [u8; 32],
        metrics: Vec<(String, u128)>,
        threshold: u32,
        now: Timestamp,
    ) -> Result<ReportId> {
        self.ensure_not_paused()?;
        if !self.caps.has_capability(issuer, Role::Issuer) {
            return Err(ImpactError::Unauthorized);
        }
        if uri.is_empty() {
            return Err(ImpactError::InvalidReport("uri must be non-empty"));
        }
        if threshold == 0 {
            return Err(ImpactError::InvalidReport("threshold must be positive"));
        }

        let id = self.next_id;
        self.next_id += 1;
        let deadline = now + self.verification_window_secs;
        self.reports.insert(
            id,
            ImpactReport::new(id, *issuer, uri.clone(), hash, metrics, threshold, now, deadline),
        );

        info!(report = id, %uri, threshold, deadline, "impact report posted");
        self.events.record(Event::ReportAdded { report: id, uri });
        Ok(id)
    }

    /// Attest to a report (verifier capability).
    ///
    /// The attestation that reaches the threshold finalizes the report and
    /// steps the green premium up, unless the rate is already at cap - a
    /// finalization at cap still finalizes, it just moves no rate.
    pub fn verify(
        &mut self,
        id: ReportId,
        verifier: &Address,
        rate: &mut RateState,
        now: Timestamp,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        if !self.caps.has_capability(verifier, Role::Verifier) {
            return Err(ImpactError::Unauthorized);
        }

        let report = self.reports.get_mut(&id).ok_or(ImpactError::UnknownReport(id))?;
        if report.finalized {
            return Err(ImpactError::AlreadyFinalized(id));
        }
        if now > report.deadline {
            return Err(ImpactError::DeadlinePassed {
                deadline: report.deadline,
            });
        }
        if !report.attestors.insert(*verifier) {
            return Err(ImpactError::AlreadyAttested);
        }

        let count = report.verification_count();
        info!(report = id, verifier = %short_addr(verifier), count, "report attestation");
        self.events.record(Event::ReportVerified {
            report: id,
            verifier: *verifier,
            count,
        });

        if count >= report.threshold {
            report.finalized = true;
            info!(report = id, "report finalized");
            self.events.record(Event::ReportFinalized { report: id });

            match rate.raise_premium(GREEN_STEP_BPS) {
                Some(effective_bps) => {
                    info!(effective_bps, "green premium stepped up");
                    self.events.record(Event::RateUpdated { effective_bps });
                }
                None => {
                    warn!(
                        effective_bps = rate.effective_bps(),
                        "report finalized at rate cap; no rate effect"
                    );
                }
            }
        }
        Ok(())
    }

    /// Challenge a pending report (verifier capability). Voids every
    /// attestation collected so far and extends the deadline. Any verifier
    /// may challenge, attested or not.
    pub fn challenge(
        &mut self,
        id: ReportId,
        challenger: &Address,
        reason: &str,
        now: Timestamp,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        if !self.caps.has_capability(challenger, Role::Verifier) {
            return Err(ImpactError::Unauthorized);
        }

        let report = self.reports.get_mut(&id).ok_or(ImpactError::UnknownReport(id))?;
        if report.finalized {
            return Err(ImpactError::AlreadyFinalized(id));
        }
        if now > report.deadline {
            return Err(ImpactError::DeadlinePassed {
                deadline: report.deadline,
            });
        }

        report.attestors.clear();
        report.deadline += CHALLENGE_EXTENSION_SECS;
        report.challenge_count += 1;
        let new_deadline = report.deadline;

        warn!(report = id, challenger = %short_addr(challenger), reason, new_deadline, "report challenged");
        self.events.record(Event::ReportChallenged {
            report: id,
            challenger: *challenger,
            new_deadline,
        });
        Ok(())
    }

    fn ensure_not_paused(&self) -> Result<()> {
        if self.breaker.is_paused() {
            return Err(ImpactError::Paused);
        }
        Ok(())
    }
}
