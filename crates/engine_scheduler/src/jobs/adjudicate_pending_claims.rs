//! AdjudicatePendingClaims sweep

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::warn;

use core_kernel::Clock;
use domain_reimbursements::{ClaimStore, ReimbursementClaim};
use engine_adjudication::{AdjudicationError, ClaimAdjudication, ClaimAdjudicator};

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Claims younger than this are left for their documents to arrive
pub const CLAIM_ANALYSIS_DELAY_HOURS: i64 = 24;

/// Runs the claim policy over every claim that has aged past the
/// auto-analysis delay
pub struct AdjudicatePendingClaims {
    claims: Arc<dyn ClaimStore>,
    adjudicator: Arc<ClaimAdjudicator>,
    clock: Arc<dyn Clock>,
}

impl AdjudicatePendingClaims {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        adjudicator: Arc<ClaimAdjudicator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            claims,
            adjudicator,
            clock,
        }
    }

    async fn adjudicate_one(&self, claim: ReimbursementClaim) -> EntityOutcome {
        match self.adjudicator.adjudicate(claim.id).await {
            Ok(ClaimAdjudication::Approved { .. }) | Ok(ClaimAdjudication::Denied(_)) => {
                EntityOutcome::Transitioned { notified: true }
            }
            // a hold notifies the beneficiary that review continues
            Ok(ClaimAdjudication::Held) => EntityOutcome::NotifiedOnly,
            Ok(ClaimAdjudication::Skipped) => EntityOutcome::Skipped,
            Ok(ClaimAdjudication::AlreadyDecided(_)) => EntityOutcome::Unchanged,
            Err(AdjudicationError::PreconditionUnavailable(source)) => {
                warn!(%source, claim = %claim.protocol_number, "facts unavailable, retrying next tick");
                EntityOutcome::Skipped
            }
            Err(error) => {
                warn!(%error, claim = %claim.protocol_number, "claim adjudication failed");
                EntityOutcome::Skipped
            }
        }
    }
}

#[async_trait]
impl SweepJob for AdjudicatePendingClaims {
    fn name(&self) -> &'static str {
        "adjudicate_pending_claims"
    }

    fn cadence(&self) -> Cadence {
        Cadence::EverySixHours
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let cutoff = self.clock.now() - Duration::hours(CLAIM_ANALYSIS_DELAY_HOURS);
        let candidates = self.claims.in_analysis_requested_before(cutoff).await?;

        Ok(sweep_candidates(self.name(), candidates, deadline, |claim| {
            self.adjudicate_one(claim)
        })
        .await)
    }
}
