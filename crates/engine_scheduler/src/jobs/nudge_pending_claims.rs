//! NudgePendingClaims sweep

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tokio::time::Instant;

use core_kernel::Clock;
use domain_reimbursements::{ClaimStore, ReimbursementClaim};
use engine_adjudication::LeaseGuard;
use engine_dispatch::{Dispatcher, Notification};

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Claims in analysis longer than this get a reminder
pub const CLAIM_NUDGE_AGE_HOURS: i64 = 72;

/// Reminds beneficiaries about claims sitting in analysis past three days
pub struct NudgePendingClaims {
    claims: Arc<dyn ClaimStore>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl NudgePendingClaims {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        guard: Arc<dyn LeaseGuard>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            claims,
            guard,
            dispatcher,
            clock,
        }
    }

    async fn nudge_one(&self, claim: ReimbursementClaim) -> EntityOutcome {
        let lease_key = claim.id.to_string();
        if !self.guard.try_claim(&lease_key, self.name()).await {
            return EntityOutcome::Skipped;
        }

        self.dispatcher
            .notify(Notification::pending_claim_reminder(&claim, self.clock.now()))
            .await;

        self.guard.release(&lease_key, self.name()).await;
        EntityOutcome::NotifiedOnly
    }
}

#[async_trait]
impl SweepJob for NudgePendingClaims {
    fn name(&self) -> &'static str {
        "nudge_pending_claims"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Daily { hour: 11 }
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let cutoff = self.clock.now() - Duration::hours(CLAIM_NUDGE_AGE_HOURS);
        let candidates = self.claims.in_analysis_requested_before(cutoff).await?;

        Ok(sweep_candidates(self.name(), candidates, deadline, |claim| {
            self.nudge_one(claim)
        })
        .await)
    }
}
