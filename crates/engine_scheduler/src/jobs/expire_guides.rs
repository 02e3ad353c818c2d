//! ExpireGuides sweep

use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::warn;

use core_kernel::Clock;
use domain_guides::{AuthorizationGuide, GuideStatus, GuideStore};
use engine_adjudication::LeaseGuard;
use engine_dispatch::Dispatcher;

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Moves authorized guides past their validity to Expired
pub struct ExpireGuides {
    guides: Arc<dyn GuideStore>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl ExpireGuides {
    pub fn new(
        guides: Arc<dyn GuideStore>,
        guard: Arc<dyn LeaseGuard>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guides,
            guard,
            dispatcher,
            clock,
        }
    }

    async fn expire_one(&self, candidate: AuthorizationGuide) -> EntityOutcome {
        let lease_key = candidate.id.to_string();
        if !self.guard.try_claim(&lease_key, self.name()).await {
            return EntityOutcome::Skipped;
        }

        let outcome = self.expire_claimed(candidate).await;
        self.guard.release(&lease_key, self.name()).await;
        outcome
    }

    async fn expire_claimed(&self, candidate: AuthorizationGuide) -> EntityOutcome {
        // reload: the candidate snapshot may be stale by the time we hold
        // the lease
        let mut guide = match self.guides.get(candidate.id).await {
            Ok(guide) => guide,
            Err(error) => {
                warn!(%error, guide = %candidate.id, "guide vanished mid-sweep");
                return EntityOutcome::Skipped;
            }
        };

        let today = self.clock.today();
        let still_lapsed = guide.status == GuideStatus::Authorized
            && guide.expiry_date.is_some_and(|expiry| expiry < today);
        if !still_lapsed {
            return EntityOutcome::Unchanged;
        }

        let event = match guide.expire(self.clock.now()) {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, guide = %guide.guide_number, "expiry transition rejected");
                return EntityOutcome::Skipped;
            }
        };

        match self.guides.update(&guide).await {
            Ok(()) => {
                self.dispatcher.dispatch(&event.into()).await;
                EntityOutcome::Transitioned { notified: true }
            }
            Err(error) if error.is_conflict() => EntityOutcome::Skipped,
            Err(error) => {
                warn!(%error, guide = %guide.guide_number, "expiry write failed");
                EntityOutcome::Skipped
            }
        }
    }
}

#[async_trait]
impl SweepJob for ExpireGuides {
    fn name(&self) -> &'static str {
        "expire_guides"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Hourly
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let candidates = self
            .guides
            .authorized_expired_before(self.clock.today())
            .await?;

        Ok(sweep_candidates(self.name(), candidates, deadline, |candidate| {
            self.expire_one(candidate)
        })
        .await)
    }
}
