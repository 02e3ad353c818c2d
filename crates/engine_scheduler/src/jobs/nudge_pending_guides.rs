//! NudgePendingGuides sweep

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tokio::time::Instant;

use core_kernel::Clock;
use domain_guides::{AuthorizationGuide, GuideStore};
use engine_adjudication::LeaseGuard;
use engine_dispatch::{Dispatcher, Notification};

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Pending guides older than this get a reminder
pub const GUIDE_NUDGE_AGE_HOURS: i64 = 48;

/// Reminds beneficiaries about guides pending for more than two days
///
/// Notify-only: no transition, the guide stays in the review queue.
pub struct NudgePendingGuides {
    guides: Arc<dyn GuideStore>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl NudgePendingGuides {
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

    async fn nudge_one(&self, guide: AuthorizationGuide) -> EntityOutcome {
        let lease_key = guide.id.to_string();
        if !self.guard.try_claim(&lease_key, self.name()).await {
            return EntityOutcome::Skipped;
        }

        self.dispatcher
            .notify(Notification::pending_guide_reminder(&guide, self.clock.now()))
            .await;

        self.guard.release(&lease_key, self.name()).await;
        EntityOutcome::NotifiedOnly
    }
}

#[async_trait]
impl SweepJob for NudgePendingGuides {
    fn name(&self) -> &'static str {
        "nudge_pending_guides"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Daily { hour: 9 }
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let cutoff = self.clock.now() - Duration::hours(GUIDE_NUDGE_AGE_HOURS);
        let candidates = self.guides.pending_requested_before(cutoff).await?;

        Ok(sweep_candidates(self.name(), candidates, deadline, |guide| {
            self.nudge_one(guide)
        })
        .await)
    }
}
