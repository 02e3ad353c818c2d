//! Guide adjudication service
//!
//! Runs synchronously at intake and again whenever a sweep or a reviewer
//! re-triggers a pending guide.

use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::{Clock, GuideId};
use domain_guides::{GuideDecision, GuideDenialReason, GuideFacts, GuidePolicy, GuideStatus, GuideStore};
use domain_membership::MembershipPort;
use engine_dispatch::Dispatcher;

use crate::error::AdjudicationError;
use crate::guard::LeaseGuard;

/// Job name recorded on guide leases
const JOB_NAME: &str = "adjudicate_guide";

/// Outcome of one adjudication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideAdjudication {
    /// Guide authorized in full
    Authorized,
    /// Guide denied
    Denied(GuideDenialReason),
    /// Held for manual disposition; guide unchanged
    Held,
    /// Another worker holds the lease or won the write race
    Skipped,
    /// The guide already left the awaiting-decision states
    AlreadyDecided(GuideStatus),
}

/// Adjudicates authorization guides
pub struct GuideAdjudicator {
    guides: Arc<dyn GuideStore>,
    membership: Arc<dyn MembershipPort>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl GuideAdjudicator {
    pub fn new(
        guides: Arc<dyn GuideStore>,
        membership: Arc<dyn MembershipPort>,
        guard: Arc<dyn LeaseGuard>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guides,
            membership,
            guard,
            dispatcher,
            clock,
        }
    }

    /// Adjudicates one guide end to end
    pub async fn adjudicate(
        &self,
        guide_id: GuideId,
    ) -> Result<GuideAdjudication, AdjudicationError> {
        let lease_key = guide_id.to_string();
        if !self.guard.try_claim(&lease_key, JOB_NAME).await {
            return Ok(GuideAdjudication::Skipped);
        }

        let outcome = self.adjudicate_claimed(guide_id).await;
        self.guard.release(&lease_key, JOB_NAME).await;
        outcome
    }

    async fn adjudicate_claimed(
        &self,
        guide_id: GuideId,
    ) -> Result<GuideAdjudication, AdjudicationError> {
        let mut guide = self
            .guides
            .get(guide_id)
            .await
            .map_err(AdjudicationError::Store)?;

        if !guide.status.is_awaiting_decision() {
            return Ok(GuideAdjudication::AlreadyDecided(guide.status));
        }

        let beneficiary_active = self
            .membership
            .is_beneficiary_active(guide.beneficiary_id)
            .await
            .map_err(AdjudicationError::PreconditionUnavailable)?;
        let provider_active = self
            .membership
            .is_provider_active(guide.provider_id)
            .await
            .map_err(AdjudicationError::PreconditionUnavailable)?;

        let facts = GuideFacts {
            beneficiary_active,
            provider_active,
        };

        match GuidePolicy::evaluate(&guide, &facts) {
            GuideDecision::Authorize => {
                let event = guide.authorize_in_full(self.clock.now())?;
                if self.lost_write_race(self.guides.update(&guide).await)? {
                    return Ok(GuideAdjudication::Skipped);
                }
                info!(guide = %guide.guide_number, "guide auto-authorized");
                self.dispatcher.dispatch(&event.into()).await;
                Ok(GuideAdjudication::Authorized)
            }
            GuideDecision::Deny(reason) => {
                let event = guide.deny(reason.clone(), self.clock.now())?;
                if self.lost_write_race(self.guides.update(&guide).await)? {
                    return Ok(GuideAdjudication::Skipped);
                }
                info!(
                    guide = %guide.guide_number,
                    reason = reason.description(),
                    "guide denied"
                );
                self.dispatcher.dispatch(&event.into()).await;
                Ok(GuideAdjudication::Denied(reason))
            }
            GuideDecision::Hold => {
                info!(guide = %guide.guide_number, "guide requires manual review");
                Ok(GuideAdjudication::Held)
            }
        }
    }

    fn lost_write_race(
        &self,
        result: Result<(), core_kernel::PortError>,
    ) -> Result<bool, AdjudicationError> {
        match result {
            Ok(()) => Ok(false),
            Err(error) if error.is_conflict() => {
                warn!(%error, "guide write lost the version race, skipping");
                Ok(true)
            }
            Err(error) => Err(AdjudicationError::Store(error)),
        }
    }
}
