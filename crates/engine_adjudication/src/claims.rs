//! Claim adjudication service
//!
//! Claims are not adjudicated synchronously at submission; the sweep picks
//! them up once they have aged past the auto-analysis delay, and a reviewer
//! can trigger the same path by hand.

use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::{ClaimId, Clock, Money};
use domain_membership::MembershipPort;
use domain_reimbursements::{
    ClaimDecision, ClaimDenialReason, ClaimFacts, ClaimPolicy, ClaimStatus, ClaimStore,
    DocumentQuery,
};
use engine_dispatch::{Dispatcher, Notification};

use crate::error::AdjudicationError;
use crate::guard::LeaseGuard;

/// Job name recorded on claim leases
const JOB_NAME: &str = "adjudicate_claim";

/// Outcome of one adjudication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimAdjudication {
    /// Approved at the policy's coverage rate
    Approved { amount: Money },
    /// Denied
    Denied(ClaimDenialReason),
    /// Held in analysis for the manual review team
    Held,
    /// Another worker holds the lease or won the write race
    Skipped,
    /// The claim already left analysis
    AlreadyDecided(ClaimStatus),
}

/// Adjudicates reimbursement claims
pub struct ClaimAdjudicator {
    claims: Arc<dyn ClaimStore>,
    documents: Arc<dyn DocumentQuery>,
    membership: Arc<dyn MembershipPort>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl ClaimAdjudicator {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        documents: Arc<dyn DocumentQuery>,
        membership: Arc<dyn MembershipPort>,
        guard: Arc<dyn LeaseGuard>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            claims,
            documents,
            membership,
            guard,
            dispatcher,
            clock,
        }
    }

    /// Adjudicates one claim end to end
    pub async fn adjudicate(
        &self,
        claim_id: ClaimId,
    ) -> Result<ClaimAdjudication, AdjudicationError> {
        let lease_key = claim_id.to_string();
        if !self.guard.try_claim(&lease_key, JOB_NAME).await {
            return Ok(ClaimAdjudication::Skipped);
        }

        let outcome = self.adjudicate_claimed(claim_id).await;
        self.guard.release(&lease_key, JOB_NAME).await;
        outcome
    }

    async fn adjudicate_claimed(
        &self,
        claim_id: ClaimId,
    ) -> Result<ClaimAdjudication, AdjudicationError> {
        let mut claim = self
            .claims
            .get(claim_id)
            .await
            .map_err(AdjudicationError::Store)?;

        if claim.status != ClaimStatus::InAnalysis {
            return Ok(ClaimAdjudication::AlreadyDecided(claim.status));
        }

        let beneficiary_active = self
            .membership
            .is_beneficiary_active(claim.beneficiary_id)
            .await
            .map_err(AdjudicationError::PreconditionUnavailable)?;
        let documents = self
            .documents
            .attached_document_types(claim_id)
            .await
            .map_err(AdjudicationError::PreconditionUnavailable)?;

        let facts = ClaimFacts {
            beneficiary_active,
            today: self.clock.today(),
            documents,
        };

        match ClaimPolicy::evaluate(&claim, &facts) {
            ClaimDecision::Approve {
                approved_amount,
                rate,
            } => {
                let note = format!("Auto-aprovado (cobertura de {rate})");
                let event = claim.approve(approved_amount, Some(note), self.clock.now())?;
                if self.lost_write_race(self.claims.update(&claim).await)? {
                    return Ok(ClaimAdjudication::Skipped);
                }
                info!(
                    claim = %claim.protocol_number,
                    amount = %approved_amount,
                    "claim auto-approved"
                );
                self.dispatcher.dispatch(&event.into()).await;
                Ok(ClaimAdjudication::Approved {
                    amount: approved_amount,
                })
            }
            ClaimDecision::Deny(reason) => {
                let event = claim.deny(reason.clone(), self.clock.now())?;
                if self.lost_write_race(self.claims.update(&claim).await)? {
                    return Ok(ClaimAdjudication::Skipped);
                }
                info!(
                    claim = %claim.protocol_number,
                    reason = reason.description(),
                    "claim denied"
                );
                self.dispatcher.dispatch(&event.into()).await;
                Ok(ClaimAdjudication::Denied(reason))
            }
            ClaimDecision::Hold => {
                // no transition; tell the beneficiary a human is on it
                info!(claim = %claim.protocol_number, "claim requires manual review");
                self.dispatcher
                    .notify(Notification::claim_under_manual_review(
                        &claim,
                        self.clock.now(),
                    ))
                    .await;
                Ok(ClaimAdjudication::Held)
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
                warn!(%error, "claim write lost the version race, skipping");
                Ok(true)
            }
            Err(error) => Err(AdjudicationError::Store(error)),
        }
    }
}
