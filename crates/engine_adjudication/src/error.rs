//! Adjudication errors

use thiserror::Error;

use core_kernel::PortError;
use domain_billing::BillingError;
use domain_guides::GuideError;
use domain_reimbursements::ClaimError;

/// Errors surfaced by the adjudication services
///
/// Lease contention and lost write races are not errors; they come back as
/// `Skipped` outcomes because retrying next tick is the designed behavior.
#[derive(Debug, Error)]
pub enum AdjudicationError {
    /// Master-data lookup failed; the entity is left untouched and the next
    /// tick retries. Never deny a request because a lookup was down.
    #[error("Precondition unavailable: {0}")]
    PreconditionUnavailable(#[source] PortError),

    /// Entity store failure
    #[error("Store error: {0}")]
    Store(#[source] PortError),

    /// The guide aggregate rejected the transition
    #[error(transparent)]
    Guide(#[from] GuideError),

    /// The claim aggregate rejected the transition
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// The invoice aggregate rejected the transition
    #[error(transparent)]
    Billing(#[from] BillingError),
}
