//! Claims domain errors

use thiserror::Error;

use core_kernel::Money;

use crate::claim::ClaimStatus;

/// Errors that can occur in the reimbursements domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Approved amount {approved} exceeds requested {requested}")]
    ApprovedExceedsRequested { requested: Money, approved: Money },

    #[error("Partial approval {approved} must be below requested {requested}")]
    PartialApprovalNotBelowRequested { requested: Money, approved: Money },
}
