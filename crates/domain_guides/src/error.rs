//! Guide domain errors

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::ProcedureId;

use crate::guide::GuideStatus;

/// Errors that can occur in the guides domain
#[derive(Debug, Error)]
pub enum GuideError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: GuideStatus, to: GuideStatus },

    #[error("Authorized quantity {authorized} exceeds requested {requested} for procedure {procedure}")]
    AuthorizedQuantityExceedsRequested {
        procedure: ProcedureId,
        requested: u32,
        authorized: u32,
    },

    #[error("Expected {expected} authorized quantities, got {got}")]
    AuthorizedQuantityCountMismatch { expected: usize, got: usize },

    #[error("Guide is valid until {expiry_date}")]
    NotYetExpired { expiry_date: NaiveDate },
}
