//! Domain events for the claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BeneficiaryId, ClaimId, Money};

use crate::claim::ClaimStatus;
use crate::policy::ClaimDenialReason;

/// Domain events emitted by claim transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClaimEvent {
    /// Claim approved at the applicable coverage
    Approved {
        claim_id: ClaimId,
        protocol_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: ClaimStatus,
        approved_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Claim approved below the requested amount
    PartiallyApproved {
        claim_id: ClaimId,
        protocol_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: ClaimStatus,
        approved_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Claim denied
    Denied {
        claim_id: ClaimId,
        protocol_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: ClaimStatus,
        reason: ClaimDenialReason,
        timestamp: DateTime<Utc>,
    },

    /// Reimbursement paid out
    Paid {
        claim_id: ClaimId,
        protocol_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: ClaimStatus,
        amount: Money,
        paid_on: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// Claim cancelled
    Cancelled {
        claim_id: ClaimId,
        protocol_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: ClaimStatus,
        timestamp: DateTime<Utc>,
    },
}

impl ClaimEvent {
    /// Returns the claim ID associated with this event
    pub fn claim_id(&self) -> ClaimId {
        match self {
            ClaimEvent::Approved { claim_id, .. } => *claim_id,
            ClaimEvent::PartiallyApproved { claim_id, .. } => *claim_id,
            ClaimEvent::Denied { claim_id, .. } => *claim_id,
            ClaimEvent::Paid { claim_id, .. } => *claim_id,
            ClaimEvent::Cancelled { claim_id, .. } => *claim_id,
        }
    }

    /// Returns the affected beneficiary
    pub fn beneficiary_id(&self) -> BeneficiaryId {
        match self {
            ClaimEvent::Approved { beneficiary_id, .. } => *beneficiary_id,
            ClaimEvent::PartiallyApproved { beneficiary_id, .. } => *beneficiary_id,
            ClaimEvent::Denied { beneficiary_id, .. } => *beneficiary_id,
            ClaimEvent::Paid { beneficiary_id, .. } => *beneficiary_id,
            ClaimEvent::Cancelled { beneficiary_id, .. } => *beneficiary_id,
        }
    }

    /// Returns the status before the transition
    pub fn old_status(&self) -> ClaimStatus {
        match self {
            ClaimEvent::Approved { old_status, .. } => *old_status,
            ClaimEvent::PartiallyApproved { old_status, .. } => *old_status,
            ClaimEvent::Denied { old_status, .. } => *old_status,
            ClaimEvent::Paid { old_status, .. } => *old_status,
            ClaimEvent::Cancelled { old_status, .. } => *old_status,
        }
    }

    /// Returns the status after the transition
    pub fn new_status(&self) -> ClaimStatus {
        match self {
            ClaimEvent::Approved { .. } => ClaimStatus::Approved,
            ClaimEvent::PartiallyApproved { .. } => ClaimStatus::PartiallyApproved,
            ClaimEvent::Denied { .. } => ClaimStatus::Denied,
            ClaimEvent::Paid { .. } => ClaimStatus::Paid,
            ClaimEvent::Cancelled { .. } => ClaimStatus::Cancelled,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ClaimEvent::Approved { timestamp, .. } => *timestamp,
            ClaimEvent::PartiallyApproved { timestamp, .. } => *timestamp,
            ClaimEvent::Denied { timestamp, .. } => *timestamp,
            ClaimEvent::Paid { timestamp, .. } => *timestamp,
            ClaimEvent::Cancelled { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::Approved { .. } => "ClaimApproved",
            ClaimEvent::PartiallyApproved { .. } => "ClaimPartiallyApproved",
            ClaimEvent::Denied { .. } => "ClaimDenied",
            ClaimEvent::Paid { .. } => "ClaimPaid",
            ClaimEvent::Cancelled { .. } => "ClaimCancelled",
        }
    }
}
