//! Reimbursement claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BeneficiaryId, ClaimId, Money};

use crate::error::ClaimError;
use crate::events::ClaimEvent;
use crate::policy::ClaimDenialReason;

/// Expense type of the out-of-network service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    Consultation,
    Exam,
    Medication,
    Hospitalization,
    Surgery,
    Therapy,
    Other,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Consultation => "CONSULTATION",
            ExpenseType::Exam => "EXAM",
            ExpenseType::Medication => "MEDICATION",
            ExpenseType::Hospitalization => "HOSPITALIZATION",
            ExpenseType::Surgery => "SURGERY",
            ExpenseType::Therapy => "THERAPY",
            ExpenseType::Other => "OTHER",
        }
    }
}

/// Document types attachable to a claim
///
/// The attachments themselves live with the upload collaborator; the engine
/// only ever asks which types are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// Invoice or fiscal receipt
    Invoice,
    /// Medical prescription
    Prescription,
    /// Medical report
    Report,
    /// Payment receipt
    Receipt,
    Other,
}

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Submitted, awaiting adjudication
    InAnalysis,
    /// Approved at the applicable coverage rate
    Approved,
    /// Approved for less than the coverage rate would grant
    PartiallyApproved,
    /// Denied
    Denied,
    /// Reimbursement transferred to the beneficiary
    Paid,
    /// Cancelled
    Cancelled,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::InAnalysis => "IN_ANALYSIS",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::PartiallyApproved => "PARTIALLY_APPROVED",
            ClaimStatus::Denied => "DENIED",
            ClaimStatus::Paid => "PAID",
            ClaimStatus::Cancelled => "CANCELLED",
        }
    }

    /// True for states that accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Denied | ClaimStatus::Paid | ClaimStatus::Cancelled
        )
    }

    /// True when a payment can settle this claim
    pub fn is_payable(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::PartiallyApproved)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reimbursement claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReimbursementClaim {
    /// Unique identifier
    pub id: ClaimId,
    /// Protocol number handed to the beneficiary
    pub protocol_number: String,
    /// Status
    pub status: ClaimStatus,
    /// Optimistic version counter, bumped by every transition
    pub version: u64,
    /// Claiming beneficiary
    pub beneficiary_id: BeneficiaryId,
    /// Expense type
    pub expense_type: ExpenseType,
    /// Date the service was rendered
    pub service_date: NaiveDate,
    /// Description of the service
    pub service_description: String,
    /// Amount the beneficiary paid out of pocket
    pub requested_amount: Money,
    /// Amount granted by adjudication
    pub approved_amount: Option<Money>,
    /// When the claim was submitted
    pub request_date: DateTime<Utc>,
    /// When adjudication concluded
    pub analysis_date: Option<DateTime<Utc>>,
    /// When the reimbursement was paid out
    pub payment_date: Option<NaiveDate>,
    /// Analysis notes
    pub notes: Option<String>,
    /// Populated when denied
    pub denial_reason: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl ReimbursementClaim {
    /// Creates a newly submitted claim
    pub fn submit(
        beneficiary_id: BeneficiaryId,
        expense_type: ExpenseType,
        service_date: NaiveDate,
        service_description: impl Into<String>,
        requested_amount: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ClaimId::new_v7(),
            protocol_number: generate_protocol_number(now),
            status: ClaimStatus::InAnalysis,
            version: 1,
            beneficiary_id,
            expense_type,
            service_date,
            service_description: service_description.into(),
            requested_amount,
            approved_amount: None,
            request_date: now,
            analysis_date: None,
            payment_date: None,
            notes: None,
            denial_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Approves the claim for the given amount
    pub fn approve(
        &mut self,
        approved_amount: Money,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ClaimEvent, ClaimError> {
        self.ensure_transition(ClaimStatus::Approved)?;
        self.ensure_within_requested(approved_amount)?;

        let old_status = self.status;
        self.status = ClaimStatus::Approved;
        self.approved_amount = Some(approved_amount);
        self.analysis_date = Some(now);
        self.notes = notes;
        self.touch(now);

        Ok(ClaimEvent::Approved {
            claim_id: self.id,
            protocol_number: self.protocol_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            approved_amount,
            timestamp: now,
        })
    }

    /// Approves the claim for strictly less than the requested amount
    pub fn approve_partially(
        &mut self,
        approved_amount: Money,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ClaimEvent, ClaimError> {
        self.ensure_transition(ClaimStatus::PartiallyApproved)?;
        if approved_amount >= self.requested_amount {
            return Err(ClaimError::PartialApprovalNotBelowRequested {
                requested: self.requested_amount,
                approved: approved_amount,
            });
        }

        let old_status = self.status;
        self.status = ClaimStatus::PartiallyApproved;
        self.approved_amount = Some(approved_amount);
        self.analysis_date = Some(now);
        self.notes = notes;
        self.touch(now);

        Ok(ClaimEvent::PartiallyApproved {
            claim_id: self.id,
            protocol_number: self.protocol_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            approved_amount,
            timestamp: now,
        })
    }

    /// Denies the claim with a reason
    pub fn deny(
        &mut self,
        reason: ClaimDenialReason,
        now: DateTime<Utc>,
    ) -> Result<ClaimEvent, ClaimError> {
        self.ensure_transition(ClaimStatus::Denied)?;

        let old_status = self.status;
        self.status = ClaimStatus::Denied;
        self.denial_reason = Some(reason.description().to_string());
        self.analysis_date = Some(now);
        self.touch(now);

        Ok(ClaimEvent::Denied {
            claim_id: self.id,
            protocol_number: self.protocol_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            reason,
            timestamp: now,
        })
    }

    /// Settles an approved claim
    pub fn mark_paid(
        &mut self,
        paid_on: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ClaimEvent, ClaimError> {
        self.ensure_transition(ClaimStatus::Paid)?;

        let old_status = self.status;
        let amount = self
            .approved_amount
            .expect("payable claim always carries an approved amount");
        self.status = ClaimStatus::Paid;
        self.payment_date = Some(paid_on);
        self.touch(now);

        Ok(ClaimEvent::Paid {
            claim_id: self.id,
            protocol_number: self.protocol_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            amount,
            paid_on,
            timestamp: now,
        })
    }

    /// Cancels the claim
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<ClaimEvent, ClaimError> {
        self.ensure_transition(ClaimStatus::Cancelled)?;

        let old_status = self.status;
        self.status = ClaimStatus::Cancelled;
        self.touch(now);

        Ok(ClaimEvent::Cancelled {
            claim_id: self.id,
            protocol_number: self.protocol_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            timestamp: now,
        })
    }

    /// Checks the legal-transition table
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (InAnalysis, Approved)
                | (InAnalysis, PartiallyApproved)
                | (InAnalysis, Denied)
                | (InAnalysis, Cancelled)
                | (Approved, Paid)
                | (PartiallyApproved, Paid)
                | (Approved, Cancelled)
                | (PartiallyApproved, Cancelled)
        )
    }

    fn ensure_transition(&self, target: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(target) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    fn ensure_within_requested(&self, approved: Money) -> Result<(), ClaimError> {
        if approved > self.requested_amount {
            return Err(ClaimError::ApprovedExceedsRequested {
                requested: self.requested_amount,
                approved,
            });
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// Generates a unique protocol number
fn generate_protocol_number(now: DateTime<Utc>) -> String {
    format!("REIMB{:010}", now.timestamp_millis() % 10_000_000_000)
}
