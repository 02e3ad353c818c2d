//! Claim adjudication policy
//!
//! The fixed auto-adjudication catalog, evaluated top to bottom with the
//! first matching rule winning. Denial rules come first, then the two
//! auto-approval rules; anything that falls through stays in analysis for a
//! human reviewer.
//!
//! The policy is pure: the current date and the attached document set are
//! facts supplied by the caller, never read from the environment. Given the
//! same claim and facts it always returns the same decision.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::{Money, Rate};

use crate::claim::{ClaimStatus, DocumentType, ExpenseType, ReimbursementClaim};

/// Claims older than this many days are out of the reimbursement window
pub const REIMBURSEMENT_WINDOW_DAYS: u64 = 90;

/// Auto-approval ceiling for consultations and exams
pub const CONSULTATION_EXAM_CEILING: Decimal = dec!(500.00);

/// Auto-approval ceiling for medication
pub const MEDICATION_CEILING: Decimal = dec!(200.00);

/// Coverage applied to auto-approved consultations and exams
pub const CONSULTATION_EXAM_COVERAGE: Rate = Rate::new(dec!(0.80));

/// Coverage applied to auto-approved medication
pub const MEDICATION_COVERAGE: Rate = Rate::new(dec!(0.60));

/// Facts the policy needs beyond the claim itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFacts {
    /// Whether the beneficiary is active in the plan
    pub beneficiary_active: bool,
    /// The current date
    pub today: NaiveDate,
    /// Document types attached to the claim
    pub documents: BTreeSet<DocumentType>,
}

/// Why a claim was denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimDenialReason {
    /// Beneficiary not active at request time
    BeneficiaryInactive,
    /// Service date lies in the future
    FutureServiceDate,
    /// Past the 90-day reimbursement window
    WindowExpired,
    /// No invoice or receipt attached
    MissingInvoice,
    /// Manual denial by a reviewer
    Manual(String),
}

impl ClaimDenialReason {
    /// Human-readable description, as shown to the beneficiary
    pub fn description(&self) -> &str {
        match self {
            ClaimDenialReason::BeneficiaryInactive => {
                "Beneficiário não está ativo no momento do pedido"
            }
            ClaimDenialReason::FutureServiceDate => {
                "Data do atendimento é posterior à data atual"
            }
            ClaimDenialReason::WindowExpired => {
                "Prazo para solicitação de reembolso expirado (máximo 90 dias)"
            }
            ClaimDenialReason::MissingInvoice => "Nota fiscal ou recibo não anexado",
            ClaimDenialReason::Manual(text) => text,
        }
    }
}

/// Outcome of evaluating the claim policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDecision {
    /// Approve at the given coverage rate
    Approve { approved_amount: Money, rate: Rate },
    /// Deny with a reason
    Deny(ClaimDenialReason),
    /// Leave in analysis for manual review
    Hold,
}

/// A single policy rule: returns a decision when it matches
pub struct ClaimRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    matcher: fn(&ReimbursementClaim, &ClaimFacts) -> Option<ClaimDecision>,
}

impl ClaimRule {
    /// Evaluates this rule against a claim
    pub fn evaluate(
        &self,
        claim: &ReimbursementClaim,
        facts: &ClaimFacts,
    ) -> Option<ClaimDecision> {
        (self.matcher)(claim, facts)
    }
}

fn approve_at(claim: &ReimbursementClaim, rate: Rate) -> ClaimDecision {
    ClaimDecision::Approve {
        approved_amount: claim.requested_amount.apply_rate(rate),
        rate,
    }
}

static RULES: [ClaimRule; 6] = [
    ClaimRule {
        name: "deny_inactive_beneficiary",
        matcher: |_, facts| {
            (!facts.beneficiary_active)
                .then(|| ClaimDecision::Deny(ClaimDenialReason::BeneficiaryInactive))
        },
    },
    ClaimRule {
        name: "deny_future_service_date",
        matcher: |claim, facts| {
            (claim.service_date > facts.today)
                .then(|| ClaimDecision::Deny(ClaimDenialReason::FutureServiceDate))
        },
    },
    ClaimRule {
        name: "deny_expired_window",
        matcher: |claim, facts| {
            let window_start = facts.today - Days::new(REIMBURSEMENT_WINDOW_DAYS);
            (claim.service_date < window_start)
                .then(|| ClaimDecision::Deny(ClaimDenialReason::WindowExpired))
        },
    },
    ClaimRule {
        name: "deny_missing_invoice",
        matcher: |_, facts| {
            (!facts.documents.contains(&DocumentType::Invoice))
                .then(|| ClaimDecision::Deny(ClaimDenialReason::MissingInvoice))
        },
    },
    ClaimRule {
        name: "approve_low_value_consultation_exam",
        matcher: |claim, _| {
            let eligible = matches!(
                claim.expense_type,
                ExpenseType::Consultation | ExpenseType::Exam
            ) && claim.requested_amount.amount() <= CONSULTATION_EXAM_CEILING;
            eligible.then(|| approve_at(claim, CONSULTATION_EXAM_COVERAGE))
        },
    },
    ClaimRule {
        name: "approve_low_value_medication",
        matcher: |claim, facts| {
            let eligible = claim.expense_type == ExpenseType::Medication
                && claim.requested_amount.amount() <= MEDICATION_CEILING
                && facts.documents.contains(&DocumentType::Prescription);
            eligible.then(|| approve_at(claim, MEDICATION_COVERAGE))
        },
    },
];

/// The claim adjudication policy
pub struct ClaimPolicy;

impl ClaimPolicy {
    /// The ordered rule catalog
    pub fn rules() -> &'static [ClaimRule] {
        &RULES
    }

    /// Evaluates the catalog, first match wins; no match means Hold
    ///
    /// Only claims still in analysis are adjudicated; anything else holds
    /// where it is.
    pub fn evaluate(claim: &ReimbursementClaim, facts: &ClaimFacts) -> ClaimDecision {
        if claim.status != ClaimStatus::InAnalysis {
            return ClaimDecision::Hold;
        }
        for rule in Self::rules() {
            if let Some(decision) = rule.evaluate(claim, facts) {
                return decision;
            }
        }
        ClaimDecision::Hold
    }
}
