//! Engine event envelope
//!
//! A single envelope over the three domains' events so the dispatcher, the
//! audit trail and the logs can treat transitions uniformly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::BeneficiaryId;
use domain_billing::BillingEvent;
use domain_guides::GuideEvent;
use domain_reimbursements::ClaimEvent;

/// Any domain event the engine can produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    Guide(GuideEvent),
    Claim(ClaimEvent),
    Billing(BillingEvent),
}

impl EngineEvent {
    /// Returns the affected beneficiary
    pub fn beneficiary_id(&self) -> BeneficiaryId {
        match self {
            EngineEvent::Guide(event) => event.beneficiary_id(),
            EngineEvent::Claim(event) => event.beneficiary_id(),
            EngineEvent::Billing(event) => event.beneficiary_id(),
        }
    }

    /// Returns the kind of entity the event concerns
    pub fn entity_kind(&self) -> &'static str {
        match self {
            EngineEvent::Guide(_) => "authorization_guide",
            EngineEvent::Claim(_) => "reimbursement_claim",
            EngineEvent::Billing(BillingEvent::StatementGenerated { .. }) => "tax_statement",
            EngineEvent::Billing(_) => "invoice",
        }
    }

    /// Returns the entity identifier as a displayable string
    pub fn entity_id(&self) -> String {
        match self {
            EngineEvent::Guide(event) => event.guide_id().to_string(),
            EngineEvent::Claim(event) => event.claim_id().to_string(),
            EngineEvent::Billing(BillingEvent::StatementGenerated { statement_id, .. }) => {
                statement_id.to_string()
            }
            EngineEvent::Billing(event) => match event {
                BillingEvent::InvoiceGenerated { invoice_id, .. }
                | BillingEvent::InvoiceOverdue { invoice_id, .. }
                | BillingEvent::InvoicePaymentConfirmed { invoice_id, .. }
                | BillingEvent::InvoicePartialPayment { invoice_id, .. }
                | BillingEvent::InvoiceCancelled { invoice_id, .. } => invoice_id.to_string(),
                BillingEvent::StatementGenerated { statement_id, .. } => statement_id.to_string(),
            },
        }
    }

    /// Old and new status names, when the event records a transition
    ///
    /// Creation events report no old status; a partial payment reports
    /// nothing because no state changed.
    pub fn statuses(&self) -> Option<(Option<&'static str>, &'static str)> {
        match self {
            EngineEvent::Guide(event) => {
                Some((Some(event.old_status().as_str()), event.new_status().as_str()))
            }
            EngineEvent::Claim(event) => {
                Some((Some(event.old_status().as_str()), event.new_status().as_str()))
            }
            EngineEvent::Billing(BillingEvent::StatementGenerated { .. }) => {
                Some((None, "GENERATED"))
            }
            EngineEvent::Billing(event) => {
                let new_status = event.new_status()?;
                Some((event.old_status().map(|s| s.as_str()), new_status.as_str()))
            }
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            EngineEvent::Guide(event) => event.timestamp(),
            EngineEvent::Claim(event) => event.timestamp(),
            EngineEvent::Billing(event) => event.timestamp(),
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::Guide(event) => event.event_type(),
            EngineEvent::Claim(event) => event.event_type(),
            EngineEvent::Billing(event) => event.event_type(),
        }
    }
}

impl From<GuideEvent> for EngineEvent {
    fn from(event: GuideEvent) -> Self {
        EngineEvent::Guide(event)
    }
}

impl From<ClaimEvent> for EngineEvent {
    fn from(event: ClaimEvent) -> Self {
        EngineEvent::Claim(event)
    }
}

impl From<BillingEvent> for EngineEvent {
    fn from(event: BillingEvent) -> Self {
        EngineEvent::Billing(event)
    }
}
