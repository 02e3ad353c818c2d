//! Audit records
//!
//! Every committed transition leaves one audit record: which entity, which
//! statuses, who acted, and when. Automatic transitions are recorded under
//! the system actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::AuditEventId;

use crate::event::EngineEvent;

/// Actor recorded for transitions the engine applies on its own
pub const SYSTEM_ACTOR: &str = "system";

/// One entry in the audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditEventId,
    /// Entity kind ("authorization_guide", "reimbursement_claim", ...)
    pub entity_kind: String,
    /// Entity identifier
    pub entity_id: String,
    /// Status before the transition; absent for creations
    pub old_status: Option<String>,
    /// Status after the transition
    pub new_status: String,
    /// Who caused the transition
    pub actor: String,
    /// When the transition happened
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Builds the audit record for an event, if it records a transition
    ///
    /// Events that change no state (a partial payment) leave no trail.
    pub fn from_event(event: &EngineEvent, actor: &str) -> Option<AuditRecord> {
        let (old_status, new_status) = event.statuses()?;

        Some(AuditRecord {
            id: AuditEventId::new_v7(),
            entity_kind: event.entity_kind().to_string(),
            entity_id: event.entity_id(),
            old_status: old_status.map(str::to_string),
            new_status: new_status.to_string(),
            actor: actor.to_string(),
            occurred_at: event.timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::{BeneficiaryId, InvoiceId, Money};
    use domain_billing::{BillingEvent, ReferencePeriod};
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_payment_leaves_no_trail() {
        let event = EngineEvent::Billing(BillingEvent::InvoicePartialPayment {
            invoice_id: InvoiceId::new(),
            beneficiary_id: BeneficiaryId::new(),
            period: ReferencePeriod::new(2024, 3).unwrap(),
            amount_paid: Money::new(dec!(100.00)),
            remaining: Money::new(dec!(400.00)),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0).unwrap(),
        });

        assert!(AuditRecord::from_event(&event, SYSTEM_ACTOR).is_none());
    }

    #[test]
    fn test_generation_audits_without_old_status() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let event = EngineEvent::Billing(BillingEvent::InvoiceGenerated {
            invoice_id: InvoiceId::new(),
            beneficiary_id: BeneficiaryId::new(),
            period: ReferencePeriod::new(2024, 3).unwrap(),
            amount: Money::new(dec!(550.00)),
            due_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            timestamp,
        });

        let record = AuditRecord::from_event(&event, SYSTEM_ACTOR).unwrap();

        assert_eq!(record.entity_kind, "invoice");
        assert!(record.old_status.is_none());
        assert_eq!(record.new_status, "OPEN");
        assert_eq!(record.actor, "system");
        assert_eq!(record.occurred_at, timestamp);
    }
}
