//! Domain events for billing

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BeneficiaryId, InvoiceId, Money, StatementId};

use crate::invoice::{InvoiceStatus, ReferencePeriod};

/// Domain events emitted by invoices and statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BillingEvent {
    /// A monthly invoice was generated
    InvoiceGenerated {
        invoice_id: InvoiceId,
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
        amount: Money,
        due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// An open invoice passed its due date
    InvoiceOverdue {
        invoice_id: InvoiceId,
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
        amount: Money,
        days_overdue: i64,
        old_status: InvoiceStatus,
        timestamp: DateTime<Utc>,
    },

    /// Full payment confirmed
    InvoicePaymentConfirmed {
        invoice_id: InvoiceId,
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
        amount_paid: Money,
        old_status: InvoiceStatus,
        timestamp: DateTime<Utc>,
    },

    /// Partial payment received; invoice unchanged
    InvoicePartialPayment {
        invoice_id: InvoiceId,
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
        amount_paid: Money,
        remaining: Money,
        timestamp: DateTime<Utc>,
    },

    /// Invoice cancelled
    InvoiceCancelled {
        invoice_id: InvoiceId,
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
        old_status: InvoiceStatus,
        timestamp: DateTime<Utc>,
    },

    /// An annual tax statement was generated
    StatementGenerated {
        statement_id: StatementId,
        beneficiary_id: BeneficiaryId,
        year: i32,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },
}

impl BillingEvent {
    /// Returns the affected beneficiary
    pub fn beneficiary_id(&self) -> BeneficiaryId {
        match self {
            BillingEvent::InvoiceGenerated { beneficiary_id, .. } => *beneficiary_id,
            BillingEvent::InvoiceOverdue { beneficiary_id, .. } => *beneficiary_id,
            BillingEvent::InvoicePaymentConfirmed { beneficiary_id, .. } => *beneficiary_id,
            BillingEvent::InvoicePartialPayment { beneficiary_id, .. } => *beneficiary_id,
            BillingEvent::InvoiceCancelled { beneficiary_id, .. } => *beneficiary_id,
            BillingEvent::StatementGenerated { beneficiary_id, .. } => *beneficiary_id,
        }
    }

    /// Returns the status before the transition, when one applies
    pub fn old_status(&self) -> Option<InvoiceStatus> {
        match self {
            BillingEvent::InvoiceGenerated { .. } => None,
            BillingEvent::InvoiceOverdue { old_status, .. } => Some(*old_status),
            BillingEvent::InvoicePaymentConfirmed { old_status, .. } => Some(*old_status),
            BillingEvent::InvoicePartialPayment { .. } => None,
            BillingEvent::InvoiceCancelled { old_status, .. } => Some(*old_status),
            BillingEvent::StatementGenerated { .. } => None,
        }
    }

    /// Returns the status after the transition; `None` when no state changed
    pub fn new_status(&self) -> Option<InvoiceStatus> {
        match self {
            BillingEvent::InvoiceGenerated { .. } => Some(InvoiceStatus::Open),
            BillingEvent::InvoiceOverdue { .. } => Some(InvoiceStatus::Overdue),
            BillingEvent::InvoicePaymentConfirmed { .. } => Some(InvoiceStatus::Paid),
            BillingEvent::InvoicePartialPayment { .. } => None,
            BillingEvent::InvoiceCancelled { .. } => Some(InvoiceStatus::Cancelled),
            BillingEvent::StatementGenerated { .. } => None,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            BillingEvent::InvoiceGenerated { timestamp, .. } => *timestamp,
            BillingEvent::InvoiceOverdue { timestamp, .. } => *timestamp,
            BillingEvent::InvoicePaymentConfirmed { timestamp, .. } => *timestamp,
            BillingEvent::InvoicePartialPayment { timestamp, .. } => *timestamp,
            BillingEvent::InvoiceCancelled { timestamp, .. } => *timestamp,
            BillingEvent::StatementGenerated { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            BillingEvent::InvoiceGenerated { .. } => "InvoiceGenerated",
            BillingEvent::InvoiceOverdue { .. } => "InvoiceOverdue",
            BillingEvent::InvoicePaymentConfirmed { .. } => "InvoicePaymentConfirmed",
            BillingEvent::InvoicePartialPayment { .. } => "InvoicePartialPayment",
            BillingEvent::InvoiceCancelled { .. } => "InvoiceCancelled",
            BillingEvent::StatementGenerated { .. } => "StatementGenerated",
        }
    }
}
