//! Billing domain errors

use chrono::NaiveDate;
use thiserror::Error;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    #[error("Invoice is not overdue until after {due_date}")]
    NotYetOverdue { due_date: NaiveDate },

    #[error("Invalid reference month: {month}")]
    InvalidReferenceMonth { month: u32 },
}
