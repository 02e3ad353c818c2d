//! Billing Domain
//!
//! Monthly plan invoices for titular beneficiaries and the annual tax
//! statements built from what they actually paid. The engine generates one
//! invoice per beneficiary per reference month, flips it overdue past the
//! due date, settles it on payment and summarises the paid year every
//! January.

pub mod invoice;
pub mod statement;
pub mod events;
pub mod ports;
pub mod error;

pub use invoice::{Invoice, InvoiceStatus, ReferencePeriod};
pub use statement::TaxStatement;
pub use events::BillingEvent;
pub use ports::{InvoiceStore, StatementStore};
pub use error::BillingError;
