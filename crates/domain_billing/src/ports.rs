//! Billing store ports

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{BeneficiaryId, DomainPort, InvoiceId, PortError, StatementId};

use crate::invoice::{Invoice, ReferencePeriod};
use crate::statement::TaxStatement;

/// Store for invoices
///
/// `insert` must enforce at most one invoice per (beneficiary, period) with
/// [`PortError::Conflict`]; `update` must reject any write whose version is
/// not exactly one ahead of the stored version.
#[async_trait]
pub trait InvoiceStore: DomainPort {
    /// Loads an invoice by ID
    async fn get(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Inserts a freshly generated invoice
    async fn insert(&self, invoice: Invoice) -> Result<(), PortError>;

    /// Writes a transitioned invoice, enforcing the version counter
    async fn update(&self, invoice: &Invoice) -> Result<(), PortError>;

    /// Whether an invoice already exists for the beneficiary and period
    async fn exists_for_period(
        &self,
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
    ) -> Result<bool, PortError>;

    /// Open invoices whose due date lies strictly before the given date
    async fn open_due_before(&self, date: NaiveDate) -> Result<Vec<Invoice>, PortError>;

    /// Open invoices due exactly on the given date
    async fn open_due_on(&self, date: NaiveDate) -> Result<Vec<Invoice>, PortError>;

    /// Beneficiaries with at least one invoice paid during the year
    async fn beneficiaries_with_payments_in(
        &self,
        year: i32,
    ) -> Result<Vec<BeneficiaryId>, PortError>;

    /// All invoices of the beneficiary paid during the year
    async fn paid_in_year(
        &self,
        beneficiary_id: BeneficiaryId,
        year: i32,
    ) -> Result<Vec<Invoice>, PortError>;
}

/// Store for annual tax statements
#[async_trait]
pub trait StatementStore: DomainPort {
    /// Loads a statement by ID
    async fn get(&self, id: StatementId) -> Result<TaxStatement, PortError>;

    /// Inserts a statement; at most one per (beneficiary, year)
    async fn insert(&self, statement: TaxStatement) -> Result<(), PortError>;

    /// Whether a statement already exists for the beneficiary and year
    async fn exists_for_year(
        &self,
        beneficiary_id: BeneficiaryId,
        year: i32,
    ) -> Result<bool, PortError>;
}
