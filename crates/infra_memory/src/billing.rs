//! In-memory invoice and statement stores

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use core_kernel::{BeneficiaryId, DomainPort, InvoiceId, PortError, StatementId};
use domain_billing::{
    Invoice, InvoiceStatus, InvoiceStore, ReferencePeriod, StatementStore, TaxStatement,
};

/// Invoice store backed by a `RwLock` map
///
/// Enforces the one-invoice-per-(beneficiary, period) rule at insert.
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    invoices: RwLock<HashMap<InvoiceId, Invoice>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryInvoiceStore {}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn get(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.invoices
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn insert(&self, invoice: Invoice) -> Result<(), PortError> {
        let mut invoices = self.invoices.write().await;
        let duplicate = invoices.values().any(|stored| {
            stored.beneficiary_id == invoice.beneficiary_id
                && stored.reference_period == invoice.reference_period
        });
        if duplicate {
            return Err(PortError::conflict(format!(
                "invoice for {} in {} already exists",
                invoice.beneficiary_id, invoice.reference_period
            )));
        }
        invoices.insert(invoice.id, invoice);
        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), PortError> {
        let mut invoices = self.invoices.write().await;
        let stored = invoices
            .get_mut(&invoice.id)
            .ok_or_else(|| PortError::not_found("Invoice", invoice.id))?;

        if stored.version + 1 != invoice.version {
            return Err(PortError::conflict(format!(
                "invoice {} at version {}, write carries {}",
                invoice.id, stored.version, invoice.version
            )));
        }
        *stored = invoice.clone();
        Ok(())
    }

    async fn exists_for_period(
        &self,
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
    ) -> Result<bool, PortError> {
        Ok(self.invoices.read().await.values().any(|invoice| {
            invoice.beneficiary_id == beneficiary_id && invoice.reference_period == period
        }))
    }

    async fn open_due_before(&self, date: NaiveDate) -> Result<Vec<Invoice>, PortError> {
        Ok(self
            .invoices
            .read()
            .await
            .values()
            .filter(|invoice| invoice.status == InvoiceStatus::Open && invoice.due_date < date)
            .cloned()
            .collect())
    }

    async fn open_due_on(&self, date: NaiveDate) -> Result<Vec<Invoice>, PortError> {
        Ok(self
            .invoices
            .read()
            .await
            .values()
            .filter(|invoice| invoice.status == InvoiceStatus::Open && invoice.due_date == date)
            .cloned()
            .collect())
    }

    async fn beneficiaries_with_payments_in(
        &self,
        year: i32,
    ) -> Result<Vec<BeneficiaryId>, PortError> {
        let invoices = self.invoices.read().await;
        let beneficiaries: HashSet<BeneficiaryId> = invoices
            .values()
            .filter(|invoice| {
                invoice.status == InvoiceStatus::Paid
                    && invoice
                        .payment_date
                        .is_some_and(|paid_on| paid_on.year() == year)
            })
            .map(|invoice| invoice.beneficiary_id)
            .collect();
        Ok(beneficiaries.into_iter().collect())
    }

    async fn paid_in_year(
        &self,
        beneficiary_id: BeneficiaryId,
        year: i32,
    ) -> Result<Vec<Invoice>, PortError> {
        Ok(self
            .invoices
            .read()
            .await
            .values()
            .filter(|invoice| {
                invoice.beneficiary_id == beneficiary_id
                    && invoice.status == InvoiceStatus::Paid
                    && invoice
                        .payment_date
                        .is_some_and(|paid_on| paid_on.year() == year)
            })
            .cloned()
            .collect())
    }
}

/// Statement store backed by a `RwLock` map
///
/// Enforces at most one statement per (beneficiary, year).
#[derive(Default)]
pub struct InMemoryStatementStore {
    statements: RwLock<HashMap<StatementId, TaxStatement>>,
}

impl InMemoryStatementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored statements
    pub async fn len(&self) -> usize {
        self.statements.read().await.len()
    }

    /// True when no statements are stored
    pub async fn is_empty(&self) -> bool {
        self.statements.read().await.is_empty()
    }
}

impl DomainPort for InMemoryStatementStore {}

#[async_trait]
impl StatementStore for InMemoryStatementStore {
    async fn get(&self, id: StatementId) -> Result<TaxStatement, PortError> {
        self.statements
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("TaxStatement", id))
    }

    async fn insert(&self, statement: TaxStatement) -> Result<(), PortError> {
        let mut statements = self.statements.write().await;
        let duplicate = statements.values().any(|stored| {
            stored.beneficiary_id == statement.beneficiary_id && stored.year == statement.year
        });
        if duplicate {
            return Err(PortError::conflict(format!(
                "statement for {} in {} already exists",
                statement.beneficiary_id, statement.year
            )));
        }
        statements.insert(statement.id, statement);
        Ok(())
    }

    async fn exists_for_year(
        &self,
        beneficiary_id: BeneficiaryId,
        year: i32,
    ) -> Result<bool, PortError> {
        Ok(self.statements.read().await.values().any(|statement| {
            statement.beneficiary_id == beneficiary_id && statement.year == year
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_insert_rejects_duplicate_period() {
        let store = InMemoryInvoiceStore::new();
        let beneficiary = BeneficiaryId::new();
        let period = ReferencePeriod::new(2024, 3).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();

        let (first, _) = Invoice::open(
            beneficiary,
            period,
            Money::new(dec!(550.00)),
            period.due_date(),
            now,
        );
        let (second, _) = Invoice::open(
            beneficiary,
            period,
            Money::new(dec!(550.00)),
            period.due_date(),
            now,
        );

        store.insert(first).await.unwrap();
        let result = store.insert(second).await;

        assert!(matches!(result, Err(error) if error.is_conflict()));
    }

    #[tokio::test]
    async fn test_open_due_queries_split_on_date() {
        let store = InMemoryInvoiceStore::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let period = ReferencePeriod::new(2024, 3).unwrap();

        let (invoice, _) = Invoice::open(
            BeneficiaryId::new(),
            period,
            Money::new(dec!(550.00)),
            period.due_date(),
            now,
        );
        store.insert(invoice).await.unwrap();

        let due = period.due_date();
        assert!(store.open_due_before(due).await.unwrap().is_empty());
        assert_eq!(store.open_due_on(due).await.unwrap().len(), 1);
        assert_eq!(
            store
                .open_due_before(due + chrono::Days::new(1))
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
