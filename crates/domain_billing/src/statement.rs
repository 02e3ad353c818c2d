//! Annual tax statements
//!
//! Every January the engine summarises what each beneficiary paid the plan
//! in the prior year. Health-plan payments are fully deductible, so the
//! deductible amount equals the total paid.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{BeneficiaryId, Money, StatementId};

use crate::events::BillingEvent;
use crate::invoice::{Invoice, InvoiceStatus};

/// An annual tax statement for one beneficiary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxStatement {
    /// Unique identifier
    pub id: StatementId,
    /// Beneficiary
    pub beneficiary_id: BeneficiaryId,
    /// Calendar year covered
    pub year: i32,
    /// Total paid across the year
    pub total_paid: Money,
    /// Deductible amount (equals total paid)
    pub deductible_amount: Money,
    /// Amount paid per month, keyed 1..=12
    pub monthly_breakdown: BTreeMap<u32, Money>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl TaxStatement {
    /// Builds a statement from the beneficiary's invoices paid in `year`
    ///
    /// Returns `None` when no invoice qualifies, so no empty statements are
    /// ever issued. The returned event announces the statement to the
    /// beneficiary.
    pub fn from_paid_invoices(
        beneficiary_id: BeneficiaryId,
        year: i32,
        invoices: &[Invoice],
        now: DateTime<Utc>,
    ) -> Option<(Self, BillingEvent)> {
        let mut total_paid = Money::zero();
        let mut monthly_breakdown: BTreeMap<u32, Money> = BTreeMap::new();

        for invoice in invoices {
            let Some(paid_on) = invoice.payment_date else {
                continue;
            };
            if invoice.status != InvoiceStatus::Paid || paid_on.year() != year {
                continue;
            }
            total_paid += invoice.amount;
            let month_total = monthly_breakdown.entry(paid_on.month()).or_insert(Money::zero());
            *month_total += invoice.amount;
        }

        if monthly_breakdown.is_empty() {
            return None;
        }

        let statement = Self {
            id: StatementId::new_v7(),
            beneficiary_id,
            year,
            total_paid,
            deductible_amount: total_paid,
            monthly_breakdown,
            created_at: now,
        };
        let event = BillingEvent::StatementGenerated {
            statement_id: statement.id,
            beneficiary_id,
            year,
            total_paid,
            timestamp: now,
        };
        Some((statement, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::ReferencePeriod;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn paid_invoice(
        beneficiary_id: BeneficiaryId,
        period: ReferencePeriod,
        amount: Money,
        paid_on: NaiveDate,
    ) -> Invoice {
        let now = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let (mut invoice, _) = Invoice::open(beneficiary_id, period, amount, period.due_date(), now);
        invoice.apply_payment(amount, paid_on, now).unwrap();
        invoice
    }

    #[test]
    fn test_statement_sums_paid_invoices_by_month() {
        let beneficiary = BeneficiaryId::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();

        let invoices = vec![
            paid_invoice(
                beneficiary,
                ReferencePeriod::new(2023, 1).unwrap(),
                Money::new(dec!(500.00)),
                NaiveDate::from_ymd_opt(2023, 1, 9).unwrap(),
            ),
            paid_invoice(
                beneficiary,
                ReferencePeriod::new(2023, 2).unwrap(),
                Money::new(dec!(500.00)),
                NaiveDate::from_ymd_opt(2023, 2, 8).unwrap(),
            ),
            // paid late, in the same month as the february one
            paid_invoice(
                beneficiary,
                ReferencePeriod::new(2023, 3).unwrap(),
                Money::new(dec!(500.00)),
                NaiveDate::from_ymd_opt(2023, 2, 20).unwrap(),
            ),
        ];

        let (statement, event) =
            TaxStatement::from_paid_invoices(beneficiary, 2023, &invoices, now).unwrap();

        assert_eq!(statement.total_paid, Money::new(dec!(1500.00)));
        assert_eq!(statement.deductible_amount, statement.total_paid);
        assert_eq!(statement.monthly_breakdown[&1], Money::new(dec!(500.00)));
        assert_eq!(statement.monthly_breakdown[&2], Money::new(dec!(1000.00)));
        assert!(matches!(event, BillingEvent::StatementGenerated { year: 2023, .. }));
    }

    #[test]
    fn test_no_statement_without_qualifying_invoices() {
        let beneficiary = BeneficiaryId::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();

        // open invoice only: nothing paid in 2023
        let period = ReferencePeriod::new(2023, 5).unwrap();
        let (open_invoice, _) = Invoice::open(
            beneficiary,
            period,
            Money::new(dec!(500.00)),
            period.due_date(),
            now,
        );

        assert!(
            TaxStatement::from_paid_invoices(beneficiary, 2023, &[open_invoice], now).is_none()
        );
    }

    #[test]
    fn test_payments_outside_year_are_excluded() {
        let beneficiary = BeneficiaryId::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();

        // december invoice settled in january of the next year
        let invoice = paid_invoice(
            beneficiary,
            ReferencePeriod::new(2023, 12).unwrap(),
            Money::new(dec!(500.00)),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        );

        assert!(TaxStatement::from_paid_invoices(beneficiary, 2023, &[invoice], now).is_none());
    }
}
