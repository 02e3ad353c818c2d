//! Behavioral tests for the billing domain

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{BeneficiaryId, Money};
use domain_billing::{BillingEvent, Invoice, InvoiceStatus, ReferencePeriod, TaxStatement};

#[test]
fn invoice_forward_only_lifecycle() {
    let now = Utc.with_ymd_and_hms(2024, 4, 1, 1, 0, 0).unwrap();
    let period = ReferencePeriod::new(2024, 4).unwrap();
    let (mut invoice, generated) = Invoice::open(
        BeneficiaryId::new(),
        period,
        Money::new(dec!(620.00)),
        period.due_date(),
        now,
    );

    assert_eq!(generated.new_status(), Some(InvoiceStatus::Open));

    // overdue on the 11th, settled on the 15th
    let overdue_day = NaiveDate::from_ymd_opt(2024, 4, 11).unwrap();
    let overdue = invoice.flag_overdue(overdue_day, now).unwrap();
    assert!(matches!(
        overdue,
        BillingEvent::InvoiceOverdue { days_overdue: 1, .. }
    ));

    let paid_on = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
    invoice
        .apply_payment(Money::new(dec!(620.00)), paid_on, now)
        .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.payment_date, Some(paid_on));
    assert_eq!(invoice.version, 3);

    // no way back
    assert!(invoice.flag_overdue(overdue_day, now).is_err());
    assert!(invoice.cancel(now).is_err());
}

#[test]
fn statement_covers_a_full_billing_year() {
    let beneficiary = BeneficiaryId::new();
    let issued = Utc.with_ymd_and_hms(2023, 1, 1, 1, 0, 0).unwrap();
    let generated_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();

    let invoices: Vec<Invoice> = (1..=12)
        .map(|month| {
            let period = ReferencePeriod::new(2023, month).unwrap();
            let (mut invoice, _) = Invoice::open(
                beneficiary,
                period,
                Money::new(dec!(550.00)),
                period.due_date(),
                issued,
            );
            invoice
                .apply_payment(Money::new(dec!(550.00)), period.due_date(), issued)
                .unwrap();
            invoice
        })
        .collect();

    let (statement, _) =
        TaxStatement::from_paid_invoices(beneficiary, 2023, &invoices, generated_at).unwrap();

    assert_eq!(statement.total_paid, Money::new(dec!(6600.00)));
    assert_eq!(statement.monthly_breakdown.len(), 12);
    assert!(statement
        .monthly_breakdown
        .values()
        .all(|m| *m == Money::new(dec!(550.00))));
}
