//! Invoice aggregate

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BeneficiaryId, InvoiceId, Money};

use crate::error::BillingError;
use crate::events::BillingEvent;

/// Day of the month invoices fall due
pub const INVOICE_DUE_DAY: u32 = 10;

/// A billing reference period (month/year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferencePeriod {
    pub year: i32,
    pub month: u32,
}

impl ReferencePeriod {
    /// Creates a period; months outside 1..=12 are rejected
    pub fn new(year: i32, month: u32) -> Result<Self, BillingError> {
        if !(1..=12).contains(&month) {
            return Err(BillingError::InvalidReferenceMonth { month });
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the period
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated month always forms a date")
    }

    /// The standard due date for invoices of this period
    pub fn due_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, INVOICE_DUE_DAY)
            .expect("validated month always forms a date")
    }
}

impl fmt::Display for ReferencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Issued, awaiting payment
    Open,
    /// Paid in full
    Paid,
    /// Past the due date without full payment
    Overdue,
    /// Cancelled
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Open => "OPEN",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    /// True for states that accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monthly plan invoice
///
/// The store enforces at most one invoice per (beneficiary, period).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Billed beneficiary (always a titular)
    pub beneficiary_id: BeneficiaryId,
    /// Reference period
    pub reference_period: ReferencePeriod,
    /// Total amount due
    pub amount: Money,
    /// Due date
    pub due_date: NaiveDate,
    /// Date the invoice was settled
    pub payment_date: Option<NaiveDate>,
    /// Status
    pub status: InvoiceStatus,
    /// Optimistic version counter, bumped by every transition
    pub version: u64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Opens a new invoice and returns it with its generation event
    pub fn open(
        beneficiary_id: BeneficiaryId,
        reference_period: ReferencePeriod,
        amount: Money,
        due_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> (Self, BillingEvent) {
        let invoice = Self {
            id: InvoiceId::new_v7(),
            beneficiary_id,
            reference_period,
            amount,
            due_date,
            payment_date: None,
            status: InvoiceStatus::Open,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        let event = BillingEvent::InvoiceGenerated {
            invoice_id: invoice.id,
            beneficiary_id,
            period: reference_period,
            amount,
            due_date,
            timestamp: now,
        };
        (invoice, event)
    }

    /// Flags an open invoice as overdue
    ///
    /// Fails with [`BillingError::NotYetOverdue`] while the due date has not
    /// passed, so a misconfigured sweep cannot flag early.
    pub fn flag_overdue(
        &mut self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<BillingEvent, BillingError> {
        self.ensure_transition(InvoiceStatus::Overdue)?;
        if self.due_date >= today {
            return Err(BillingError::NotYetOverdue {
                due_date: self.due_date,
            });
        }

        let old_status = self.status;
        let days_overdue = (today - self.due_date).num_days();
        self.status = InvoiceStatus::Overdue;
        self.touch(now);

        Ok(BillingEvent::InvoiceOverdue {
            invoice_id: self.id,
            beneficiary_id: self.beneficiary_id,
            period: self.reference_period,
            amount: self.amount,
            days_overdue,
            old_status,
            timestamp: now,
        })
    }

    /// Applies a payment reported by the payment collaborator
    ///
    /// A payment covering the full amount settles the invoice. A smaller
    /// payment changes no state; the returned event only notifies the
    /// beneficiary of the remaining balance.
    pub fn apply_payment(
        &mut self,
        amount_paid: Money,
        paid_on: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<BillingEvent, BillingError> {
        if amount_paid >= self.amount {
            self.ensure_transition(InvoiceStatus::Paid)?;

            let old_status = self.status;
            self.status = InvoiceStatus::Paid;
            self.payment_date = Some(paid_on);
            self.touch(now);

            return Ok(BillingEvent::InvoicePaymentConfirmed {
                invoice_id: self.id,
                beneficiary_id: self.beneficiary_id,
                period: self.reference_period,
                amount_paid,
                old_status,
                timestamp: now,
            });
        }

        // partial payments do not transition; the invoice stays collectible
        if self.status.is_terminal() {
            return Err(BillingError::InvalidStatusTransition {
                from: self.status,
                to: InvoiceStatus::Paid,
            });
        }
        let remaining = self.amount - amount_paid;
        Ok(BillingEvent::InvoicePartialPayment {
            invoice_id: self.id,
            beneficiary_id: self.beneficiary_id,
            period: self.reference_period,
            amount_paid,
            remaining,
            timestamp: now,
        })
    }

    /// Cancels an open invoice
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<BillingEvent, BillingError> {
        self.ensure_transition(InvoiceStatus::Cancelled)?;

        let old_status = self.status;
        self.status = InvoiceStatus::Cancelled;
        self.touch(now);

        Ok(BillingEvent::InvoiceCancelled {
            invoice_id: self.id,
            beneficiary_id: self.beneficiary_id,
            period: self.reference_period,
            old_status,
            timestamp: now,
        })
    }

    /// Checks the legal-transition table
    fn can_transition_to(&self, target: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self.status, target),
            (Open, Paid) | (Open, Overdue) | (Open, Cancelled) | (Overdue, Paid)
        )
    }

    fn ensure_transition(&self, target: InvoiceStatus) -> Result<(), BillingError> {
        if !self.can_transition_to(target) {
            return Err(BillingError::InvalidStatusTransition {
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn open_invoice() -> Invoice {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let period = ReferencePeriod::new(2024, 3).unwrap();
        let (invoice, _) = Invoice::open(
            BeneficiaryId::new(),
            period,
            Money::new(dec!(750.00)),
            period.due_date(),
            now,
        );
        invoice
    }

    #[test]
    fn test_reference_period_display_and_due_date() {
        let period = ReferencePeriod::new(2024, 3).unwrap();

        assert_eq!(period.to_string(), "03/2024");
        assert_eq!(
            period.due_date(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        assert!(ReferencePeriod::new(2024, 13).is_err());
    }

    #[test]
    fn test_open_invoice_starts_open() {
        let invoice = open_invoice();

        assert_eq!(invoice.status, InvoiceStatus::Open);
        assert_eq!(invoice.version, 1);
        assert!(invoice.payment_date.is_none());
    }

    #[test]
    fn test_flag_overdue_computes_days() {
        let mut invoice = open_invoice();
        let now = Utc.with_ymd_and_hms(2024, 3, 13, 2, 0, 0).unwrap();

        let event = invoice.flag_overdue(now.date_naive(), now).unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Overdue);
        assert!(matches!(
            event,
            BillingEvent::InvoiceOverdue { days_overdue: 3, .. }
        ));
    }

    #[test]
    fn test_flag_overdue_rejects_before_due_date() {
        let mut invoice = open_invoice();
        let on_due_day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let result = invoice.flag_overdue(on_due_day, invoice.created_at);

        assert!(matches!(result, Err(BillingError::NotYetOverdue { .. })));
        assert_eq!(invoice.status, InvoiceStatus::Open);
    }

    #[test]
    fn test_full_payment_settles_from_open_and_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let paid_on = now.date_naive();

        let mut open = open_invoice();
        open.apply_payment(Money::new(dec!(750.00)), paid_on, now).unwrap();
        assert_eq!(open.status, InvoiceStatus::Paid);
        assert_eq!(open.payment_date, Some(paid_on));

        let mut overdue = open_invoice();
        overdue.flag_overdue(paid_on, now).unwrap();
        overdue.apply_payment(Money::new(dec!(800.00)), paid_on, now).unwrap();
        assert_eq!(overdue.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_partial_payment_keeps_invoice_collectible() {
        let mut invoice = open_invoice();
        let now = invoice.created_at;
        let paid_on = now.date_naive();

        let event = invoice
            .apply_payment(Money::new(dec!(300.00)), paid_on, now)
            .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Open);
        assert_eq!(invoice.version, 1);
        assert!(invoice.payment_date.is_none());
        assert!(matches!(
            event,
            BillingEvent::InvoicePartialPayment { remaining, .. }
                if remaining == Money::new(dec!(450.00))
        ));
    }

    #[test]
    fn test_paid_invoice_rejects_further_transitions() {
        let mut invoice = open_invoice();
        let now = invoice.created_at;
        invoice
            .apply_payment(Money::new(dec!(750.00)), now.date_naive(), now)
            .unwrap();

        assert!(invoice.cancel(now).is_err());
        assert!(invoice.flag_overdue(now.date_naive(), now).is_err());
    }
}
