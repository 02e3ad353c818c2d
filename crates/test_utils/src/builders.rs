//! Test data builders

use chrono::{DateTime, Days, NaiveDate, Utc};

use core_kernel::{BeneficiaryId, Money, ProcedureId, ProviderId};
use domain_billing::{BillingEvent, Invoice, ReferencePeriod};
use domain_guides::{AuthorizationGuide, GuideType, ProcedureLine};
use domain_reimbursements::{ExpenseType, ReimbursementClaim};

use crate::fixtures::{MoneyFixtures, TemporalFixtures, TextFixtures};

/// Builder for authorization guides
pub struct GuideBuilder {
    guide_type: GuideType,
    beneficiary_id: BeneficiaryId,
    provider_id: ProviderId,
    procedures: Vec<ProcedureLine>,
    diagnosis: String,
    requested_at: DateTime<Utc>,
}

impl Default for GuideBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GuideBuilder {
    /// Creates a builder with default values: a single-procedure
    /// consultation requested at the base instant
    pub fn new() -> Self {
        Self {
            guide_type: GuideType::Consultation,
            beneficiary_id: BeneficiaryId::new(),
            provider_id: ProviderId::new(),
            procedures: vec![ProcedureLine::new(
                ProcedureId::new(),
                1,
                MoneyFixtures::small_expense(),
            )],
            diagnosis: TextFixtures::diagnosis(),
            requested_at: TemporalFixtures::base_instant(),
        }
    }

    /// Sets the guide type
    pub fn with_type(mut self, guide_type: GuideType) -> Self {
        self.guide_type = guide_type;
        self
    }

    /// Sets the beneficiary
    pub fn with_beneficiary(mut self, id: BeneficiaryId) -> Self {
        self.beneficiary_id = id;
        self
    }

    /// Sets the provider
    pub fn with_provider(mut self, id: ProviderId) -> Self {
        self.provider_id = id;
        self
    }

    /// Replaces the procedure lines
    pub fn with_procedures(mut self, procedures: Vec<ProcedureLine>) -> Self {
        self.procedures = procedures;
        self
    }

    /// Adds a procedure line
    pub fn with_procedure(mut self, quantity: u32, unit_price: Money) -> Self {
        self.procedures
            .push(ProcedureLine::new(ProcedureId::new(), quantity, unit_price));
        self
    }

    /// Sets the request instant
    pub fn requested_at(mut self, instant: DateTime<Utc>) -> Self {
        self.requested_at = instant;
        self
    }

    /// Builds a pending guide
    pub fn build(self) -> AuthorizationGuide {
        AuthorizationGuide::request(
            self.guide_type,
            self.beneficiary_id,
            self.provider_id,
            self.procedures,
            self.diagnosis,
            self.requested_at,
        )
    }

    /// Builds a guide already authorized in full at the request instant
    pub fn build_authorized(self) -> AuthorizationGuide {
        let now = self.requested_at;
        let mut guide = self.build();
        guide
            .authorize_in_full(now)
            .expect("fresh pending guide always authorizes");
        guide
    }
}

/// Builder for reimbursement claims
pub struct ClaimBuilder {
    beneficiary_id: BeneficiaryId,
    expense_type: ExpenseType,
    service_date: NaiveDate,
    service_description: String,
    requested_amount: Money,
    requested_at: DateTime<Utc>,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// Creates a builder with default values: a small exam expense from
    /// ten days before the base instant
    pub fn new() -> Self {
        let requested_at = TemporalFixtures::base_instant();
        Self {
            beneficiary_id: BeneficiaryId::new(),
            expense_type: ExpenseType::Exam,
            service_date: requested_at.date_naive() - Days::new(10),
            service_description: TextFixtures::service_description(),
            requested_amount: MoneyFixtures::small_expense(),
            requested_at,
        }
    }

    /// Sets the beneficiary
    pub fn with_beneficiary(mut self, id: BeneficiaryId) -> Self {
        self.beneficiary_id = id;
        self
    }

    /// Sets the expense type
    pub fn with_expense_type(mut self, expense_type: ExpenseType) -> Self {
        self.expense_type = expense_type;
        self
    }

    /// Sets the service date
    pub fn with_service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = date;
        self
    }

    /// Sets the requested amount
    pub fn with_requested_amount(mut self, amount: Money) -> Self {
        self.requested_amount = amount;
        self
    }

    /// Sets the submission instant
    pub fn requested_at(mut self, instant: DateTime<Utc>) -> Self {
        self.requested_at = instant;
        self
    }

    /// Builds a claim in analysis
    pub fn build(self) -> ReimbursementClaim {
        ReimbursementClaim::submit(
            self.beneficiary_id,
            self.expense_type,
            self.service_date,
            self.service_description,
            self.requested_amount,
            self.requested_at,
        )
    }
}

/// Builder for invoices
pub struct InvoiceBuilder {
    beneficiary_id: BeneficiaryId,
    period: ReferencePeriod,
    amount: Money,
    due_date: Option<NaiveDate>,
    opened_at: DateTime<Utc>,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    /// Creates a builder for the base instant's reference period
    pub fn new() -> Self {
        let opened_at = TemporalFixtures::base_instant();
        Self {
            beneficiary_id: BeneficiaryId::new(),
            period: ReferencePeriod::containing(opened_at.date_naive()),
            amount: MoneyFixtures::monthly_fee(),
            due_date: None,
            opened_at,
        }
    }

    /// Sets the beneficiary
    pub fn with_beneficiary(mut self, id: BeneficiaryId) -> Self {
        self.beneficiary_id = id;
        self
    }

    /// Sets the reference period
    pub fn with_period(mut self, period: ReferencePeriod) -> Self {
        self.period = period;
        self
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Overrides the due date (defaults to the period's standard due date)
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the generation instant
    pub fn opened_at(mut self, instant: DateTime<Utc>) -> Self {
        self.opened_at = instant;
        self
    }

    /// Builds an open invoice, discarding the generation event
    pub fn build(self) -> Invoice {
        self.build_with_event().0
    }

    /// Builds an open invoice along with its generation event
    pub fn build_with_event(self) -> (Invoice, BillingEvent) {
        let due_date = self.due_date.unwrap_or_else(|| self.period.due_date());
        Invoice::open(
            self.beneficiary_id,
            self.period,
            self.amount,
            due_date,
            self.opened_at,
        )
    }

    /// Builds an invoice already settled on the given date
    pub fn build_paid(self, paid_on: NaiveDate) -> Invoice {
        let opened_at = self.opened_at;
        let mut invoice = self.build();
        invoice
            .apply_payment(invoice.amount, paid_on, opened_at)
            .expect("open invoice always accepts full payment");
        invoice
    }
}
