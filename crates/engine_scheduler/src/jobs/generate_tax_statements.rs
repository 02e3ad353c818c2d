//! GenerateAnnualTaxStatements sweep

use async_trait::async_trait;
use chrono::Datelike;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

use core_kernel::{BeneficiaryId, Clock};
use domain_billing::{InvoiceStore, StatementStore, TaxStatement};
use engine_adjudication::LeaseGuard;
use engine_dispatch::Dispatcher;

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Issues the prior year's tax statement for every beneficiary who paid
/// at least one invoice in it
pub struct GenerateAnnualTaxStatements {
    invoices: Arc<dyn InvoiceStore>,
    statements: Arc<dyn StatementStore>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl GenerateAnnualTaxStatements {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        statements: Arc<dyn StatementStore>,
        guard: Arc<dyn LeaseGuard>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            invoices,
            statements,
            guard,
            dispatcher,
            clock,
        }
    }

    async fn generate_one(&self, beneficiary_id: BeneficiaryId, year: i32) -> EntityOutcome {
        let lease_key = format!("statement:{beneficiary_id}:{year}");
        if !self.guard.try_claim(&lease_key, self.name()).await {
            return EntityOutcome::Skipped;
        }

        let outcome = self.generate_claimed(beneficiary_id, year).await;
        self.guard.release(&lease_key, self.name()).await;
        outcome
    }

    async fn generate_claimed(&self, beneficiary_id: BeneficiaryId, year: i32) -> EntityOutcome {
        match self.statements.exists_for_year(beneficiary_id, year).await {
            Ok(true) => return EntityOutcome::Unchanged,
            Ok(false) => {}
            Err(error) => {
                warn!(%error, beneficiary = %beneficiary_id, "statement lookup failed");
                return EntityOutcome::Skipped;
            }
        }

        let paid_invoices = match self.invoices.paid_in_year(beneficiary_id, year).await {
            Ok(invoices) => invoices,
            Err(error) => {
                warn!(%error, beneficiary = %beneficiary_id, "paid-invoice lookup failed");
                return EntityOutcome::Skipped;
            }
        };

        let Some((statement, event)) = TaxStatement::from_paid_invoices(
            beneficiary_id,
            year,
            &paid_invoices,
            self.clock.now(),
        ) else {
            return EntityOutcome::Unchanged;
        };

        match self.statements.insert(statement).await {
            Ok(()) => {
                info!(beneficiary = %beneficiary_id, year, "tax statement generated");
                self.dispatcher.dispatch(&event.into()).await;
                EntityOutcome::Transitioned { notified: true }
            }
            Err(error) if error.is_conflict() => EntityOutcome::Skipped,
            Err(error) => {
                warn!(%error, beneficiary = %beneficiary_id, "statement insert failed");
                EntityOutcome::Skipped
            }
        }
    }
}

#[async_trait]
impl SweepJob for GenerateAnnualTaxStatements {
    fn name(&self) -> &'static str {
        "generate_annual_tax_statements"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Yearly {
            month: 1,
            day: 2,
            hour: 3,
        }
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let year = self.clock.today().year() - 1;
        let candidates = self.invoices.beneficiaries_with_payments_in(year).await?;

        Ok(
            sweep_candidates(self.name(), candidates, deadline, |beneficiary_id| {
                self.generate_one(beneficiary_id, year)
            })
            .await,
        )
    }
}
