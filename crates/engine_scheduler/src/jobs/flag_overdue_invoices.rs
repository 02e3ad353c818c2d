//! FlagOverdueInvoices sweep

use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::warn;

use core_kernel::Clock;
use domain_billing::{Invoice, InvoiceStatus, InvoiceStore};
use engine_adjudication::LeaseGuard;
use engine_dispatch::{Dispatcher, Notification};

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Flips open invoices past their due date to Overdue
///
/// The transition happens exactly once per invoice; the milestone-day filter
/// in the notification catalog decides whether the beneficiary hears about
/// it.
pub struct FlagOverdueInvoices {
    invoices: Arc<dyn InvoiceStore>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl FlagOverdueInvoices {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        guard: Arc<dyn LeaseGuard>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            invoices,
            guard,
            dispatcher,
            clock,
        }
    }

    async fn flag_one(&self, candidate: Invoice) -> EntityOutcome {
        let lease_key = candidate.id.to_string();
        if !self.guard.try_claim(&lease_key, self.name()).await {
            return EntityOutcome::Skipped;
        }

        let outcome = self.flag_claimed(candidate).await;
        self.guard.release(&lease_key, self.name()).await;
        outcome
    }

    async fn flag_claimed(&self, candidate: Invoice) -> EntityOutcome {
        let mut invoice = match self.invoices.get(candidate.id).await {
            Ok(invoice) => invoice,
            Err(error) => {
                warn!(%error, invoice = %candidate.id, "invoice vanished mid-sweep");
                return EntityOutcome::Skipped;
            }
        };

        let today = self.clock.today();
        if invoice.status != InvoiceStatus::Open || invoice.due_date >= today {
            return EntityOutcome::Unchanged;
        }

        let event = match invoice.flag_overdue(today, self.clock.now()) {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, invoice = %invoice.id, "overdue transition rejected");
                return EntityOutcome::Skipped;
            }
        };

        // the notification catalog gates on the milestone days
        let notified = Notification::from_event(&event.clone().into()).is_some();

        match self.invoices.update(&invoice).await {
            Ok(()) => {
                self.dispatcher.dispatch(&event.into()).await;
                EntityOutcome::Transitioned { notified }
            }
            Err(error) if error.is_conflict() => EntityOutcome::Skipped,
            Err(error) => {
                warn!(%error, invoice = %invoice.id, "overdue write failed");
                EntityOutcome::Skipped
            }
        }
    }
}

#[async_trait]
impl SweepJob for FlagOverdueInvoices {
    fn name(&self) -> &'static str {
        "flag_overdue_invoices"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Daily { hour: 2 }
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let candidates = self.invoices.open_due_before(self.clock.today()).await?;

        Ok(
            sweep_candidates(self.name(), candidates, deadline, |invoice| {
                self.flag_one(invoice)
            })
            .await,
        )
    }
}
