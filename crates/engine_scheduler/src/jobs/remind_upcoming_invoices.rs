//! RemindUpcomingInvoices sweep

use async_trait::async_trait;
use chrono::Days;
use std::sync::Arc;
use tokio::time::Instant;

use core_kernel::Clock;
use domain_billing::{Invoice, InvoiceStore};
use engine_adjudication::LeaseGuard;
use engine_dispatch::{Dispatcher, Notification};

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Reminders go out this many days before the due date
pub const UPCOMING_DUE_DAYS: u64 = 3;

/// Reminds beneficiaries of invoices due in three days
pub struct RemindUpcomingInvoices {
    invoices: Arc<dyn InvoiceStore>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl RemindUpcomingInvoices {
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

    async fn remind_one(&self, invoice: Invoice) -> EntityOutcome {
        let lease_key = invoice.id.to_string();
        if !self.guard.try_claim(&lease_key, self.name()).await {
            return EntityOutcome::Skipped;
        }

        self.dispatcher
            .notify(Notification::upcoming_invoice_reminder(
                &invoice,
                self.clock.now(),
            ))
            .await;

        self.guard.release(&lease_key, self.name()).await;
        EntityOutcome::NotifiedOnly
    }
}

#[async_trait]
impl SweepJob for RemindUpcomingInvoices {
    fn name(&self) -> &'static str {
        "remind_upcoming_invoices"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Daily { hour: 8 }
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let reminder_date = self.clock.today() + Days::new(UPCOMING_DUE_DAYS);
        let candidates = self.invoices.open_due_on(reminder_date).await?;

        Ok(
            sweep_candidates(self.name(), candidates, deadline, |invoice| {
                self.remind_one(invoice)
            })
            .await,
        )
    }
}
