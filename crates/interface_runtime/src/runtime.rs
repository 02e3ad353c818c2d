//! Engine wiring
//!
//! Assembles the adapter set, the dispatcher, the adjudication services and
//! the full job catalog. The in-memory adapters stand where a deployment
//! plugs its database-backed ones; everything engine-side only sees the
//! port traits.

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use core_kernel::Clock;
use domain_membership::{CachedMembership, MembershipPort};
use engine_adjudication::{
    ClaimAdjudicator, ClaimPaymentService, GuideAdjudicator, InvoicePaymentService, LeaseGuard,
};
use engine_dispatch::Dispatcher;
use engine_scheduler::{
    AdjudicatePendingClaims, ExpireGuides, FlagOverdueInvoices, GenerateAnnualTaxStatements,
    GenerateMonthlyInvoices, NudgePendingClaims, NudgePendingGuides, RemindUpcomingInvoices,
    Scheduler, SchedulerConfig,
};
use infra_memory::{
    InMemoryAuditSink, InMemoryClaimStore, InMemoryDocumentIndex, InMemoryGuideStore,
    InMemoryInvoiceStore, InMemoryLeaseGuard, InMemoryMembershipDirectory,
    InMemoryNotificationSink, InMemoryStatementStore,
};

use crate::config::EngineConfig;

/// A fully wired engine
pub struct Engine {
    pub guides: Arc<InMemoryGuideStore>,
    pub claims: Arc<InMemoryClaimStore>,
    pub invoices: Arc<InMemoryInvoiceStore>,
    pub statements: Arc<InMemoryStatementStore>,
    pub documents: Arc<InMemoryDocumentIndex>,
    pub membership: Arc<InMemoryMembershipDirectory>,
    pub notifications: Arc<InMemoryNotificationSink>,
    pub audits: Arc<InMemoryAuditSink>,
    pub guide_adjudicator: Arc<GuideAdjudicator>,
    pub claim_adjudicator: Arc<ClaimAdjudicator>,
    pub invoice_payments: Arc<InvoicePaymentService>,
    pub claim_payments: Arc<ClaimPaymentService>,
    scheduler: Scheduler,
    dispatch_worker: engine_dispatch::RetryWorker,
}

/// Handles of the engine's background tasks
pub struct EngineTasks {
    pub scheduler: Vec<JoinHandle<()>>,
    pub dispatch_retry: JoinHandle<()>,
}

impl Engine {
    /// Wires the engine over the in-memory adapter set
    pub fn assemble(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let guides = Arc::new(InMemoryGuideStore::new());
        let claims = Arc::new(InMemoryClaimStore::new());
        let invoices = Arc::new(InMemoryInvoiceStore::new());
        let statements = Arc::new(InMemoryStatementStore::new());
        let documents = Arc::new(InMemoryDocumentIndex::new());
        let directory = Arc::new(InMemoryMembershipDirectory::new());
        let notifications = Arc::new(InMemoryNotificationSink::new());
        let audits = Arc::new(InMemoryAuditSink::new());

        let guard: Arc<dyn LeaseGuard> = Arc::new(InMemoryLeaseGuard::new(
            clock.clone(),
            ChronoDuration::seconds(config.lease_ttl_secs),
        ));
        let membership: Arc<dyn MembershipPort> = Arc::new(CachedMembership::new(
            directory.clone(),
            clock.clone(),
            ChronoDuration::seconds(config.membership_cache_ttl_secs),
        ));

        let (dispatcher, dispatch_worker) = Dispatcher::with_retry_delay(
            notifications.clone(),
            audits.clone(),
            Duration::from_secs(config.dispatch_retry_secs),
        );

        let guide_adjudicator = Arc::new(GuideAdjudicator::new(
            guides.clone(),
            membership.clone(),
            guard.clone(),
            dispatcher.clone(),
            clock.clone(),
        ));
        let claim_adjudicator = Arc::new(ClaimAdjudicator::new(
            claims.clone(),
            documents.clone(),
            membership.clone(),
            guard.clone(),
            dispatcher.clone(),
            clock.clone(),
        ));
        let invoice_payments = Arc::new(InvoicePaymentService::new(
            invoices.clone(),
            dispatcher.clone(),
            clock.clone(),
        ));
        let claim_payments = Arc::new(ClaimPaymentService::new(
            claims.clone(),
            dispatcher.clone(),
            clock.clone(),
        ));

        let mut scheduler = Scheduler::new(
            clock.clone(),
            SchedulerConfig {
                job_timeout: Duration::from_secs(config.job_timeout_secs),
            },
        );
        scheduler
            .register(Arc::new(ExpireGuides::new(
                guides.clone(),
                guard.clone(),
                dispatcher.clone(),
                clock.clone(),
            )))
            .register(Arc::new(NudgePendingGuides::new(
                guides.clone(),
                guard.clone(),
                dispatcher.clone(),
                clock.clone(),
            )))
            .register(Arc::new(AdjudicatePendingClaims::new(
                claims.clone(),
                claim_adjudicator.clone(),
                clock.clone(),
            )))
            .register(Arc::new(NudgePendingClaims::new(
                claims.clone(),
                guard.clone(),
                dispatcher.clone(),
                clock.clone(),
            )))
            .register(Arc::new(GenerateMonthlyInvoices::new(
                membership.clone(),
                invoices.clone(),
                guard.clone(),
                dispatcher.clone(),
                clock.clone(),
            )))
            .register(Arc::new(FlagOverdueInvoices::new(
                invoices.clone(),
                guard.clone(),
                dispatcher.clone(),
                clock.clone(),
            )))
            .register(Arc::new(RemindUpcomingInvoices::new(
                invoices.clone(),
                guard.clone(),
                dispatcher.clone(),
                clock.clone(),
            )))
            .register(Arc::new(GenerateAnnualTaxStatements::new(
                invoices.clone(),
                statements.clone(),
                guard.clone(),
                dispatcher.clone(),
                clock.clone(),
            )));

        Self {
            guides,
            claims,
            invoices,
            statements,
            documents,
            membership: directory,
            notifications,
            audits,
            guide_adjudicator,
            claim_adjudicator,
            invoice_payments,
            claim_payments,
            scheduler,
            dispatch_worker,
        }
    }

    /// Starts the scheduler loops and the dispatch retry worker
    pub fn start(self) -> EngineTasks {
        info!(jobs = ?self.scheduler.job_names(), "starting lifecycle engine");
        EngineTasks {
            dispatch_retry: tokio::spawn(self.dispatch_worker.run()),
            scheduler: self.scheduler.spawn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::SystemClock;

    #[test]
    fn test_assemble_registers_the_full_catalog() {
        let engine = Engine::assemble(&EngineConfig::default(), Arc::new(SystemClock));

        assert_eq!(
            engine.scheduler.job_names(),
            vec![
                "expire_guides",
                "nudge_pending_guides",
                "adjudicate_pending_claims",
                "nudge_pending_claims",
                "generate_monthly_invoices",
                "flag_overdue_invoices",
                "remind_upcoming_invoices",
                "generate_annual_tax_statements",
            ]
        );
    }
}
