//! Sweep tests over the in-memory adapter set
//!
//! Each test assembles the engine the way the runtime does - stores, lease
//! guard, dispatcher, fixed clock - seeds entities, runs sweeps and checks
//! the resulting state, notifications and audit trail.

use chrono::{Days, Duration as ChronoDuration, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

use core_kernel::{BeneficiaryId, Clock, FixedClock, Money};
use domain_billing::{InvoiceStatus, InvoiceStore, ReferencePeriod, StatementStore};
use domain_guides::{AuthorizationGuide, GuideStatus, GuideStore, GuideType};
use domain_membership::TitularProfile;
use domain_reimbursements::{
    ClaimStatus, ClaimStore, DocumentType, ExpenseType, ReimbursementClaim,
};
use engine_adjudication::ClaimAdjudicator;
use engine_dispatch::Dispatcher;
use engine_scheduler::{
    AdjudicatePendingClaims, ExpireGuides, FlagOverdueInvoices, GenerateAnnualTaxStatements,
    GenerateMonthlyInvoices, NudgePendingClaims, NudgePendingGuides, RemindUpcomingInvoices,
    Scheduler,
};
use infra_memory::{
    InMemoryAuditSink, InMemoryClaimStore, InMemoryDocumentIndex, InMemoryGuideStore,
    InMemoryInvoiceStore, InMemoryLeaseGuard, InMemoryMembershipDirectory,
    InMemoryNotificationSink, InMemoryStatementStore,
};
use test_utils::{ClaimBuilder, GuideBuilder, InvoiceBuilder};

const SWEEP_TIMEOUT: Duration = Duration::from_secs(5);

struct Harness {
    clock: FixedClock,
    guides: Arc<InMemoryGuideStore>,
    claims: Arc<InMemoryClaimStore>,
    invoices: Arc<InMemoryInvoiceStore>,
    statements: Arc<InMemoryStatementStore>,
    documents: Arc<InMemoryDocumentIndex>,
    membership: Arc<InMemoryMembershipDirectory>,
    guard: Arc<InMemoryLeaseGuard>,
    notifications: Arc<InMemoryNotificationSink>,
    audits: Arc<InMemoryAuditSink>,
    dispatcher: Dispatcher,
}

impl Harness {
    fn new() -> Self {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let notifications = Arc::new(InMemoryNotificationSink::new());
        let audits = Arc::new(InMemoryAuditSink::new());
        let (dispatcher, _worker) = Dispatcher::new(notifications.clone(), audits.clone());

        Self {
            guides: Arc::new(InMemoryGuideStore::new()),
            claims: Arc::new(InMemoryClaimStore::new()),
            invoices: Arc::new(InMemoryInvoiceStore::new()),
            statements: Arc::new(InMemoryStatementStore::new()),
            documents: Arc::new(InMemoryDocumentIndex::new()),
            membership: Arc::new(InMemoryMembershipDirectory::new()),
            guard: Arc::new(InMemoryLeaseGuard::with_default_ttl(Arc::new(clock.clone()))),
            notifications,
            audits,
            dispatcher,
            clock,
        }
    }

    fn shared_clock(&self) -> Arc<dyn Clock> {
        Arc::new(self.clock.clone())
    }

    fn expire_guides_job(&self) -> ExpireGuides {
        ExpireGuides::new(
            self.guides.clone(),
            self.guard.clone(),
            self.dispatcher.clone(),
            self.shared_clock(),
        )
    }

    fn adjudicate_claims_job(&self) -> AdjudicatePendingClaims {
        let adjudicator = Arc::new(ClaimAdjudicator::new(
            self.claims.clone(),
            self.documents.clone(),
            self.membership.clone(),
            self.guard.clone(),
            self.dispatcher.clone(),
            self.shared_clock(),
        ));
        AdjudicatePendingClaims::new(self.claims.clone(), adjudicator, self.shared_clock())
    }

    async fn authorized_guide(&self, beneficiary: BeneficiaryId) -> AuthorizationGuide {
        let guide = GuideBuilder::new()
            .with_beneficiary(beneficiary)
            .requested_at(self.clock.now())
            .build_authorized();
        self.guides.insert(guide.clone()).await.unwrap();
        guide
    }

    async fn aged_claim(
        &self,
        expense_type: ExpenseType,
        amount: Money,
        documents: &[DocumentType],
        age_hours: i64,
    ) -> ReimbursementClaim {
        let beneficiary = BeneficiaryId::new();
        self.membership.set_beneficiary(beneficiary, true).await;
        let claim = ClaimBuilder::new()
            .with_beneficiary(beneficiary)
            .with_expense_type(expense_type)
            .with_service_date(self.clock.today() - Days::new(5))
            .with_requested_amount(amount)
            .requested_at(self.clock.now() - ChronoDuration::hours(age_hours))
            .build();
        self.claims.insert(claim.clone()).await.unwrap();
        for document in documents {
            self.documents.attach(claim.id, *document).await;
        }
        claim
    }
}

#[tokio::test]
async fn expire_guides_is_idempotent() {
    let harness = Harness::new();
    let lapsed = harness.authorized_guide(BeneficiaryId::new()).await;
    let current = harness.authorized_guide(BeneficiaryId::new()).await;

    // 31 days later the first guide has lapsed; re-authorize the second
    // fresh so it stays valid
    harness.clock.advance(ChronoDuration::days(31));
    let refreshed = GuideBuilder::new()
        .with_type(GuideType::Emergency)
        .requested_at(harness.clock.now())
        .build_authorized();
    harness.guides.insert(refreshed.clone()).await.unwrap();

    let job = harness.expire_guides_job();
    let first_run = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();

    assert_eq!(first_run.matched, 2);
    assert_eq!(first_run.transitioned, 2);
    assert_eq!(
        harness.guides.get(lapsed.id).await.unwrap().status,
        GuideStatus::Expired
    );
    assert_eq!(
        harness.guides.get(current.id).await.unwrap().status,
        GuideStatus::Expired
    );
    assert_eq!(
        harness.guides.get(refreshed.id).await.unwrap().status,
        GuideStatus::Authorized
    );

    // a second run selects nothing: the expired guides no longer match
    let second_run = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();
    assert_eq!(second_run.matched, 0);
    assert_eq!(second_run.transitioned, 0);

    // side effects happened exactly once per guide
    assert_eq!(harness.notifications.delivered_count().await, 2);
    assert_eq!(harness.audits.records().await.len(), 2);
}

#[tokio::test]
async fn expired_guide_notification_carries_the_expiry_date() {
    let harness = Harness::new();
    harness.authorized_guide(BeneficiaryId::new()).await;
    harness.clock.advance(ChronoDuration::days(31));

    let job = harness.expire_guides_job();
    Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();

    let sent = harness.notifications.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Guia Expirada");
    // expiry was 30 days after the original authorization: 2024-04-14
    assert!(sent[0].message.contains("14/04/2024"), "{}", sent[0].message);
}

#[tokio::test]
async fn claim_sweep_only_touches_aged_claims() {
    let harness = Harness::new();
    let aged = harness
        .aged_claim(
            ExpenseType::Exam,
            Money::new(dec!(400.00)),
            &[DocumentType::Invoice],
            30,
        )
        .await;
    let fresh = harness
        .aged_claim(
            ExpenseType::Exam,
            Money::new(dec!(400.00)),
            &[DocumentType::Invoice],
            2,
        )
        .await;

    let job = harness.adjudicate_claims_job();
    let report = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.transitioned, 1);

    let aged_after = harness.claims.get(aged.id).await.unwrap();
    assert_eq!(aged_after.status, ClaimStatus::Approved);
    assert_eq!(aged_after.approved_amount, Some(Money::new(dec!(320.00))));

    // the fresh claim is untouched until it ages past the delay
    assert_eq!(
        harness.claims.get(fresh.id).await.unwrap().status,
        ClaimStatus::InAnalysis
    );
}

#[tokio::test]
async fn concurrent_claim_sweeps_never_double_process() {
    let harness = Harness::new();
    let claims: Vec<_> = {
        let mut seeded = Vec::new();
        for _ in 0..12 {
            seeded.push(
                harness
                    .aged_claim(
                        ExpenseType::Consultation,
                        Money::new(dec!(250.00)),
                        &[DocumentType::Invoice],
                        30,
                    )
                    .await,
            );
        }
        seeded
    };

    // two instances of the same sweep racing over one store
    let job_a = harness.adjudicate_claims_job();
    let job_b = harness.adjudicate_claims_job();
    let (report_a, report_b) = tokio::join!(
        Scheduler::run_job_once(&job_a, SWEEP_TIMEOUT),
        Scheduler::run_job_once(&job_b, SWEEP_TIMEOUT),
    );
    let (report_a, report_b) = (report_a.unwrap(), report_b.unwrap());

    // every claim got exactly one decision
    for claim in &claims {
        let stored = harness.claims.get(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Approved);
        assert_eq!(stored.approved_amount, Some(Money::new(dec!(200.00))));
        assert_eq!(stored.version, 2, "exactly one transition per claim");
    }
    assert_eq!(report_a.transitioned + report_b.transitioned, claims.len());
    assert_eq!(harness.audits.records().await.len(), claims.len());
    assert_eq!(harness.notifications.delivered_count().await, claims.len());
}

#[tokio::test]
async fn overdue_sweep_flags_and_notifies_on_day_one() {
    let harness = Harness::new();
    let beneficiary = BeneficiaryId::new();

    // due yesterday: one day overdue at sweep time
    let invoice = InvoiceBuilder::new()
        .with_beneficiary(beneficiary)
        .with_amount(Money::new(dec!(550.00)))
        .with_due_date(harness.clock.today() - Days::new(1))
        .opened_at(harness.clock.now() - ChronoDuration::days(20))
        .build();
    harness.invoices.insert(invoice.clone()).await.unwrap();

    let job = FlagOverdueInvoices::new(
        harness.invoices.clone(),
        harness.guard.clone(),
        harness.dispatcher.clone(),
        harness.shared_clock(),
    );
    let report = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();

    assert_eq!(report.transitioned, 1);
    assert_eq!(report.notified, 1);
    assert_eq!(
        harness.invoices.get(invoice.id).await.unwrap().status,
        InvoiceStatus::Overdue
    );

    let sent = harness.notifications.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].message.contains("vencida há 1 dia(s)"));
}

#[tokio::test]
async fn overdue_sweep_stays_silent_off_milestone_days() {
    let harness = Harness::new();

    // due four days ago: flagged, but 4 is not a milestone day
    let invoice = InvoiceBuilder::new()
        .with_amount(Money::new(dec!(550.00)))
        .with_due_date(harness.clock.today() - Days::new(4))
        .opened_at(harness.clock.now() - ChronoDuration::days(20))
        .build();
    harness.invoices.insert(invoice.clone()).await.unwrap();

    let job = FlagOverdueInvoices::new(
        harness.invoices.clone(),
        harness.guard.clone(),
        harness.dispatcher.clone(),
        harness.shared_clock(),
    );
    let report = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();

    assert_eq!(report.transitioned, 1);
    assert_eq!(report.notified, 0);
    assert_eq!(
        harness.invoices.get(invoice.id).await.unwrap().status,
        InvoiceStatus::Overdue
    );
    assert!(harness.notifications.sent().await.is_empty());
    // the transition is still audited
    assert_eq!(harness.audits.records().await.len(), 1);
}

#[tokio::test]
async fn monthly_invoices_generate_once_per_titular() {
    let harness = Harness::new();
    let with_dependents = BeneficiaryId::new();
    let solo = BeneficiaryId::new();

    harness
        .membership
        .add_titular(TitularProfile {
            beneficiary_id: with_dependents,
            monthly_fee: Money::new(dec!(500.00)),
            active_dependents: 2,
        })
        .await;
    harness
        .membership
        .add_titular(TitularProfile {
            beneficiary_id: solo,
            monthly_fee: Money::new(dec!(450.00)),
            active_dependents: 0,
        })
        .await;

    let job = GenerateMonthlyInvoices::new(
        harness.membership.clone(),
        harness.invoices.clone(),
        harness.guard.clone(),
        harness.dispatcher.clone(),
        harness.shared_clock(),
    );

    let first_run = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();
    assert_eq!(first_run.transitioned, 2);

    let period = ReferencePeriod::new(2024, 3).unwrap();
    assert!(harness
        .invoices
        .exists_for_period(with_dependents, period)
        .await
        .unwrap());

    // titular + two dependents at half fee each
    let open = harness
        .invoices
        .open_due_before(harness.clock.today() + Days::new(60))
        .await
        .unwrap();
    let family_invoice = open
        .iter()
        .find(|invoice| invoice.beneficiary_id == with_dependents)
        .unwrap();
    assert_eq!(family_invoice.amount, Money::new(dec!(1000.00)));
    assert_eq!(family_invoice.due_date, period.due_date());

    // second run generates nothing new
    let second_run = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();
    assert_eq!(second_run.transitioned, 0);
    assert_eq!(harness.notifications.delivered_count().await, 2);
}

#[tokio::test]
async fn upcoming_invoice_reminder_targets_due_in_three_days() {
    let harness = Harness::new();

    let due_soon = InvoiceBuilder::new()
        .with_due_date(harness.clock.today() + Days::new(3))
        .opened_at(harness.clock.now())
        .build();
    let due_later = InvoiceBuilder::new()
        .with_period(ReferencePeriod::new(2024, 4).unwrap())
        .with_due_date(harness.clock.today() + Days::new(10))
        .opened_at(harness.clock.now())
        .build();
    harness.invoices.insert(due_soon).await.unwrap();
    harness.invoices.insert(due_later).await.unwrap();

    let job = RemindUpcomingInvoices::new(
        harness.invoices.clone(),
        harness.guard.clone(),
        harness.dispatcher.clone(),
        harness.shared_clock(),
    );
    let report = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.notified, 1);

    let sent = harness.notifications.sent().await;
    assert_eq!(sent[0].title, "Lembrete de Vencimento");
    assert!(sent[0].message.contains("vence em 3 dias"));
}

#[tokio::test]
async fn nudge_jobs_remind_without_transitioning() {
    let harness = Harness::new();

    // a guide pending for 50 hours and a claim in analysis for 80
    let guide = GuideBuilder::new()
        .with_type(GuideType::SpSadt)
        .requested_at(harness.clock.now() - ChronoDuration::hours(50))
        .build();
    harness.guides.insert(guide.clone()).await.unwrap();
    let claim = harness
        .aged_claim(
            ExpenseType::Surgery,
            Money::new(dec!(5000.00)),
            &[DocumentType::Invoice],
            80,
        )
        .await;

    let guide_job = NudgePendingGuides::new(
        harness.guides.clone(),
        harness.guard.clone(),
        harness.dispatcher.clone(),
        harness.shared_clock(),
    );
    let claim_job = NudgePendingClaims::new(
        harness.claims.clone(),
        harness.guard.clone(),
        harness.dispatcher.clone(),
        harness.shared_clock(),
    );

    let guide_report = Scheduler::run_job_once(&guide_job, SWEEP_TIMEOUT).await.unwrap();
    let claim_report = Scheduler::run_job_once(&claim_job, SWEEP_TIMEOUT).await.unwrap();

    assert_eq!(guide_report.notified, 1);
    assert_eq!(guide_report.transitioned, 0);
    assert_eq!(claim_report.notified, 1);
    assert_eq!(claim_report.transitioned, 0);

    // reminders change nothing
    assert_eq!(
        harness.guides.get(guide.id).await.unwrap().version,
        1
    );
    assert_eq!(harness.claims.get(claim.id).await.unwrap().version, 1);
    assert!(harness.audits.records().await.is_empty());
}

#[tokio::test]
async fn annual_statements_cover_last_years_payers_once() {
    let harness = Harness::new();
    // january 2nd, 2024: statements for 2023
    harness
        .clock
        .set(Utc.with_ymd_and_hms(2024, 1, 2, 6, 0, 0).unwrap());

    let payer = BeneficiaryId::new();
    let issued = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
    for month in 5..=7 {
        let period = ReferencePeriod::new(2023, month).unwrap();
        let invoice = InvoiceBuilder::new()
            .with_beneficiary(payer)
            .with_period(period)
            .with_amount(Money::new(dec!(500.00)))
            .opened_at(issued)
            .build_paid(period.due_date());
        harness.invoices.insert(invoice).await.unwrap();
    }

    // an open invoice from 2023 does not qualify its owner
    let non_payer = BeneficiaryId::new();
    let open_invoice = InvoiceBuilder::new()
        .with_beneficiary(non_payer)
        .with_period(ReferencePeriod::new(2023, 6).unwrap())
        .with_amount(Money::new(dec!(500.00)))
        .opened_at(issued)
        .build();
    harness.invoices.insert(open_invoice).await.unwrap();

    let job = GenerateAnnualTaxStatements::new(
        harness.invoices.clone(),
        harness.statements.clone(),
        harness.guard.clone(),
        harness.dispatcher.clone(),
        harness.shared_clock(),
    );

    let report = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();
    assert_eq!(report.transitioned, 1);
    assert!(harness
        .statements
        .exists_for_year(payer, 2023)
        .await
        .unwrap());
    assert!(!harness
        .statements
        .exists_for_year(non_payer, 2023)
        .await
        .unwrap());

    let sent = harness.notifications.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Informe de Rendimentos Disponível");
    assert!(sent[0].message.contains("R$ 1500.00"));

    // rerun: statement already exists, nothing generated
    let second = Scheduler::run_job_once(&job, SWEEP_TIMEOUT).await.unwrap();
    assert_eq!(second.transitioned, 0);
    assert_eq!(harness.statements.len().await, 1);
}

#[tokio::test]
async fn scheduler_registers_the_full_job_catalog() {
    let harness = Harness::new();
    let mut scheduler = Scheduler::new(harness.shared_clock(), Default::default());
    scheduler
        .register(Arc::new(harness.expire_guides_job()))
        .register(Arc::new(harness.adjudicate_claims_job()));

    assert_eq!(
        scheduler.job_names(),
        vec!["expire_guides", "adjudicate_pending_claims"]
    );
}
