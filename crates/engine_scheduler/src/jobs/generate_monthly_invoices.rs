//! GenerateMonthlyInvoices sweep

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

use core_kernel::{Clock, Money};
use domain_billing::{Invoice, InvoiceStore, ReferencePeriod};
use domain_membership::{MembershipPort, TitularProfile};
use engine_adjudication::LeaseGuard;
use engine_dispatch::Dispatcher;

use crate::cadence::Cadence;
use crate::job::{sweep_candidates, EntityOutcome, SweepError, SweepJob, SweepReport};

/// Each active dependent adds this share of the titular fee
pub const DEPENDENT_FEE_RATE: Decimal = dec!(0.50);

/// Generates one invoice per titular beneficiary for the current period
///
/// Idempotent by construction: a titular who already has an invoice for the
/// period no longer matches, and the store's per-period uniqueness backstops
/// any race between overlapping runs.
pub struct GenerateMonthlyInvoices {
    membership: Arc<dyn MembershipPort>,
    invoices: Arc<dyn InvoiceStore>,
    guard: Arc<dyn LeaseGuard>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl GenerateMonthlyInvoices {
    pub fn new(
        membership: Arc<dyn MembershipPort>,
        invoices: Arc<dyn InvoiceStore>,
        guard: Arc<dyn LeaseGuard>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            membership,
            invoices,
            guard,
            dispatcher,
            clock,
        }
    }

    /// Titular fee plus half the fee per active dependent
    fn invoice_amount(profile: &TitularProfile) -> Money {
        let fee = profile.monthly_fee.amount();
        let dependents = fee * DEPENDENT_FEE_RATE * Decimal::from(profile.active_dependents);
        Money::new(fee + dependents)
    }

    async fn generate_one(&self, profile: TitularProfile, period: ReferencePeriod) -> EntityOutcome {
        let lease_key = format!("invoice:{}:{}", profile.beneficiary_id, period);
        if !self.guard.try_claim(&lease_key, self.name()).await {
            return EntityOutcome::Skipped;
        }

        let outcome = self.generate_claimed(profile, period).await;
        self.guard.release(&lease_key, self.name()).await;
        outcome
    }

    async fn generate_claimed(
        &self,
        profile: TitularProfile,
        period: ReferencePeriod,
    ) -> EntityOutcome {
        match self
            .invoices
            .exists_for_period(profile.beneficiary_id, period)
            .await
        {
            Ok(true) => return EntityOutcome::Unchanged,
            Ok(false) => {}
            Err(error) => {
                warn!(%error, beneficiary = %profile.beneficiary_id, "invoice lookup failed");
                return EntityOutcome::Skipped;
            }
        }

        let amount = Self::invoice_amount(&profile);
        let (invoice, event) = Invoice::open(
            profile.beneficiary_id,
            period,
            amount,
            period.due_date(),
            self.clock.now(),
        );

        match self.invoices.insert(invoice).await {
            Ok(()) => {
                info!(beneficiary = %profile.beneficiary_id, %period, %amount, "invoice generated");
                self.dispatcher.dispatch(&event.into()).await;
                EntityOutcome::Transitioned { notified: true }
            }
            Err(error) if error.is_conflict() => EntityOutcome::Skipped,
            Err(error) => {
                warn!(%error, beneficiary = %profile.beneficiary_id, "invoice insert failed");
                EntityOutcome::Skipped
            }
        }
    }
}

#[async_trait]
impl SweepJob for GenerateMonthlyInvoices {
    fn name(&self) -> &'static str {
        "generate_monthly_invoices"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Monthly { day: 1, hour: 1 }
    }

    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError> {
        let period = ReferencePeriod::containing(self.clock.today());
        let profiles = self.membership.titular_profiles().await?;

        Ok(
            sweep_candidates(self.name(), profiles, deadline, |profile| {
                self.generate_one(profile, period)
            })
            .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::BeneficiaryId;

    #[test]
    fn test_invoice_amount_adds_half_fee_per_dependent() {
        let profile = TitularProfile {
            beneficiary_id: BeneficiaryId::new(),
            monthly_fee: Money::new(dec!(500.00)),
            active_dependents: 2,
        };

        assert_eq!(
            GenerateMonthlyInvoices::invoice_amount(&profile),
            Money::new(dec!(1000.00))
        );

        let solo = TitularProfile {
            beneficiary_id: BeneficiaryId::new(),
            monthly_fee: Money::new(dec!(500.00)),
            active_dependents: 0,
        };
        assert_eq!(
            GenerateMonthlyInvoices::invoice_amount(&solo),
            Money::new(dec!(500.00))
        );
    }
}
