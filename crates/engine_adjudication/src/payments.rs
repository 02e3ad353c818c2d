//! Payment handling
//!
//! Payments originate with the payment collaborator (bank slip webhooks,
//! PIX confirmations); the engine's part is moving the entity to its paid
//! state and telling the beneficiary.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use core_kernel::{ClaimId, Clock, InvoiceId, Money};
use domain_billing::{BillingEvent, InvoiceStore};
use domain_reimbursements::ClaimStore;
use engine_dispatch::Dispatcher;

use crate::error::AdjudicationError;

/// Outcome of recording an invoice payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Invoice fully settled
    Settled,
    /// Payment was below the invoice amount; balance remains open
    Partial { remaining: Money },
}

/// Applies payment events to invoices
pub struct InvoicePaymentService {
    invoices: Arc<dyn InvoiceStore>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl InvoicePaymentService {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            invoices,
            dispatcher,
            clock,
        }
    }

    /// Records a payment against an invoice
    pub async fn record_payment(
        &self,
        invoice_id: InvoiceId,
        amount_paid: Money,
        paid_on: NaiveDate,
    ) -> Result<PaymentOutcome, AdjudicationError> {
        let mut invoice = self
            .invoices
            .get(invoice_id)
            .await
            .map_err(AdjudicationError::Store)?;

        let event = invoice.apply_payment(amount_paid, paid_on, self.clock.now())?;

        let outcome = match &event {
            BillingEvent::InvoicePaymentConfirmed { .. } => {
                // only a settling payment mutates the invoice
                self.invoices
                    .update(&invoice)
                    .await
                    .map_err(AdjudicationError::Store)?;
                info!(invoice = %invoice.id, %amount_paid, "invoice settled");
                PaymentOutcome::Settled
            }
            BillingEvent::InvoicePartialPayment { remaining, .. } => {
                info!(invoice = %invoice.id, %amount_paid, %remaining, "partial payment received");
                PaymentOutcome::Partial {
                    remaining: *remaining,
                }
            }
            _ => unreachable!("apply_payment yields only payment events"),
        };

        self.dispatcher.dispatch(&event.into()).await;
        Ok(outcome)
    }
}

/// Settles approved reimbursement claims
pub struct ClaimPaymentService {
    claims: Arc<dyn ClaimStore>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl ClaimPaymentService {
    pub fn new(claims: Arc<dyn ClaimStore>, dispatcher: Dispatcher, clock: Arc<dyn Clock>) -> Self {
        Self {
            claims,
            dispatcher,
            clock,
        }
    }

    /// Marks an approved claim as paid out
    pub async fn mark_paid(
        &self,
        claim_id: ClaimId,
        paid_on: NaiveDate,
    ) -> Result<(), AdjudicationError> {
        let mut claim = self
            .claims
            .get(claim_id)
            .await
            .map_err(AdjudicationError::Store)?;

        let event = claim.mark_paid(paid_on, self.clock.now())?;
        self.claims
            .update(&claim)
            .await
            .map_err(AdjudicationError::Store)?;

        info!(claim = %claim.protocol_number, "reimbursement paid");
        self.dispatcher.dispatch(&event.into()).await;
        Ok(())
    }
}
