//! Notification records and the message catalog
//!
//! Beneficiary-facing copy is Portuguese, matching the operator's mobile
//! app. Every message is derived from a domain event or built by one of the
//! reminder constructors the notify-only sweeps use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use core_kernel::{BeneficiaryId, NotificationId};
use domain_billing::{BillingEvent, Invoice};
use domain_guides::{AuthorizationGuide, GuideEvent};
use domain_reimbursements::{ClaimEvent, ReimbursementClaim};

use crate::event::EngineEvent;

/// Days overdue on which an overdue invoice notifies the beneficiary
pub const OVERDUE_NOTIFY_DAYS: [i64; 5] = [1, 3, 7, 15, 30];

/// Notification category, mirroring the mobile app's inbox filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    GuideAuthorization,
    ReimbursementStatus,
    InvoiceDue,
    TaxStatement,
    SystemMessage,
}

/// Delivery priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A notification addressed to a beneficiary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub beneficiary_id: BeneficiaryId,
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    /// Structured payload for deep links in the app
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn build(
        beneficiary_id: BeneficiaryId,
        kind: NotificationKind,
        priority: NotificationPriority,
        title: impl Into<String>,
        message: String,
        data: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new_v7(),
            beneficiary_id,
            kind,
            priority,
            title: title.into(),
            message,
            data,
            created_at,
        }
    }

    /// Renders the notification for a transition event, if it warrants one
    ///
    /// Routing to analysis, cancellations and guide usage are silent; an
    /// overdue invoice only notifies on the configured milestone days.
    pub fn from_event(event: &EngineEvent) -> Option<Notification> {
        let beneficiary_id = event.beneficiary_id();
        let at = event.timestamp();

        match event {
            EngineEvent::Guide(guide_event) => match guide_event {
                GuideEvent::Authorized { guide_number, guide_id, .. } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::GuideAuthorization,
                    NotificationPriority::High,
                    "Guia Autorizada",
                    format!("Sua guia {guide_number} foi autorizada automaticamente!"),
                    json!({ "guide_id": guide_id, "guide_number": guide_number }),
                    at,
                )),
                GuideEvent::Denied { guide_number, guide_id, reason, .. } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::GuideAuthorization,
                    NotificationPriority::High,
                    "Guia Negada",
                    format!(
                        "A guia {guide_number} foi negada: {}",
                        reason.description()
                    ),
                    json!({ "guide_id": guide_id, "guide_number": guide_number }),
                    at,
                )),
                GuideEvent::Expired { guide_number, guide_id, expiry_date, .. } => {
                    Some(Self::build(
                        beneficiary_id,
                        NotificationKind::GuideAuthorization,
                        NotificationPriority::Medium,
                        "Guia Expirada",
                        format!(
                            "A guia {guide_number} expirou em {}",
                            expiry_date.format("%d/%m/%Y")
                        ),
                        json!({ "guide_id": guide_id, "guide_number": guide_number }),
                        at,
                    ))
                }
                GuideEvent::SentToAnalysis { .. }
                | GuideEvent::Cancelled { .. }
                | GuideEvent::Used { .. } => None,
            },

            EngineEvent::Claim(claim_event) => match claim_event {
                ClaimEvent::Approved { protocol_number, claim_id, approved_amount, .. } => {
                    Some(Self::build(
                        beneficiary_id,
                        NotificationKind::ReimbursementStatus,
                        NotificationPriority::High,
                        "Reembolso Aprovado",
                        format!(
                            "Seu pedido de reembolso {protocol_number} foi aprovado! Valor: {approved_amount}"
                        ),
                        json!({
                            "reimbursement_id": claim_id,
                            "approved_amount": approved_amount.amount(),
                        }),
                        at,
                    ))
                }
                ClaimEvent::PartiallyApproved {
                    protocol_number, claim_id, approved_amount, ..
                } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::ReimbursementStatus,
                    NotificationPriority::High,
                    "Reembolso Aprovado Parcialmente",
                    format!(
                        "Seu pedido de reembolso {protocol_number} foi aprovado parcialmente. Valor: {approved_amount}"
                    ),
                    json!({
                        "reimbursement_id": claim_id,
                        "approved_amount": approved_amount.amount(),
                    }),
                    at,
                )),
                ClaimEvent::Denied { protocol_number, claim_id, reason, .. } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::ReimbursementStatus,
                    NotificationPriority::High,
                    "Reembolso Negado",
                    format!(
                        "Seu pedido de reembolso {protocol_number} foi negado: {}",
                        reason.description()
                    ),
                    json!({ "reimbursement_id": claim_id }),
                    at,
                )),
                ClaimEvent::Paid { protocol_number, claim_id, amount, .. } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::ReimbursementStatus,
                    NotificationPriority::Medium,
                    "Reembolso Pago",
                    format!("Seu reembolso {protocol_number} foi pago! Valor: {amount}"),
                    json!({ "reimbursement_id": claim_id, "amount": amount.amount() }),
                    at,
                )),
                ClaimEvent::Cancelled { .. } => None,
            },

            EngineEvent::Billing(billing_event) => match billing_event {
                BillingEvent::InvoiceGenerated {
                    invoice_id, period, amount, due_date, ..
                } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::InvoiceDue,
                    NotificationPriority::Medium,
                    "Nova Fatura Disponível",
                    format!(
                        "Sua fatura de {period} no valor de {amount} está disponível. Vencimento: {}",
                        due_date.format("%d/%m/%Y")
                    ),
                    json!({
                        "invoice_id": invoice_id,
                        "amount": amount.amount(),
                        "due_date": due_date,
                    }),
                    at,
                )),
                BillingEvent::InvoiceOverdue {
                    invoice_id, period, amount, days_overdue, ..
                } => {
                    if !OVERDUE_NOTIFY_DAYS.contains(days_overdue) {
                        return None;
                    }
                    Some(Self::build(
                        beneficiary_id,
                        NotificationKind::InvoiceDue,
                        NotificationPriority::High,
                        "Fatura Vencida",
                        format!(
                            "Sua fatura de {period} está vencida há {days_overdue} dia(s). Valor: {amount}"
                        ),
                        json!({
                            "invoice_id": invoice_id,
                            "amount": amount.amount(),
                            "days_overdue": days_overdue,
                        }),
                        at,
                    ))
                }
                BillingEvent::InvoicePaymentConfirmed {
                    invoice_id, period, amount_paid, ..
                } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::InvoiceDue,
                    NotificationPriority::Medium,
                    "Pagamento Confirmado",
                    format!(
                        "Seu pagamento da fatura {period} foi confirmado! Valor: {amount_paid}"
                    ),
                    json!({ "invoice_id": invoice_id, "amount_paid": amount_paid.amount() }),
                    at,
                )),
                BillingEvent::InvoicePartialPayment {
                    invoice_id, amount_paid, remaining, ..
                } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::InvoiceDue,
                    NotificationPriority::Medium,
                    "Pagamento Parcial Recebido",
                    format!(
                        "Recebemos seu pagamento parcial de {amount_paid}. Valor restante: {remaining}"
                    ),
                    json!({
                        "invoice_id": invoice_id,
                        "amount_paid": amount_paid.amount(),
                        "remaining": remaining.amount(),
                    }),
                    at,
                )),
                BillingEvent::InvoiceCancelled { .. } => None,
                BillingEvent::StatementGenerated {
                    statement_id, year, total_paid, ..
                } => Some(Self::build(
                    beneficiary_id,
                    NotificationKind::TaxStatement,
                    NotificationPriority::Medium,
                    "Informe de Rendimentos Disponível",
                    format!(
                        "Seu informe de rendimentos de {year} está disponível. Total: {total_paid}"
                    ),
                    json!({
                        "tax_statement_id": statement_id,
                        "year": year,
                        "total_paid": total_paid.amount(),
                    }),
                    at,
                )),
            },
        }
    }

    /// Reminder for a guide pending longer than the nudge threshold
    pub fn pending_guide_reminder(guide: &AuthorizationGuide, now: DateTime<Utc>) -> Notification {
        Self::build(
            guide.beneficiary_id,
            NotificationKind::GuideAuthorization,
            NotificationPriority::Medium,
            "Guia em Análise",
            format!(
                "Sua guia {} está sendo analisada. Em breve você receberá uma resposta.",
                guide.guide_number
            ),
            json!({ "guide_id": guide.id, "guide_number": guide.guide_number }),
            now,
        )
    }

    /// Reminder for a claim sitting in analysis past the nudge threshold
    pub fn pending_claim_reminder(claim: &ReimbursementClaim, now: DateTime<Utc>) -> Notification {
        Self::build(
            claim.beneficiary_id,
            NotificationKind::ReimbursementStatus,
            NotificationPriority::Medium,
            "Reembolso em Análise",
            format!(
                "Seu pedido de reembolso {} está sendo analisado. Em breve você receberá uma resposta.",
                claim.protocol_number
            ),
            json!({ "reimbursement_id": claim.id }),
            now,
        )
    }

    /// Sent when adjudication holds a claim for the manual review team
    pub fn claim_under_manual_review(
        claim: &ReimbursementClaim,
        now: DateTime<Utc>,
    ) -> Notification {
        Self::build(
            claim.beneficiary_id,
            NotificationKind::ReimbursementStatus,
            NotificationPriority::Medium,
            "Reembolso em Análise",
            format!(
                "Seu pedido de reembolso {} está sendo analisado por nossa equipe",
                claim.protocol_number
            ),
            json!({ "reimbursement_id": claim.id }),
            now,
        )
    }

    /// Reminder for an invoice due in three days
    pub fn upcoming_invoice_reminder(invoice: &Invoice, now: DateTime<Utc>) -> Notification {
        Self::build(
            invoice.beneficiary_id,
            NotificationKind::InvoiceDue,
            NotificationPriority::Medium,
            "Lembrete de Vencimento",
            format!(
                "Sua fatura de {} vence em 3 dias! Valor: {}",
                invoice.reference_period, invoice.amount
            ),
            json!({
                "invoice_id": invoice.id,
                "amount": invoice.amount.amount(),
                "due_date": invoice.due_date,
            }),
            now,
        )
    }
}
