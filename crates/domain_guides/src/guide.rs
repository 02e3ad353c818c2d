//! Authorization guide aggregate

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{BeneficiaryId, GuideId, Money, ProcedureId, ProviderId};

use crate::error::GuideError;
use crate::events::GuideEvent;
use crate::policy::{GuideDenialReason, GUIDE_VALIDITY_DAYS};

/// Guide type per the TISS exchange standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuideType {
    /// Elective consultation
    Consultation,
    /// Emergency care
    Emergency,
    /// SP/SADT - support services (exams, therapies)
    SpSadt,
    /// Hospitalization
    Hospitalization,
}

impl GuideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideType::Consultation => "CONSULTATION",
            GuideType::Emergency => "EMERGENCY",
            GuideType::SpSadt => "SP_SADT",
            GuideType::Hospitalization => "HOSPITALIZATION",
        }
    }
}

/// Guide status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuideStatus {
    /// Awaiting adjudication
    Pending,
    /// Routed to manual review
    InAnalysis,
    /// Authorized; valid until the expiry date
    Authorized,
    /// Denied
    Denied,
    /// Cancelled by the beneficiary or operator
    Cancelled,
    /// Authorization lapsed unused
    Expired,
    /// Procedures performed at the provider
    Used,
}

impl GuideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideStatus::Pending => "PENDING",
            GuideStatus::InAnalysis => "IN_ANALYSIS",
            GuideStatus::Authorized => "AUTHORIZED",
            GuideStatus::Denied => "DENIED",
            GuideStatus::Cancelled => "CANCELLED",
            GuideStatus::Expired => "EXPIRED",
            GuideStatus::Used => "USED",
        }
    }

    /// True for states that accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GuideStatus::Denied | GuideStatus::Cancelled | GuideStatus::Expired | GuideStatus::Used
        )
    }

    /// True while the guide still awaits a decision
    pub fn is_awaiting_decision(&self) -> bool {
        matches!(self, GuideStatus::Pending | GuideStatus::InAnalysis)
    }
}

impl std::fmt::Display for GuideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested procedure on a guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureLine {
    /// Procedure reference (master data)
    pub procedure_id: ProcedureId,
    /// Requested quantity
    pub quantity: u32,
    /// Unit price at request time
    pub unit_price: Money,
    /// Quantity granted by adjudication; zero until authorized
    pub authorized_quantity: u32,
}

impl ProcedureLine {
    /// Creates a requested line with nothing authorized yet
    pub fn new(procedure_id: ProcedureId, quantity: u32, unit_price: Money) -> Self {
        Self {
            procedure_id,
            quantity,
            unit_price,
            authorized_quantity: 0,
        }
    }

    /// Total requested value of this line
    pub fn total_price(&self) -> Money {
        Money::new(self.unit_price.amount() * Decimal::from(self.quantity))
    }
}

/// An authorization guide
///
/// The engine exclusively owns `status`, the timestamp fields and the
/// authorized quantities; everything else is written once at intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationGuide {
    /// Unique identifier
    pub id: GuideId,
    /// Guide number (human-readable)
    pub guide_number: String,
    /// Protocol number handed to the beneficiary
    pub protocol_number: String,
    /// Guide type
    pub guide_type: GuideType,
    /// Status
    pub status: GuideStatus,
    /// Optimistic version counter, bumped by every transition
    pub version: u64,
    /// When the guide was requested
    pub request_date: DateTime<Utc>,
    /// When the guide was authorized
    pub authorization_date: Option<DateTime<Utc>>,
    /// Last day the authorization can be used
    pub expiry_date: Option<NaiveDate>,
    /// Requesting beneficiary
    pub beneficiary_id: BeneficiaryId,
    /// Executing provider
    pub provider_id: ProviderId,
    /// Requested procedures
    pub procedures: Vec<ProcedureLine>,
    /// Clinical indication
    pub diagnosis: String,
    /// Populated when denied
    pub denial_reason: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl AuthorizationGuide {
    /// Creates a new pending guide at intake
    pub fn request(
        guide_type: GuideType,
        beneficiary_id: BeneficiaryId,
        provider_id: ProviderId,
        procedures: Vec<ProcedureLine>,
        diagnosis: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: GuideId::new_v7(),
            guide_number: generate_guide_number(now),
            protocol_number: generate_protocol_number(),
            guide_type,
            status: GuideStatus::Pending,
            version: 1,
            request_date: now,
            authorization_date: None,
            expiry_date: None,
            beneficiary_id,
            provider_id,
            procedures,
            diagnosis: diagnosis.into(),
            denial_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total requested value across all procedure lines
    pub fn total_requested(&self) -> Money {
        self.procedures.iter().map(|line| line.total_price()).sum()
    }

    /// Routes the guide to manual review
    pub fn send_to_analysis(&mut self, now: DateTime<Utc>) -> Result<GuideEvent, GuideError> {
        self.ensure_transition(GuideStatus::InAnalysis)?;

        let old_status = self.status;
        self.status = GuideStatus::InAnalysis;
        self.touch(now);

        Ok(GuideEvent::SentToAnalysis {
            guide_id: self.id,
            guide_number: self.guide_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            timestamp: now,
        })
    }

    /// Authorizes the guide, granting each line its requested quantity
    pub fn authorize_in_full(&mut self, now: DateTime<Utc>) -> Result<GuideEvent, GuideError> {
        let quantities: Vec<u32> = self.procedures.iter().map(|line| line.quantity).collect();
        self.authorize(&quantities, now)
    }

    /// Authorizes the guide with explicit per-line quantities
    ///
    /// The authorization is valid for thirty days from the decision.
    pub fn authorize(
        &mut self,
        authorized: &[u32],
        now: DateTime<Utc>,
    ) -> Result<GuideEvent, GuideError> {
        self.ensure_transition(GuideStatus::Authorized)?;

        if authorized.len() != self.procedures.len() {
            return Err(GuideError::AuthorizedQuantityCountMismatch {
                expected: self.procedures.len(),
                got: authorized.len(),
            });
        }
        for (line, &granted) in self.procedures.iter().zip(authorized) {
            if granted > line.quantity {
                return Err(GuideError::AuthorizedQuantityExceedsRequested {
                    procedure: line.procedure_id,
                    requested: line.quantity,
                    authorized: granted,
                });
            }
        }

        let old_status = self.status;
        let expiry = now.date_naive() + Days::new(GUIDE_VALIDITY_DAYS);

        for (line, &granted) in self.procedures.iter_mut().zip(authorized) {
            line.authorized_quantity = granted;
        }
        self.status = GuideStatus::Authorized;
        self.authorization_date = Some(now);
        self.expiry_date = Some(expiry);
        self.touch(now);

        Ok(GuideEvent::Authorized {
            guide_id: self.id,
            guide_number: self.guide_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            expiry_date: expiry,
            timestamp: now,
        })
    }

    /// Denies the guide with a reason
    pub fn deny(
        &mut self,
        reason: GuideDenialReason,
        now: DateTime<Utc>,
    ) -> Result<GuideEvent, GuideError> {
        self.ensure_transition(GuideStatus::Denied)?;

        let old_status = self.status;
        self.status = GuideStatus::Denied;
        self.denial_reason = Some(reason.description().to_string());
        self.touch(now);

        Ok(GuideEvent::Denied {
            guide_id: self.id,
            guide_number: self.guide_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            reason,
            timestamp: now,
        })
    }

    /// Cancels the guide
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<GuideEvent, GuideError> {
        self.ensure_transition(GuideStatus::Cancelled)?;

        let old_status = self.status;
        self.status = GuideStatus::Cancelled;
        self.touch(now);

        Ok(GuideEvent::Cancelled {
            guide_id: self.id,
            guide_number: self.guide_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            timestamp: now,
        })
    }

    /// Expires an authorized guide whose validity lapsed
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<GuideEvent, GuideError> {
        self.ensure_transition(GuideStatus::Expired)?;

        let expiry_date = self
            .expiry_date
            .expect("authorized guide always carries an expiry date");
        if now.date_naive() <= expiry_date {
            return Err(GuideError::NotYetExpired { expiry_date });
        }

        let old_status = self.status;
        self.status = GuideStatus::Expired;
        self.touch(now);

        Ok(GuideEvent::Expired {
            guide_id: self.id,
            guide_number: self.guide_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            expiry_date,
            timestamp: now,
        })
    }

    /// Marks the authorization as used at the provider
    pub fn mark_used(&mut self, now: DateTime<Utc>) -> Result<GuideEvent, GuideError> {
        self.ensure_transition(GuideStatus::Used)?;

        let old_status = self.status;
        self.status = GuideStatus::Used;
        self.touch(now);

        Ok(GuideEvent::Used {
            guide_id: self.id,
            guide_number: self.guide_number.clone(),
            beneficiary_id: self.beneficiary_id,
            old_status,
            timestamp: now,
        })
    }

    /// Checks the legal-transition table
    fn can_transition_to(&self, target: GuideStatus) -> bool {
        use GuideStatus::*;
        matches!(
            (self.status, target),
            (Pending, InAnalysis)
                | (Pending, Authorized)
                | (InAnalysis, Authorized)
                | (Pending, Denied)
                | (InAnalysis, Denied)
                | (Pending, Cancelled)
                | (InAnalysis, Cancelled)
                | (Authorized, Cancelled)
                | (Authorized, Expired)
                | (Authorized, Used)
        )
    }

    fn ensure_transition(&self, target: GuideStatus) -> Result<(), GuideError> {
        if !self.can_transition_to(target) {
            return Err(GuideError::InvalidStatusTransition {
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

/// Generates a unique guide number
fn generate_guide_number(now: DateTime<Utc>) -> String {
    format!("GUIDE{:010}", now.timestamp_millis() % 10_000_000_000)
}

/// Generates a unique protocol number
fn generate_protocol_number() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("PROT{}", &hex[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_guide(guide_type: GuideType) -> AuthorizationGuide {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        AuthorizationGuide::request(
            guide_type,
            BeneficiaryId::new(),
            ProviderId::new(),
            vec![
                ProcedureLine::new(ProcedureId::new(), 2, Money::new(dec!(120.00))),
                ProcedureLine::new(ProcedureId::new(), 1, Money::new(dec!(80.00))),
            ],
            "routine check",
            now,
        )
    }

    #[test]
    fn test_request_starts_pending_without_authorization_fields() {
        let guide = sample_guide(GuideType::Consultation);

        assert_eq!(guide.status, GuideStatus::Pending);
        assert_eq!(guide.version, 1);
        assert!(guide.authorization_date.is_none());
        assert!(guide.expiry_date.is_none());
        assert!(guide.guide_number.starts_with("GUIDE"));
        assert!(guide.protocol_number.starts_with("PROT"));
        assert_eq!(guide.total_requested().amount(), dec!(320.00));
    }

    #[test]
    fn test_authorize_in_full_sets_expiry_and_quantities() {
        let mut guide = sample_guide(GuideType::Consultation);
        let now = guide.request_date;

        let event = guide.authorize_in_full(now).unwrap();

        assert_eq!(guide.status, GuideStatus::Authorized);
        assert_eq!(guide.version, 2);
        assert_eq!(guide.authorization_date, Some(now));
        assert_eq!(
            guide.expiry_date,
            Some(now.date_naive() + Days::new(GUIDE_VALIDITY_DAYS))
        );
        assert!(guide
            .procedures
            .iter()
            .all(|line| line.authorized_quantity == line.quantity));
        assert!(matches!(event, GuideEvent::Authorized { .. }));
    }

    #[test]
    fn test_authorize_rejects_quantity_above_requested() {
        let mut guide = sample_guide(GuideType::SpSadt);
        let now = guide.request_date;

        let result = guide.authorize(&[3, 1], now);

        assert!(matches!(
            result,
            Err(GuideError::AuthorizedQuantityExceedsRequested { requested: 2, authorized: 3, .. })
        ));
        // failed transition leaves the guide untouched
        assert_eq!(guide.status, GuideStatus::Pending);
        assert_eq!(guide.version, 1);
        assert!(guide.expiry_date.is_none());
    }

    #[test]
    fn test_partial_authorization_is_allowed() {
        let mut guide = sample_guide(GuideType::SpSadt);
        let now = guide.request_date;

        guide.send_to_analysis(now).unwrap();
        guide.authorize(&[1, 0], now).unwrap();

        assert_eq!(guide.procedures[0].authorized_quantity, 1);
        assert_eq!(guide.procedures[1].authorized_quantity, 0);
        assert_eq!(guide.version, 3);
    }

    #[test]
    fn test_deny_records_reason() {
        let mut guide = sample_guide(GuideType::Consultation);
        let now = guide.request_date;

        guide
            .deny(GuideDenialReason::BeneficiaryInactive, now)
            .unwrap();

        assert_eq!(guide.status, GuideStatus::Denied);
        assert_eq!(guide.denial_reason.as_deref(), Some("Beneficiário inativo"));
    }

    #[test]
    fn test_expire_requires_lapsed_validity() {
        let mut guide = sample_guide(GuideType::Emergency);
        let now = guide.request_date;
        guide.authorize_in_full(now).unwrap();

        // same day: still valid
        assert!(matches!(
            guide.expire(now),
            Err(GuideError::NotYetExpired { .. })
        ));

        let later = now + chrono::Duration::days(GUIDE_VALIDITY_DAYS as i64 + 1);
        let event = guide.expire(later).unwrap();

        assert_eq!(guide.status, GuideStatus::Expired);
        // authorization date survives expiry
        assert!(guide.authorization_date.is_some());
        assert!(matches!(event, GuideEvent::Expired { .. }));
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        let mut guide = sample_guide(GuideType::Consultation);
        let now = guide.request_date;
        guide.deny(GuideDenialReason::ProviderNotAccredited, now).unwrap();

        let result = guide.authorize_in_full(now);

        assert!(matches!(
            result,
            Err(GuideError::InvalidStatusTransition {
                from: GuideStatus::Denied,
                to: GuideStatus::Authorized,
            })
        ));
    }

    #[test]
    fn test_pending_cannot_expire() {
        let mut guide = sample_guide(GuideType::Consultation);
        let now = guide.request_date;

        assert!(matches!(
            guide.expire(now),
            Err(GuideError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_status_serialization_uses_wire_names() {
        let json = serde_json::to_string(&GuideStatus::InAnalysis).unwrap();
        assert_eq!(json, "\"IN_ANALYSIS\"");

        let json = serde_json::to_string(&GuideType::SpSadt).unwrap();
        assert_eq!(json, "\"SP_SADT\"");
    }
}
