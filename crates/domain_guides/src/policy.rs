//! Guide adjudication policy
//!
//! Pure decision logic: the facts come in, a decision comes out. The policy
//! never reads the clock, never touches a store and never fails — every
//! guide gets exactly one of Authorize, Deny or Hold.
//!
//! Rules are an ordered catalog evaluated top to bottom; the first rule that
//! produces a decision wins. The catalog is public so tests can assert the
//! order directly.

use serde::{Deserialize, Serialize};

use crate::guide::{AuthorizationGuide, GuideType};

/// Days an authorization stays valid once granted
pub const GUIDE_VALIDITY_DAYS: u64 = 30;

/// Facts the policy needs beyond the guide itself
///
/// Activity flags are resolved by the caller through the membership port so
/// the policy stays synchronous and deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideFacts {
    pub beneficiary_active: bool,
    pub provider_active: bool,
}

/// Why a guide was denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuideDenialReason {
    /// Beneficiary not active in the plan
    BeneficiaryInactive,
    /// Provider no longer accredited
    ProviderNotAccredited,
    /// Manual denial by a reviewer
    Manual(String),
}

impl GuideDenialReason {
    /// Human-readable description, as shown to the beneficiary
    pub fn description(&self) -> &str {
        match self {
            GuideDenialReason::BeneficiaryInactive => "Beneficiário inativo",
            GuideDenialReason::ProviderNotAccredited => "Prestador não credenciado",
            GuideDenialReason::Manual(text) => text,
        }
    }
}

/// Outcome of evaluating the guide policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideDecision {
    /// Grant every requested procedure in full
    Authorize,
    /// Deny with a reason
    Deny(GuideDenialReason),
    /// Leave for manual disposition
    Hold,
}

/// A single policy rule: returns a decision when it matches
pub struct GuideRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    matcher: fn(&AuthorizationGuide, &GuideFacts) -> Option<GuideDecision>,
}

impl GuideRule {
    /// Evaluates this rule against a guide
    pub fn evaluate(&self, guide: &AuthorizationGuide, facts: &GuideFacts) -> Option<GuideDecision> {
        (self.matcher)(guide, facts)
    }
}

static RULES: [GuideRule; 3] = [
    GuideRule {
        name: "deny_inactive_beneficiary",
        matcher: |_, facts| {
            (!facts.beneficiary_active)
                .then(|| GuideDecision::Deny(GuideDenialReason::BeneficiaryInactive))
        },
    },
    GuideRule {
        name: "deny_unaccredited_provider",
        matcher: |_, facts| {
            (!facts.provider_active)
                .then(|| GuideDecision::Deny(GuideDenialReason::ProviderNotAccredited))
        },
    },
    GuideRule {
        name: "auto_authorize_consultation_emergency",
        matcher: |guide, _| {
            matches!(
                guide.guide_type,
                GuideType::Consultation | GuideType::Emergency
            )
            .then_some(GuideDecision::Authorize)
        },
    },
];

/// The guide adjudication policy
pub struct GuidePolicy;

impl GuidePolicy {
    /// The ordered rule catalog
    pub fn rules() -> &'static [GuideRule] {
        &RULES
    }

    /// Evaluates the catalog, first match wins; no match means Hold
    ///
    /// SP/SADT and hospitalization guides fall through every rule and stay
    /// with the manual review queue.
    pub fn evaluate(guide: &AuthorizationGuide, facts: &GuideFacts) -> GuideDecision {
        for rule in Self::rules() {
            if let Some(decision) = rule.evaluate(guide, facts) {
                return decision;
            }
        }
        GuideDecision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::ProcedureLine;
    use chrono::{TimeZone, Utc};
    use core_kernel::{BeneficiaryId, Money, ProcedureId, ProviderId};
    use rust_decimal_macros::dec;

    fn guide_of_type(guide_type: GuideType) -> AuthorizationGuide {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        AuthorizationGuide::request(
            guide_type,
            BeneficiaryId::new(),
            ProviderId::new(),
            vec![ProcedureLine::new(
                ProcedureId::new(),
                1,
                Money::new(dec!(150.00)),
            )],
            "diagnosis",
            now,
        )
    }

    const ACTIVE: GuideFacts = GuideFacts {
        beneficiary_active: true,
        provider_active: true,
    };

    #[test]
    fn test_inactive_beneficiary_denies_before_anything_else() {
        let guide = guide_of_type(GuideType::Emergency);
        let facts = GuideFacts {
            beneficiary_active: false,
            provider_active: false,
        };

        // both flags are off; the beneficiary rule sits first in the catalog
        assert_eq!(
            GuidePolicy::evaluate(&guide, &facts),
            GuideDecision::Deny(GuideDenialReason::BeneficiaryInactive)
        );
    }

    #[test]
    fn test_unaccredited_provider_denies() {
        let guide = guide_of_type(GuideType::Consultation);
        let facts = GuideFacts {
            beneficiary_active: true,
            provider_active: false,
        };

        assert_eq!(
            GuidePolicy::evaluate(&guide, &facts),
            GuideDecision::Deny(GuideDenialReason::ProviderNotAccredited)
        );
    }

    #[test]
    fn test_consultation_and_emergency_auto_authorize() {
        for guide_type in [GuideType::Consultation, GuideType::Emergency] {
            let guide = guide_of_type(guide_type);
            assert_eq!(GuidePolicy::evaluate(&guide, &ACTIVE), GuideDecision::Authorize);
        }
    }

    #[test]
    fn test_sp_sadt_and_hospitalization_hold() {
        for guide_type in [GuideType::SpSadt, GuideType::Hospitalization] {
            let guide = guide_of_type(guide_type);
            assert_eq!(GuidePolicy::evaluate(&guide, &ACTIVE), GuideDecision::Hold);
        }
    }

    #[test]
    fn test_rule_catalog_order_is_pinned() {
        let names: Vec<&str> = GuidePolicy::rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "deny_inactive_beneficiary",
                "deny_unaccredited_provider",
                "auto_authorize_consultation_emergency",
            ]
        );
    }

    #[test]
    fn test_policy_is_deterministic() {
        let guide = guide_of_type(GuideType::Hospitalization);
        let first = GuidePolicy::evaluate(&guide, &ACTIVE);

        for _ in 0..10 {
            assert_eq!(GuidePolicy::evaluate(&guide, &ACTIVE), first);
        }
    }
}
