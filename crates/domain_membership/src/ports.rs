//! Membership port
//!
//! The engine treats enrollment as read-only reference data: activity checks
//! feed the adjudication policies, and titular profiles feed monthly invoice
//! generation. Adapters may be backed by the enrollment database, an
//! external registry API, or an in-memory directory for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{BeneficiaryId, DomainPort, Money, PortError, ProviderId};

/// Billing profile of a titular (plan-holding) beneficiary
///
/// Dependents ride on the titular's invoice at half the titular fee each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitularProfile {
    /// The titular beneficiary
    pub beneficiary_id: BeneficiaryId,
    /// Monthly plan fee for the titular
    pub monthly_fee: Money,
    /// Number of active dependents under this titular
    pub active_dependents: u32,
}

/// Read-only lookups against enrollment master data
#[async_trait]
pub trait MembershipPort: DomainPort {
    /// Whether the beneficiary is currently active in the plan
    async fn is_beneficiary_active(&self, id: BeneficiaryId) -> Result<bool, PortError>;

    /// Whether the provider is currently accredited
    async fn is_provider_active(&self, id: ProviderId) -> Result<bool, PortError>;

    /// Billing profiles of every active titular beneficiary
    async fn titular_profiles(&self) -> Result<Vec<TitularProfile>, PortError>;
}
