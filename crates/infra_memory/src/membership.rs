//! In-memory membership directory

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use core_kernel::{BeneficiaryId, DomainPort, PortError, ProviderId};
use domain_membership::{MembershipPort, TitularProfile};

/// Membership directory backed by `RwLock` maps
///
/// Unknown beneficiaries and providers read as inactive, matching how the
/// engine treats someone who was purged from master data.
#[derive(Default)]
pub struct InMemoryMembershipDirectory {
    beneficiaries: RwLock<HashMap<BeneficiaryId, bool>>,
    providers: RwLock<HashMap<ProviderId, bool>>,
    titulars: RwLock<Vec<TitularProfile>>,
}

impl InMemoryMembershipDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a beneficiary with the given activity flag
    pub async fn set_beneficiary(&self, id: BeneficiaryId, active: bool) {
        self.beneficiaries.write().await.insert(id, active);
    }

    /// Registers a provider with the given activity flag
    pub async fn set_provider(&self, id: ProviderId, active: bool) {
        self.providers.write().await.insert(id, active);
    }

    /// Registers a titular billing profile and marks the beneficiary active
    pub async fn add_titular(&self, profile: TitularProfile) {
        self.set_beneficiary(profile.beneficiary_id, true).await;
        self.titulars.write().await.push(profile);
    }
}

impl DomainPort for InMemoryMembershipDirectory {}

#[async_trait]
impl MembershipPort for InMemoryMembershipDirectory {
    async fn is_beneficiary_active(&self, id: BeneficiaryId) -> Result<bool, PortError> {
        Ok(self
            .beneficiaries
            .read()
            .await
            .get(&id)
            .copied()
            .unwrap_or(false))
    }

    async fn is_provider_active(&self, id: ProviderId) -> Result<bool, PortError> {
        Ok(self
            .providers
            .read()
            .await
            .get(&id)
            .copied()
            .unwrap_or(false))
    }

    async fn titular_profiles(&self) -> Result<Vec<TitularProfile>, PortError> {
        Ok(self.titulars.read().await.clone())
    }
}
