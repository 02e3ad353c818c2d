//! In-memory guide store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, GuideId, PortError};
use domain_guides::{AuthorizationGuide, GuideStatus, GuideStore};

/// Guide store backed by a `RwLock` map
#[derive(Default)]
pub struct InMemoryGuideStore {
    guides: RwLock<HashMap<GuideId, AuthorizationGuide>>,
}

impl InMemoryGuideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored guides
    pub async fn len(&self) -> usize {
        self.guides.read().await.len()
    }

    /// True when no guides are stored
    pub async fn is_empty(&self) -> bool {
        self.guides.read().await.is_empty()
    }
}

impl DomainPort for InMemoryGuideStore {}

#[async_trait]
impl GuideStore for InMemoryGuideStore {
    async fn get(&self, id: GuideId) -> Result<AuthorizationGuide, PortError> {
        self.guides
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("AuthorizationGuide", id))
    }

    async fn insert(&self, guide: AuthorizationGuide) -> Result<(), PortError> {
        let mut guides = self.guides.write().await;
        if guides.contains_key(&guide.id) {
            return Err(PortError::conflict(format!(
                "guide {} already exists",
                guide.id
            )));
        }
        guides.insert(guide.id, guide);
        Ok(())
    }

    async fn update(&self, guide: &AuthorizationGuide) -> Result<(), PortError> {
        let mut guides = self.guides.write().await;
        let stored = guides
            .get_mut(&guide.id)
            .ok_or_else(|| PortError::not_found("AuthorizationGuide", guide.id))?;

        if stored.version + 1 != guide.version {
            return Err(PortError::conflict(format!(
                "guide {} at version {}, write carries {}",
                guide.id, stored.version, guide.version
            )));
        }
        *stored = guide.clone();
        Ok(())
    }

    async fn authorized_expired_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AuthorizationGuide>, PortError> {
        Ok(self
            .guides
            .read()
            .await
            .values()
            .filter(|guide| {
                guide.status == GuideStatus::Authorized
                    && guide.expiry_date.is_some_and(|expiry| expiry < date)
            })
            .cloned()
            .collect())
    }

    async fn pending_requested_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<AuthorizationGuide>, PortError> {
        Ok(self
            .guides
            .read()
            .await
            .values()
            .filter(|guide| {
                guide.status == GuideStatus::Pending && guide.request_date < cutoff
            })
            .cloned()
            .collect())
    }
}
