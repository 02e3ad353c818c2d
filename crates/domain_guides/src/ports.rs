//! Guide store port
//!
//! Persistence technology is an external collaborator. The engine only
//! requires CRUD with an optimistic-version compare-and-swap plus the two
//! narrow queries its sweeps run. `update` must reject any write whose
//! version is not exactly one ahead of the stored version with
//! [`PortError::Conflict`], leaving the stored row untouched.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{DomainPort, GuideId, PortError};

use crate::guide::AuthorizationGuide;

/// Store for authorization guides
#[async_trait]
pub trait GuideStore: DomainPort {
    /// Loads a guide by ID
    async fn get(&self, id: GuideId) -> Result<AuthorizationGuide, PortError>;

    /// Inserts a newly requested guide
    async fn insert(&self, guide: AuthorizationGuide) -> Result<(), PortError>;

    /// Writes a transitioned guide, enforcing the version counter
    async fn update(&self, guide: &AuthorizationGuide) -> Result<(), PortError>;

    /// Authorized guides whose validity lapsed before the given date
    async fn authorized_expired_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AuthorizationGuide>, PortError>;

    /// Pending guides requested before the cutoff instant
    async fn pending_requested_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<AuthorizationGuide>, PortError>;
}
