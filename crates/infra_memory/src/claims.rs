//! In-memory claim store and document index

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

use core_kernel::{ClaimId, DomainPort, PortError};
use domain_reimbursements::{
    ClaimStatus, ClaimStore, DocumentQuery, DocumentType, ReimbursementClaim,
};

/// Claim store backed by a `RwLock` map
#[derive(Default)]
pub struct InMemoryClaimStore {
    claims: RwLock<HashMap<ClaimId, ReimbursementClaim>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn get(&self, id: ClaimId) -> Result<ReimbursementClaim, PortError> {
        self.claims
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("ReimbursementClaim", id))
    }

    async fn insert(&self, claim: ReimbursementClaim) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        if claims.contains_key(&claim.id) {
            return Err(PortError::conflict(format!(
                "claim {} already exists",
                claim.id
            )));
        }
        claims.insert(claim.id, claim);
        Ok(())
    }

    async fn update(&self, claim: &ReimbursementClaim) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        let stored = claims
            .get_mut(&claim.id)
            .ok_or_else(|| PortError::not_found("ReimbursementClaim", claim.id))?;

        if stored.version + 1 != claim.version {
            return Err(PortError::conflict(format!(
                "claim {} at version {}, write carries {}",
                claim.id, stored.version, claim.version
            )));
        }
        *stored = claim.clone();
        Ok(())
    }

    async fn in_analysis_requested_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ReimbursementClaim>, PortError> {
        Ok(self
            .claims
            .read()
            .await
            .values()
            .filter(|claim| {
                claim.status == ClaimStatus::InAnalysis && claim.request_date < cutoff
            })
            .cloned()
            .collect())
    }
}

/// Document index mapping claims to their attached document types
#[derive(Default)]
pub struct InMemoryDocumentIndex {
    documents: RwLock<HashMap<ClaimId, BTreeSet<DocumentType>>>,
}

impl InMemoryDocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document type as attached to the claim
    pub async fn attach(&self, claim_id: ClaimId, document_type: DocumentType) {
        self.documents
            .write()
            .await
            .entry(claim_id)
            .or_default()
            .insert(document_type);
    }
}

impl DomainPort for InMemoryDocumentIndex {}

#[async_trait]
impl DocumentQuery for InMemoryDocumentIndex {
    async fn attached_document_types(
        &self,
        claim_id: ClaimId,
    ) -> Result<BTreeSet<DocumentType>, PortError> {
        Ok(self
            .documents
            .read()
            .await
            .get(&claim_id)
            .cloned()
            .unwrap_or_default())
    }
}
