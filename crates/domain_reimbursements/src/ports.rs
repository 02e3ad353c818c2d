//! Claim store and document query ports

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use core_kernel::{ClaimId, DomainPort, PortError};

use crate::claim::{DocumentType, ReimbursementClaim};

/// Store for reimbursement claims
///
/// `update` must reject any write whose version is not exactly one ahead of
/// the stored version with [`PortError::Conflict`].
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Loads a claim by ID
    async fn get(&self, id: ClaimId) -> Result<ReimbursementClaim, PortError>;

    /// Inserts a newly submitted claim
    async fn insert(&self, claim: ReimbursementClaim) -> Result<(), PortError>;

    /// Writes a transitioned claim, enforcing the version counter
    async fn update(&self, claim: &ReimbursementClaim) -> Result<(), PortError>;

    /// Claims still in analysis that were submitted before the cutoff
    async fn in_analysis_requested_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ReimbursementClaim>, PortError>;
}

/// Which document types are attached to a claim
///
/// The upload collaborator owns the files; adjudication only needs the
/// presence of invoice and prescription documents.
#[async_trait]
pub trait DocumentQuery: DomainPort {
    async fn attached_document_types(
        &self,
        claim_id: ClaimId,
    ) -> Result<BTreeSet<DocumentType>, PortError>;
}
