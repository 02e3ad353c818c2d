//! Per-entity lease guard
//!
//! Before a job acts on an entity it must claim it. The claim is what keeps
//! two overlapping sweeps, or a sweep racing a synchronous intake trigger,
//! from both transitioning the same entity: whoever claims second skips the
//! entity this round and finds it already decided (or gone from the
//! candidate set) next round. Implementations back the claim with a lease
//! that expires, so a crashed worker cannot wedge an entity forever.

use async_trait::async_trait;

use core_kernel::DomainPort;

/// Atomic per-entity claims for jobs and triggers
#[async_trait]
pub trait LeaseGuard: DomainPort {
    /// Claims the entity for the named job; false when already held
    async fn try_claim(&self, entity_id: &str, job_name: &str) -> bool;

    /// Releases a claim taken with `try_claim`
    ///
    /// Releasing a lease that is not held is a no-op.
    async fn release(&self, entity_id: &str, job_name: &str);
}
