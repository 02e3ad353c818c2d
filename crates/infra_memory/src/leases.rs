//! In-memory lease guard

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use core_kernel::{Clock, DomainPort};
use engine_adjudication::LeaseGuard;

#[derive(Debug, Clone)]
struct Lease {
    job_name: String,
    expires_at: DateTime<Utc>,
}

/// Lease guard backed by a mutex-protected map
///
/// Claims expire after the TTL, so a worker that died mid-entity only
/// blocks it for one lease window.
pub struct InMemoryLeaseGuard {
    leases: Mutex<HashMap<String, Lease>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl InMemoryLeaseGuard {
    /// Creates a guard with the given lease TTL
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            leases: Mutex::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    /// Creates a guard with the default five-minute TTL
    pub fn with_default_ttl(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, Duration::minutes(5))
    }
}

impl DomainPort for InMemoryLeaseGuard {}

#[async_trait]
impl LeaseGuard for InMemoryLeaseGuard {
    async fn try_claim(&self, entity_id: &str, job_name: &str) -> bool {
        let now = self.clock.now();
        let mut leases = self.leases.lock().await;

        if let Some(lease) = leases.get(entity_id) {
            if lease.expires_at > now {
                return false;
            }
        }

        leases.insert(
            entity_id.to_string(),
            Lease {
                job_name: job_name.to_string(),
                expires_at: now + self.ttl,
            },
        );
        true
    }

    async fn release(&self, entity_id: &str, job_name: &str) {
        let mut leases = self.leases.lock().await;
        if leases
            .get(entity_id)
            .is_some_and(|lease| lease.job_name == job_name)
        {
            leases.remove(entity_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::FixedClock;

    #[tokio::test]
    async fn test_second_claim_is_rejected_until_release() {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let guard = InMemoryLeaseGuard::with_default_ttl(Arc::new(clock));

        assert!(guard.try_claim("GDE-1", "expire_guides").await);
        assert!(!guard.try_claim("GDE-1", "adjudicate_guide").await);

        guard.release("GDE-1", "expire_guides").await;
        assert!(guard.try_claim("GDE-1", "adjudicate_guide").await);
    }

    #[tokio::test]
    async fn test_release_by_other_job_is_a_noop() {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let guard = InMemoryLeaseGuard::with_default_ttl(Arc::new(clock));

        assert!(guard.try_claim("RMB-1", "adjudicate_claim").await);
        guard.release("RMB-1", "some_other_job").await;

        assert!(!guard.try_claim("RMB-1", "adjudicate_claim").await);
    }

    #[tokio::test]
    async fn test_expired_lease_can_be_reclaimed() {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let guard = InMemoryLeaseGuard::new(Arc::new(clock.clone()), Duration::minutes(5));

        assert!(guard.try_claim("FAT-1", "flag_overdue_invoices").await);

        // worker died; lease lapses
        clock.advance(Duration::minutes(6));
        assert!(guard.try_claim("FAT-1", "flag_overdue_invoices").await);
    }
}
