//! Short-TTL read-through cache over a membership source
//!
//! Sweeps ask the same activity questions for many entities in one run.
//! Master data changes rarely within a sweep window, so answers are cached
//! for a short TTL keyed by the injected clock. Titular profiles are read
//! once a month and are not cached.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{BeneficiaryId, Clock, DomainPort, PortError, ProviderId};

use crate::ports::{MembershipPort, TitularProfile};

#[derive(Debug, Clone, Copy)]
struct CachedFlag {
    active: bool,
    fetched_at: DateTime<Utc>,
}

/// Caching decorator for any [`MembershipPort`]
pub struct CachedMembership {
    inner: Arc<dyn MembershipPort>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    beneficiaries: RwLock<HashMap<BeneficiaryId, CachedFlag>>,
    providers: RwLock<HashMap<ProviderId, CachedFlag>>,
}

impl CachedMembership {
    /// Wraps a membership source with the given time-to-live
    pub fn new(inner: Arc<dyn MembershipPort>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            inner,
            clock,
            ttl,
            beneficiaries: RwLock::new(HashMap::new()),
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Wraps a membership source with the default 60-second TTL
    pub fn with_default_ttl(inner: Arc<dyn MembershipPort>, clock: Arc<dyn Clock>) -> Self {
        Self::new(inner, clock, Duration::seconds(60))
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>) -> bool {
        self.clock.now() - fetched_at < self.ttl
    }

    /// Drops every cached answer
    pub async fn invalidate(&self) {
        self.beneficiaries.write().await.clear();
        self.providers.write().await.clear();
    }
}

impl DomainPort for CachedMembership {}

#[async_trait]
impl MembershipPort for CachedMembership {
    async fn is_beneficiary_active(&self, id: BeneficiaryId) -> Result<bool, PortError> {
        if let Some(cached) = self.beneficiaries.read().await.get(&id) {
            if self.is_fresh(cached.fetched_at) {
                return Ok(cached.active);
            }
        }

        let active = self.inner.is_beneficiary_active(id).await?;
        self.beneficiaries.write().await.insert(
            id,
            CachedFlag {
                active,
                fetched_at: self.clock.now(),
            },
        );
        Ok(active)
    }

    async fn is_provider_active(&self, id: ProviderId) -> Result<bool, PortError> {
        if let Some(cached) = self.providers.read().await.get(&id) {
            if self.is_fresh(cached.fetched_at) {
                return Ok(cached.active);
            }
        }

        let active = self.inner.is_provider_active(id).await?;
        self.providers.write().await.insert(
            id,
            CachedFlag {
                active,
                fetched_at: self.clock.now(),
            },
        );
        Ok(active)
    }

    async fn titular_profiles(&self) -> Result<Vec<TitularProfile>, PortError> {
        self.inner.titular_profiles().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::FixedClock;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Counts how often the underlying source is hit
    struct CountingSource {
        calls: AtomicU32,
    }

    impl DomainPort for CountingSource {}

    #[async_trait]
    impl MembershipPort for CountingSource {
        async fn is_beneficiary_active(&self, _id: BeneficiaryId) -> Result<bool, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn is_provider_active(&self, _id: ProviderId) -> Result<bool, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn titular_profiles(&self) -> Result<Vec<TitularProfile>, PortError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_cache_serves_fresh_answers_without_refetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
        });
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let cache =
            CachedMembership::new(source.clone(), Arc::new(clock), Duration::seconds(60));

        let id = BeneficiaryId::new();
        assert!(cache.is_beneficiary_active(id).await.unwrap());
        assert!(cache.is_beneficiary_active(id).await.unwrap());

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_refetches_after_ttl() {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
        });
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let cache = CachedMembership::new(
            source.clone(),
            Arc::new(clock.clone()),
            Duration::seconds(60),
        );

        let id = BeneficiaryId::new();
        cache.is_beneficiary_active(id).await.unwrap();

        clock.advance(Duration::seconds(61));
        cache.is_beneficiary_active(id).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
