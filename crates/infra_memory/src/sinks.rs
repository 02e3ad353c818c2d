//! In-memory notification and audit sinks
//!
//! Recording sinks with an optional failure injector, used by the runtime's
//! local mode and by the test suites to observe what the dispatcher emitted.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

use core_kernel::{DomainPort, PortError};
use engine_dispatch::{AuditRecord, AuditSink, Notification, NotificationSink};

/// Notification sink that records deliveries
#[derive(Default)]
pub struct InMemoryNotificationSink {
    sent: RwLock<Vec<Notification>>,
    fail_next: AtomicU32,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` deliveries fail with a connection error
    pub fn fail_next_deliveries(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Everything delivered so far
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    /// Number of delivered notifications
    pub async fn delivered_count(&self) -> usize {
        self.sent.read().await.len()
    }
}

impl DomainPort for InMemoryNotificationSink {}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn deliver(&self, notification: Notification) -> Result<(), PortError> {
        if self.fail_next.load(Ordering::SeqCst) > 0 {
            self.fail_next.fetch_sub(1, Ordering::SeqCst);
            return Err(PortError::connection("notification channel unavailable"));
        }
        self.sent.write().await.push(notification);
        Ok(())
    }
}

/// Audit sink that records entries
#[derive(Default)]
pub struct InMemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }
}

impl DomainPort for InMemoryAuditSink {}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<(), PortError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
