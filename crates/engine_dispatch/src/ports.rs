//! Notification and audit sink ports
//!
//! Delivery is fire-and-forget from the engine's perspective: the dispatcher
//! absorbs sink failures and retries them on its own queue.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use crate::audit::AuditRecord;
use crate::notification::Notification;

/// Delivers notifications to the beneficiary-facing channel
#[async_trait]
pub trait NotificationSink: DomainPort {
    async fn deliver(&self, notification: Notification) -> Result<(), PortError>;
}

/// Persists audit records
#[async_trait]
pub trait AuditSink: DomainPort {
    async fn record(&self, record: AuditRecord) -> Result<(), PortError>;
}
