//! Side-Effect Dispatcher
//!
//! State transitions commit first; everything the beneficiary or an auditor
//! sees happens afterwards, driven by the domain event the transition
//! produced. This crate turns those events into notification and audit
//! records and delivers them to their sinks without ever failing back into
//! the caller: a sink error is logged and retried by a background worker,
//! never rolled into the already-committed transition.

pub mod event;
pub mod notification;
pub mod audit;
pub mod ports;
pub mod dispatcher;

pub use event::EngineEvent;
pub use notification::{Notification, NotificationKind, NotificationPriority, OVERDUE_NOTIFY_DAYS};
pub use audit::{AuditRecord, SYSTEM_ACTOR};
pub use ports::{AuditSink, NotificationSink};
pub use dispatcher::{Dispatcher, RetryWorker};
