//! In-Memory Adapters
//!
//! Reference implementations of every port the engine consumes, backed by
//! `RwLock` maps. They honor the same contracts a database-backed adapter
//! must: compare-and-swap on the version counter, per-period uniqueness for
//! invoices, expiring leases for the concurrency guard. The runtime wires
//! them for local operation and the test suites drive the engine through
//! them.

pub mod guides;
pub mod claims;
pub mod billing;
pub mod membership;
pub mod leases;
pub mod sinks;

pub use guides::InMemoryGuideStore;
pub use claims::{InMemoryClaimStore, InMemoryDocumentIndex};
pub use billing::{InMemoryInvoiceStore, InMemoryStatementStore};
pub use membership::InMemoryMembershipDirectory;
pub use leases::InMemoryLeaseGuard;
pub use sinks::{InMemoryAuditSink, InMemoryNotificationSink};
