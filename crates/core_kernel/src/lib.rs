//! Core Kernel - Foundational types and utilities for the health-plan engine
//!
//! This crate provides the fundamental building blocks used across all domain
//! and engine modules:
//! - Money types with precise BRL decimal arithmetic
//! - An injectable clock so time-sensitive rules stay deterministic
//! - Common identifiers and value objects
//! - Port error types shared by all adapters

pub mod money;
pub mod clock;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Rate, MoneyError};
pub use clock::{Clock, SystemClock, FixedClock};
pub use identifiers::{
    GuideId, ClaimId, InvoiceId, StatementId,
    BeneficiaryId, ProviderId, ProcedureId,
    NotificationId, AuditEventId,
};
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
