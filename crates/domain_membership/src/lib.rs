//! Membership Master Data
//!
//! Beneficiary and provider records are owned by external registration
//! systems; the engine only ever asks whether someone is active and what the
//! titular plan pricing looks like. This crate defines those read-only ports
//! and a short-TTL caching decorator so scheduler sweeps do not hammer the
//! master-data source.

pub mod ports;
pub mod cache;

pub use ports::{MembershipPort, TitularProfile};
pub use cache::CachedMembership;
