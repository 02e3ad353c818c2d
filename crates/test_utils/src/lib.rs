//! Test Utilities
//!
//! Builders and fixtures shared by the engine's behavioral suites. Builders
//! fill every field with a sensible default so tests only spell out what
//! they are actually about.

pub mod builders;
pub mod fixtures;

pub use builders::{ClaimBuilder, GuideBuilder, InvoiceBuilder};
pub use fixtures::{MoneyFixtures, TemporalFixtures, TextFixtures};
