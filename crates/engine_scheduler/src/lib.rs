//! Scheduler
//!
//! The recurring half of the engine: eight named jobs, each an independent
//! "select candidates, act on each" sweep over the entity stores. Jobs are
//! scheduled by calendar cadence in the operator's timezone, process their
//! candidates through a bounded worker pool, stop claiming new work at
//! their deadline, and lean on the lease guard plus the stores'
//! compare-and-swap so that overlapping runs and crashed workers never
//! double-transition an entity. Re-running any sweep is a no-op for
//! entities it already handled: they no longer match the selection
//! predicate.

pub mod cadence;
pub mod job;
pub mod jobs;
pub mod scheduler;

pub use cadence::{Cadence, OPERATOR_TZ};
pub use job::{SweepError, SweepJob, SweepReport};
pub use jobs::{
    AdjudicatePendingClaims, ExpireGuides, FlagOverdueInvoices, GenerateAnnualTaxStatements,
    GenerateMonthlyInvoices, NudgePendingClaims, NudgePendingGuides, RemindUpcomingInvoices,
};
pub use scheduler::{Scheduler, SchedulerConfig};
