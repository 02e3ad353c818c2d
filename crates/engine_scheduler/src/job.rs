//! Sweep job contract and bounded execution

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Mutex;
use thiserror::Error;
use tokio::time::Instant;
use tracing::warn;

use core_kernel::PortError;

use crate::cadence::Cadence;

/// Concurrent entities processed per sweep run
///
/// Bounds load on the stores and the master-data source; candidates beyond
/// the bound queue behind the pool.
pub const WORKER_PARALLELISM: usize = 8;

/// A named, independently scheduled sweep
#[async_trait]
pub trait SweepJob: Send + Sync + 'static {
    /// Stable job name, used for leases and logs
    fn name(&self) -> &'static str;

    /// When the job fires
    fn cadence(&self) -> Cadence;

    /// One full sweep: select candidates, act on each
    ///
    /// Past `deadline` the sweep stops claiming new entities and lets
    /// in-flight work finish.
    async fn run(&self, deadline: Instant) -> Result<SweepReport, SweepError>;
}

/// What one sweep run did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Entities matching the selection predicate
    pub matched: usize,
    /// Entities whose state changed
    pub transitioned: usize,
    /// Notifications sent
    pub notified: usize,
    /// Entities skipped (lease contention, races, transient failures, deadline)
    pub skipped: usize,
}

/// Errors that abort a sweep run
///
/// Only candidate selection aborts; per-entity failures are logged, counted
/// as skipped and retried on the next tick.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Candidate selection failed: {0}")]
    Selection(#[from] PortError),
}

/// What happened to a single candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntityOutcome {
    Transitioned { notified: bool },
    NotifiedOnly,
    Skipped,
    Unchanged,
}

/// Runs `act` over every candidate with bounded parallelism
///
/// The deadline is checked before each entity is started; in-flight entities
/// are never interrupted.
pub(crate) async fn sweep_candidates<T, F, Fut>(
    job_name: &'static str,
    candidates: Vec<T>,
    deadline: Instant,
    act: F,
) -> SweepReport
where
    T: Send,
    F: Fn(T) -> Fut,
    Fut: Future<Output = EntityOutcome>,
{
    let report = Mutex::new(SweepReport {
        matched: candidates.len(),
        ..SweepReport::default()
    });

    stream::iter(candidates)
        .for_each_concurrent(WORKER_PARALLELISM, |candidate| {
            let act = &act;
            let report = &report;
            async move {
                if Instant::now() >= deadline {
                    warn!(job = job_name, "deadline reached, leaving entity for next tick");
                    report.lock().expect("report lock poisoned").skipped += 1;
                    return;
                }

                let outcome = act(candidate).await;
                let mut report = report.lock().expect("report lock poisoned");
                match outcome {
                    EntityOutcome::Transitioned { notified } => {
                        report.transitioned += 1;
                        if notified {
                            report.notified += 1;
                        }
                    }
                    EntityOutcome::NotifiedOnly => report.notified += 1,
                    EntityOutcome::Skipped => report.skipped += 1,
                    EntityOutcome::Unchanged => {}
                }
            }
        })
        .await;

    report.into_inner().expect("report lock poisoned")
}
