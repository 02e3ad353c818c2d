//! The scheduler loop
//!
//! One task per registered job: sleep until the cadence's next fire, run the
//! sweep under a timeout, log the report, repeat. Because each job's loop is
//! sequential, a run that overshoots its tick simply delays the next one —
//! two runs of the same job never overlap, and jobs never block each other.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use core_kernel::Clock;

use crate::job::{SweepJob, SweepReport};

/// Scheduler tuning
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Hard deadline for a single sweep run
    pub job_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(10 * 60),
        }
    }
}

/// Drives the registered sweep jobs on their cadences
pub struct Scheduler {
    jobs: Vec<Arc<dyn SweepJob>>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        Self {
            jobs: Vec::new(),
            clock,
            config,
        }
    }

    /// Registers a job with the scheduler
    pub fn register(&mut self, job: Arc<dyn SweepJob>) -> &mut Self {
        self.jobs.push(job);
        self
    }

    /// Names of the registered jobs
    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|job| job.name()).collect()
    }

    /// Spawns one loop per job and returns their handles
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let Scheduler { jobs, clock, config } = self;
        jobs.into_iter()
            .map(|job| {
                let clock = clock.clone();
                let timeout = config.job_timeout;
                tokio::spawn(async move {
                    info!(job = job.name(), "scheduler loop started");
                    loop {
                        let now = clock.now();
                        let next_fire = job.cadence().next_fire_after(now);
                        let wait = (next_fire - now)
                            .to_std()
                            .unwrap_or(Duration::ZERO);
                        tokio::time::sleep(wait).await;

                        Self::run_job_once(job.as_ref(), timeout).await;
                    }
                })
            })
            .collect()
    }

    /// Runs a single sweep with the configured timeout
    ///
    /// Exposed for manual triggering (admin endpoints, tests). Returns the
    /// report when the sweep finished inside its deadline.
    pub async fn run_job_once(job: &dyn SweepJob, timeout: Duration) -> Option<SweepReport> {
        let deadline = Instant::now() + timeout;
        match tokio::time::timeout(timeout, job.run(deadline)).await {
            Ok(Ok(report)) => {
                info!(
                    job = job.name(),
                    matched = report.matched,
                    transitioned = report.transitioned,
                    notified = report.notified,
                    skipped = report.skipped,
                    "sweep complete"
                );
                Some(report)
            }
            Ok(Err(sweep_error)) => {
                error!(job = job.name(), %sweep_error, "sweep aborted");
                None
            }
            Err(_) => {
                warn!(job = job.name(), ?timeout, "sweep timed out");
                None
            }
        }
    }
}
