//! Injectable time source
//!
//! Expiry checks, reimbursement windows and sweep predicates all compare
//! against "now". Routing every read through a [`Clock`] keeps the rule and
//! scheduler code deterministic under test: production wires [`SystemClock`],
//! tests pin a [`FixedClock`] and advance it explicitly.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::{Arc, Mutex};

/// A source of the current instant
pub trait Clock: Send + Sync {
    /// The current instant in UTC
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar date in UTC
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an explicit instant, advanced by hand
///
/// Cloning shares the underlying instant, so a test can hold one handle
/// while the component under test holds another.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    /// Moves the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().expect("clock lock poisoned") = instant;
    }

    /// Advances the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut instant = self.instant.lock().expect("clock lock poisoned");
        *instant += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().expect("clock lock poisoned")
    }
}
