//! Common fixture values

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::Money;

/// Standard monetary amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A consultation-sized amount under the auto-approval ceiling
    pub fn small_expense() -> Money {
        Money::new(dec!(250.00))
    }

    /// An amount above every auto-approval ceiling
    pub fn large_expense() -> Money {
        Money::new(dec!(4800.00))
    }

    /// A typical titular monthly fee
    pub fn monthly_fee() -> Money {
        Money::new(dec!(500.00))
    }
}

/// Standard instants
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The base instant most suites pin their clocks to
    pub fn base_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }
}

/// Generated free-text values
pub struct TextFixtures;

impl TextFixtures {
    /// A plausible clinical indication
    pub fn diagnosis() -> String {
        Sentence(3..6).fake()
    }

    /// A plausible service description
    pub fn service_description() -> String {
        Sentence(4..8).fake()
    }
}
