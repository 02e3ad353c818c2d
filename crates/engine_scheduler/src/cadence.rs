//! Job cadences
//!
//! A pure calendar model: given "now", when does this cadence fire next?
//! Hour-granular cadences run on the UTC clock grid; calendar cadences
//! (daily, monthly, yearly) fire at local hours in the operator's timezone,
//! matching the back-office's expectations about "9 AM reminders".

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// The operator's timezone
pub const OPERATOR_TZ: Tz = chrono_tz::America::Sao_Paulo;

/// How often a sweep job fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Top of every hour (UTC)
    Hourly,
    /// Every six hours on the UTC grid (00, 06, 12, 18)
    EverySixHours,
    /// Once a day at the given local hour
    Daily { hour: u32 },
    /// Once a month at the given local day and hour
    Monthly { day: u32, hour: u32 },
    /// Once a year at the given local month, day and hour
    Yearly { month: u32, day: u32, hour: u32 },
}

impl Cadence {
    /// The first fire instant strictly after `after`
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Cadence::Hourly => top_of_hour(after) + Duration::hours(1),
            Cadence::EverySixHours => {
                let base = top_of_hour(after);
                let hours_past_slot = base.hour() % 6;
                base + Duration::hours(6 - i64::from(hours_past_slot))
            }
            Cadence::Daily { hour } => {
                let local = after.with_timezone(&OPERATOR_TZ);
                let candidate = at_local(local.date_naive(), hour);
                if candidate > after {
                    candidate
                } else {
                    at_local(local.date_naive() + Duration::days(1), hour)
                }
            }
            Cadence::Monthly { day, hour } => {
                let local = after.with_timezone(&OPERATOR_TZ);
                let this_month = month_day(local.year(), local.month(), day);
                let candidate = at_local(this_month, hour);
                if candidate > after {
                    candidate
                } else {
                    let (year, month) = if local.month() == 12 {
                        (local.year() + 1, 1)
                    } else {
                        (local.year(), local.month() + 1)
                    };
                    at_local(month_day(year, month, day), hour)
                }
            }
            Cadence::Yearly { month, day, hour } => {
                let local = after.with_timezone(&OPERATOR_TZ);
                let candidate = at_local(month_day(local.year(), month, day), hour);
                if candidate > after {
                    candidate
                } else {
                    at_local(month_day(local.year() + 1, month, day), hour)
                }
            }
        }
    }
}

fn top_of_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("zeroing sub-hour fields always succeeds")
}

fn month_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("cadence days are chosen to exist in every month")
}

fn at_local(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .expect("cadence hours are below 24");
    OPERATOR_TZ
        .from_local_datetime(&naive)
        .earliest()
        .expect("operator timezone has no skipped midnights")
        .with_timezone(&Utc)
}
