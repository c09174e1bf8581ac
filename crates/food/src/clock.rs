//! Wall-clock capability.
//!
//! All date arithmetic takes an explicit `today`, read once per service
//! call from an injected clock so tests can pin the calendar.

use chrono::{NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// The current calendar date (UTC).
    fn today(&self) -> NaiveDate;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
