//! Source of "today" for month-to-date and snapshot queries

use chrono::{NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current UTC calendar day
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
