//! Calendar-day arithmetic
//!
//! Every lookup in Metron happens at whole-day granularity. Caller input is
//! truncated to a [`NaiveDate`] through [`IntoDay`] before it reaches a store,
//! and range queries walk a [`DaySpan`] so that days without activity still
//! appear in the result.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{MeterError, Result};
use crate::DAY_FORMAT;

/// Conversion of a caller-supplied date into a calendar day
///
/// Any time-of-day component is dropped. Textual input accepts
/// `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps (`T` or a space between date and time); anything else is an
/// `InvalidArgument`.
pub trait IntoDay {
    fn into_day(self) -> Result<NaiveDate>;
}

impl IntoDay for NaiveDate {
    fn into_day(self) -> Result<NaiveDate> {
        Ok(self)
    }
}

impl IntoDay for NaiveDateTime {
    fn into_day(self) -> Result<NaiveDate> {
        Ok(self.date())
    }
}

impl<Tz: TimeZone> IntoDay for DateTime<Tz> {
    fn into_day(self) -> Result<NaiveDate> {
        Ok(self.date_naive())
    }
}

impl IntoDay for &str {
    fn into_day(self) -> Result<NaiveDate> {
        let input = self.trim();

        if let Ok(day) = NaiveDate::parse_from_str(input, DAY_FORMAT) {
            return Ok(day);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
            return Ok(ts.date_naive());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(input, format) {
                return Ok(ts.date());
            }
        }

        Err(MeterError::InvalidArgument(format!(
            "'{}' is not a calendar day",
            self
        )))
    }
}

impl IntoDay for &String {
    fn into_day(self) -> Result<NaiveDate> {
        self.as_str().into_day()
    }
}

impl IntoDay for String {
    fn into_day(self) -> Result<NaiveDate> {
        self.as_str().into_day()
    }
}

/// First day of the month containing `day`
pub fn month_start(day: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month
    day.with_day(1).unwrap_or(day)
}

/// Inclusive span of calendar days
///
/// A reversed span (`from > to`) is empty; rejecting it is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DaySpan {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Span from the first of `day`'s month through `day`
    pub fn month_to_date(day: NaiveDate) -> Self {
        Self::new(month_start(day), day)
    }

    /// Signed distance in days from `from` to `to`
    pub fn span_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }

    /// Number of days in the span, zero when reversed
    pub fn len(&self) -> usize {
        usize::try_from(self.span_days() + 1).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    /// Chronological iterator over every day in the span
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_day() {
        assert_eq!("2024-01-03".into_day().unwrap(), day(2024, 1, 3));
        assert_eq!(" 2024-01-03 ".into_day().unwrap(), day(2024, 1, 3));
    }

    #[test]
    fn test_parse_truncates_time_of_day() {
        assert_eq!(
            "2024-01-03T23:59:59Z".into_day().unwrap(),
            day(2024, 1, 3)
        );
        assert_eq!(
            "2024-01-03T10:00:00+02:00".into_day().unwrap(),
            day(2024, 1, 3)
        );
        assert_eq!(
            "2024-01-03T10:00:00.250".into_day().unwrap(),
            day(2024, 1, 3)
        );

        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 18, 30, 0).unwrap();
        assert_eq!(ts.into_day().unwrap(), day(2024, 2, 29));
    }

    #[test]
    fn test_parse_space_separated_timestamp() {
        assert_eq!(
            "2024-01-03 23:59:59".into_day().unwrap(),
            day(2024, 1, 3)
        );
        assert_eq!(
            "2024-01-03 08:15:00.125".into_day().unwrap(),
            day(2024, 1, 3)
        );
        assert!("2024-01-03 25:00:00".into_day().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "yesterday".into_day(),
            Err(MeterError::InvalidArgument(_))
        ));
        assert!("2024-02-30".into_day().is_err());
        assert!(String::new().into_day().is_err());
    }

    #[test]
    fn test_month_start() {
        assert_eq!(month_start(day(2024, 3, 17)), day(2024, 3, 1));
        assert_eq!(month_start(day(2024, 3, 1)), day(2024, 3, 1));
    }

    #[test]
    fn test_span_crosses_month_and_leap_day() {
        let span = DaySpan::new(day(2024, 2, 28), day(2024, 3, 1));
        let days: Vec<_> = span.days().collect();
        assert_eq!(days, vec![day(2024, 2, 28), day(2024, 2, 29), day(2024, 3, 1)]);
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_reversed_span_is_empty() {
        let span = DaySpan::new(day(2024, 1, 5), day(2024, 1, 1));
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
        assert_eq!(span.days().count(), 0);
        assert_eq!(span.span_days(), -4);
    }

    proptest! {
        #[test]
        fn prop_span_is_contiguous(offset in 0i64..20_000, len in 0i64..400) {
            let from = day(1990, 1, 1) + chrono::Duration::days(offset);
            let to = from + chrono::Duration::days(len);
            let days: Vec<_> = DaySpan::new(from, to).days().collect();

            prop_assert_eq!(days.len() as i64, len + 1);
            prop_assert_eq!(days[0], from);
            prop_assert_eq!(*days.last().unwrap(), to);
            for pair in days.windows(2) {
                prop_assert_eq!(pair[0].succ_opt().unwrap(), pair[1]);
            }
        }
    }
}
