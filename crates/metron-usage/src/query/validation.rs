//! Range validation shared by the call and storage range queries
//!
//! A reversed range and an over-long range are each rejected on their own.

use chrono::NaiveDate;
use metron_common::{DaySpan, MeterError, RangeRejection, Result};
use tracing::warn;

/// Accept `[from, to]` when `from <= to` and the bounds are at most
/// `max_days` apart
pub fn validate_range(from: NaiveDate, to: NaiveDate, max_days: i64) -> Result<DaySpan> {
    let span = DaySpan::new(from, to);

    let rejection = if from > to {
        Some(RangeRejection::Reversed)
    } else if span.span_days() > max_days {
        Some(RangeRejection::TooLong {
            days: span.span_days(),
            max_days,
        })
    } else {
        None
    };

    match rejection {
        Some(reason) => {
            warn!(%from, %to, %reason, "Rejected date range");
            Err(MeterError::InvalidRange { from, to, reason })
        }
        None => Ok(span),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_accepts_ordered_short_range() {
        let span = validate_range(day(2024, 1, 1), day(2024, 1, 3), 100).unwrap();
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_accepts_single_day_and_exact_limit() {
        assert!(validate_range(day(2024, 1, 1), day(2024, 1, 1), 100).is_ok());

        let from = day(2024, 1, 1);
        let span = validate_range(from, from + Duration::days(100), 100).unwrap();
        assert_eq!(span.len(), 101);
    }

    #[test]
    fn test_rejects_reversed_short_range() {
        let err = validate_range(day(2024, 1, 3), day(2024, 1, 1), 100).unwrap_err();
        assert!(matches!(
            err,
            MeterError::InvalidRange {
                reason: RangeRejection::Reversed,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_ordered_long_range() {
        let from = day(2024, 1, 1);
        let err = validate_range(from, from + Duration::days(101), 100).unwrap_err();
        assert!(matches!(
            err,
            MeterError::InvalidRange {
                reason: RangeRejection::TooLong { days: 101, max_days: 100 },
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_reversed_long_range() {
        let err = validate_range(day(2025, 1, 1), day(2024, 1, 1), 100).unwrap_err();
        assert!(err.is_client_error());
    }
}
