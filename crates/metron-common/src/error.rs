//! Error types for Metron
//!
//! Provides a unified error type for the query path. Client errors are
//! detected before any aggregation work; storage errors are surfaced as-is.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using MeterError
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type for Metron operations
#[derive(Debug, Error)]
pub enum MeterError {
    // Range errors
    #[error("Invalid range {from}..{to}: {reason}")]
    InvalidRange {
        from: NaiveDate,
        to: NaiveDate,
        reason: RangeRejection,
    },

    // Malformed caller input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Tenant resolution errors
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    // Backing store errors
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Metrics registration errors
    #[error("Metrics error: {0}")]
    Metrics(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a date range was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRejection {
    /// `from` is after `to`
    Reversed,
    /// The span between the bounds is longer than allowed
    TooLong { days: i64, max_days: i64 },
}

impl std::fmt::Display for RangeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeRejection::Reversed => write!(f, "from date is after to date"),
            RangeRejection::TooLong { days, max_days } => {
                write!(f, "span of {} days exceeds maximum of {}", days, max_days)
            }
        }
    }
}

impl MeterError {
    /// Errors caused by the caller's input; never worth retrying
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MeterError::InvalidRange { .. }
                | MeterError::InvalidArgument(_)
                | MeterError::TenantNotFound(_)
        )
    }

    /// Errors caused by infrastructure that may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, MeterError::StorageUnavailable(_))
    }

    /// Short, stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            MeterError::InvalidRange { .. } => "invalid_range",
            MeterError::InvalidArgument(_) => "invalid_argument",
            MeterError::TenantNotFound(_) => "tenant_not_found",
            MeterError::StorageUnavailable(_) => "storage_unavailable",
            MeterError::Config(_) => "config",
            MeterError::Metrics(_) => "metrics",
            MeterError::Serialization(_) => "serialization",
            MeterError::Internal(_) => "internal",
        }
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for MeterError {
    fn from(err: serde_json::Error) -> Self {
        MeterError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for MeterError {
    fn from(err: std::io::Error) -> Self {
        MeterError::StorageUnavailable(err.to_string())
    }
}

impl From<anyhow::Error> for MeterError {
    fn from(err: anyhow::Error) -> Self {
        MeterError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeterError::TenantNotFound("acme".to_string());
        assert!(err.to_string().contains("acme"));
    }

    #[test]
    fn test_range_error_display() {
        let err = MeterError::InvalidRange {
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            reason: RangeRejection::TooLong {
                days: 152,
                max_days: 100,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("2024-01-01..2024-06-01"));
        assert!(msg.contains("152 days"));
    }

    #[test]
    fn test_classification() {
        assert!(MeterError::TenantNotFound("x".into()).is_client_error());
        assert!(MeterError::InvalidArgument("x".into()).is_client_error());
        assert!(!MeterError::StorageUnavailable("x".into()).is_client_error());
        assert!(MeterError::StorageUnavailable("x".into()).is_transient());
        assert!(!MeterError::Config("x".into()).is_transient());
    }

    #[test]
    fn test_io_error_is_transient() {
        let err: MeterError = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow").into();
        assert!(err.is_transient());
        assert_eq!(err.kind(), "storage_unavailable");
    }
}
