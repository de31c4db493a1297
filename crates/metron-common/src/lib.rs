//! # Metron Common
//!
//! Shared types and errors for the Metron usage-metering service.
//!
//! ## Core Types
//!
//! - [`TenantId`]: opaque identifier of the tenant ("app") being metered
//! - [`PlanLimits`]: resolved subscription ceilings, `None` meaning unbounded
//! - [`IntoDay`]: conversion of caller-supplied dates into whole calendar days
//! - [`DaySpan`]: inclusive, chronological sequence of calendar days
//!
//! ## Errors
//!
//! - [`MeterError`]: unified error type, split into client errors
//!   (`InvalidRange`, `InvalidArgument`, `TenantNotFound`) and transient
//!   infrastructure errors (`StorageUnavailable`)

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{MeterError, RangeRejection, Result};
pub use types::{
    day::{month_start, DaySpan, IntoDay},
    plan::PlanLimits,
    tenant::TenantId,
};

/// Metron version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest span, in days between the two bounds, accepted by range queries
pub const MAX_RANGE_DAYS: i64 = 100;

/// Date format used for day keys and textual date input
pub const DAY_FORMAT: &str = "%Y-%m-%d";
