//! Usage query façade
//!
//! Answers the four tenant usage questions:
//! - monthly calls against the plan ceiling
//! - per-day call counts and average latency over a date range
//! - current asset storage against the plan ceiling
//! - per-day asset count and size over a date range

pub mod metrics;
pub mod model;
pub mod service;
pub mod validation;

pub use metrics::QueryMetrics;
pub use model::{CallUsage, CurrentCalls, CurrentStorage, StorageUsage};
pub use service::UsageQueryService;
pub use validation::validate_range;
