//! Metering module
//!
//! Provides daily counter shapes and their aggregation:
//! - DailyMetric: per-day payload, instantiated for calls and storage
//! - DailyCounterAggregator: month-to-date, range and snapshot queries

pub mod aggregator;
pub mod metric;

pub use aggregator::{DailyAggregate, DailyCounterAggregator, PeriodAggregate};
pub use metric::{
    Accumulation, CallCounters, CallLatency, DailyMetric, MetricKind, SnapshotMetric,
    StorageCounters,
};
