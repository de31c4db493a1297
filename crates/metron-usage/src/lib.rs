//! # Metron Usage
//!
//! Daily usage counters, plan ceilings, and usage queries per tenant.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   UsageQueryService                    │
//! │    range validation · plan ceilings · result shaping   │
//! │                                                        │
//! │  ┌──────────────────────┐  ┌──────────────────────┐    │
//! │  │DailyCounterAggregator│  │DailyCounterAggregator│    │
//! │  │    <CallCounters>    │  │   <StorageCounters>  │    │
//! │  └──────────┬───────────┘  └───────────┬──────────┘    │
//! │             │                          │               │
//! │  ┌──────────┴──────────────────────────┴──────────┐    │
//! │  │     DailyCounterStore (in-memory · Redis)      │    │
//! │  └────────────────────────────────────────────────┘    │
//! │                                                        │
//! │  PlanLimitProvider (configured plan catalogue)         │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls are deltas and sum across days; storage rows are snapshots where the
//! latest day wins. Range answers always contain one entry per requested day.

pub mod clock;
pub mod config;
pub mod metering;
pub mod plans;
pub mod query;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::MetronConfig;
pub use metering::{
    CallCounters, DailyAggregate, DailyCounterAggregator, DailyMetric, MetricKind,
    PeriodAggregate, StorageCounters,
};
pub use plans::{ConfiguredPlanProvider, PlanLimitProvider};
pub use query::{
    CallUsage, CurrentCalls, CurrentStorage, QueryMetrics, StorageUsage, UsageQueryService,
};
pub use store::{DailyCounterStore, DailyRecord, InMemoryCounterStore, RedisCounterStore};
