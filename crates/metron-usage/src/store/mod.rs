//! Counter stores
//!
//! Backends holding the per-tenant daily counter timelines:
//! - InMemoryCounterStore: DashMap-backed, for tests and embedding
//! - RedisCounterStore: per-day Redis hashes with a sorted day index
//!
//! Stores may return sparse, unordered rows. Gap filling and ordering are
//! the aggregator's job.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use chrono::NaiveDate;
use metron_common::{DaySpan, Result, TenantId};
use serde::{Deserialize, Serialize};

use crate::metering::DailyMetric;

pub use self::memory::InMemoryCounterStore;
pub use self::redis_store::RedisCounterStore;

/// One persisted day of counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord<M> {
    pub date: NaiveDate,
    pub counters: M,
}

impl<M> DailyRecord<M> {
    pub fn new(date: NaiveDate, counters: M) -> Self {
        Self { date, counters }
    }
}

/// Read access to one metric's daily timelines
#[async_trait]
pub trait DailyCounterStore<M: DailyMetric>: Send + Sync {
    /// Records for `tenant` with a date inside `span`; days without activity
    /// may be omitted
    async fn query(&self, tenant: &TenantId, span: DaySpan) -> Result<Vec<DailyRecord<M>>>;

    /// Most recent record dated on or before `day`
    async fn latest(&self, tenant: &TenantId, day: NaiveDate) -> Result<Option<DailyRecord<M>>>;
}
