//! Query result shapes handed to the web layer

use chrono::NaiveDate;
use metron_common::types::plan::exceeds;
use serde::{Deserialize, Serialize};

use crate::metering::{CallCounters, DailyAggregate, StorageCounters};

/// API calls this month against the plan ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCalls {
    pub count: u64,
    /// `None` when the plan does not bound API calls
    pub max_allowed: Option<u64>,
}

impl CurrentCalls {
    /// Usage above the ceiling is reported, never clamped
    pub fn is_over_limit(&self) -> bool {
        exceeds(self.max_allowed, self.count)
    }
}

/// One day of API call usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallUsage {
    pub date: NaiveDate,
    pub count: u64,
    pub average_ms: u64,
}

impl From<DailyAggregate<CallCounters>> for CallUsage {
    fn from(aggregate: DailyAggregate<CallCounters>) -> Self {
        Self {
            date: aggregate.date,
            count: aggregate.counters.total_count,
            average_ms: aggregate.derived.average_ms,
        }
    }
}

/// Current asset storage against the plan ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStorage {
    /// Total asset size in bytes
    pub size: u64,
    /// `None` when the plan does not bound asset size
    pub max_allowed: Option<u64>,
}

impl CurrentStorage {
    pub fn is_over_limit(&self) -> bool {
        exceeds(self.max_allowed, self.size)
    }
}

/// One day of asset storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub date: NaiveDate,
    pub count: u64,
    pub size: u64,
}

impl From<DailyAggregate<StorageCounters>> for StorageUsage {
    fn from(aggregate: DailyAggregate<StorageCounters>) -> Self {
        Self {
            date: aggregate.date,
            count: aggregate.counters.total_count,
            size: aggregate.counters.total_size,
        }
    }
}
