//! In-memory counter store
//!
//! Uses DashMap for concurrent access, one ordered timeline per tenant.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use metron_common::{DaySpan, Result, TenantId};
use std::collections::BTreeMap;
use tracing::trace;

use super::{DailyCounterStore, DailyRecord};
use crate::metering::DailyMetric;

/// DashMap-backed counter store
pub struct InMemoryCounterStore<M: DailyMetric> {
    /// Daily timeline by tenant
    timelines: DashMap<TenantId, BTreeMap<NaiveDate, M>>,
}

impl<M: DailyMetric> InMemoryCounterStore<M> {
    pub fn new() -> Self {
        Self {
            timelines: DashMap::new(),
        }
    }

    /// Merge counters into a day using the metric's accumulation rule
    ///
    /// Call counters add up; storage snapshots replace the day's record.
    pub fn record(&self, tenant: &TenantId, day: NaiveDate, counters: M) {
        let mut timeline = self.timelines.entry(tenant.clone()).or_default();
        let merged = match timeline.get(&day) {
            Some(existing) => existing.combine(counters),
            None => counters,
        };
        timeline.insert(day, merged);
        trace!(tenant = %tenant, %day, kind = M::KIND.as_str(), "Recorded counters");
    }

    /// Number of tenants with at least one record
    pub fn tenant_count(&self) -> usize {
        self.timelines.len()
    }

    /// Number of stored days for a tenant
    pub fn day_count(&self, tenant: &TenantId) -> usize {
        self.timelines.get(tenant).map(|t| t.len()).unwrap_or(0)
    }
}

impl<M: DailyMetric> Default for InMemoryCounterStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: DailyMetric> DailyCounterStore<M> for InMemoryCounterStore<M> {
    async fn query(&self, tenant: &TenantId, span: DaySpan) -> Result<Vec<DailyRecord<M>>> {
        // BTreeMap::range panics on reversed bounds
        if span.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .timelines
            .get(tenant)
            .map(|timeline| {
                timeline
                    .range(span.from..=span.to)
                    .map(|(day, counters)| DailyRecord::new(*day, *counters))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn latest(&self, tenant: &TenantId, day: NaiveDate) -> Result<Option<DailyRecord<M>>> {
        Ok(self.timelines.get(tenant).and_then(|timeline| {
            timeline
                .range(..=day)
                .next_back()
                .map(|(day, counters)| DailyRecord::new(*day, *counters))
        }))
    }
}
