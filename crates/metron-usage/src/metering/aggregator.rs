//! Daily counter aggregation
//!
//! Turns the sparse rows of a [`DailyCounterStore`] into query answers for one
//! metric kind. Range answers are built over the requested day sequence, so a
//! day the store never materialized comes back as a zero record.

use super::metric::{DailyMetric, SnapshotMetric};
use crate::store::{DailyCounterStore, DailyRecord};
use chrono::NaiveDate;
use metron_common::{DaySpan, MeterError, Result, TenantId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Counters for one calendar day with their derived value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyAggregate<M: DailyMetric> {
    pub date: NaiveDate,
    pub counters: M,
    pub derived: M::Derived,
}

impl<M: DailyMetric> DailyAggregate<M> {
    pub fn new(date: NaiveDate, counters: M) -> Self {
        Self {
            date,
            counters,
            derived: counters.derive(),
        }
    }

    pub fn zero(date: NaiveDate) -> Self {
        Self::new(date, M::default())
    }
}

/// Counters combined over a span of days
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodAggregate<M: DailyMetric> {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Days in the span that had a stored record
    pub active_days: usize,
    pub counters: M,
    pub derived: M::Derived,
}

/// Generic daily counter aggregator
pub struct DailyCounterAggregator<M: DailyMetric> {
    store: Arc<dyn DailyCounterStore<M>>,
    /// Upper bound for a single store call
    storage_timeout: Option<Duration>,
}

impl<M: DailyMetric> Clone for DailyCounterAggregator<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            storage_timeout: self.storage_timeout,
        }
    }
}

impl<M: DailyMetric> DailyCounterAggregator<M> {
    /// Create an aggregator over a store
    pub fn new(store: Arc<dyn DailyCounterStore<M>>) -> Self {
        Self {
            store,
            storage_timeout: None,
        }
    }

    /// Fail store calls that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = Some(timeout);
        self
    }

    /// Combine every record from the first of `reference`'s month through
    /// `reference`
    pub async fn month_to_date_total(
        &self,
        tenant: &TenantId,
        reference: NaiveDate,
    ) -> Result<PeriodAggregate<M>> {
        self.total(tenant, DaySpan::month_to_date(reference)).await
    }

    /// Combine every record inside `span`
    ///
    /// Records are folded chronologically with the metric's accumulation
    /// rule. No records yields a zero aggregate.
    #[instrument(skip(self), fields(kind = M::KIND.as_str()))]
    pub async fn total(&self, tenant: &TenantId, span: DaySpan) -> Result<PeriodAggregate<M>> {
        let days = self.fetch(tenant, span).await?;

        let counters = days
            .values()
            .fold(M::default(), |acc, counters| acc.combine(*counters));

        Ok(PeriodAggregate {
            from: span.from,
            to: span.to,
            active_days: days.len(),
            counters,
            derived: counters.derive(),
        })
    }

    /// One aggregate per day of `span`, chronological, gaps filled with zeros
    #[instrument(skip(self), fields(kind = M::KIND.as_str()))]
    pub async fn range_query(
        &self,
        tenant: &TenantId,
        span: DaySpan,
    ) -> Result<Vec<DailyAggregate<M>>> {
        let days = self.fetch(tenant, span).await?;

        let series: Vec<DailyAggregate<M>> = span
            .days()
            .map(|day| DailyAggregate::new(day, days.get(&day).copied().unwrap_or_default()))
            .collect();

        debug!(
            days = series.len(),
            active_days = days.len(),
            "Built daily series"
        );
        Ok(series)
    }

    /// Store rows inside `span`, keyed by day
    ///
    /// Rows outside the span are dropped; several rows for one day are
    /// combined in the order the store returned them.
    async fn fetch(&self, tenant: &TenantId, span: DaySpan) -> Result<BTreeMap<NaiveDate, M>> {
        if span.is_empty() {
            return Ok(BTreeMap::new());
        }

        let records = self.guarded("query", self.store.query(tenant, span)).await?;

        let mut days: BTreeMap<NaiveDate, M> = BTreeMap::new();
        for DailyRecord { date, counters } in records {
            if !span.contains(date) {
                continue;
            }
            days.entry(date)
                .and_modify(|existing| *existing = existing.combine(counters))
                .or_insert(counters);
        }
        Ok(days)
    }

    async fn guarded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let result = match self.storage_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(MeterError::StorageUnavailable(format!(
                    "{} store {} timed out after {}ms",
                    M::KIND,
                    operation,
                    limit.as_millis()
                ))),
            },
            None => call.await,
        };

        if let Err(e) = &result {
            warn!(kind = M::KIND.as_str(), operation, error = %e, "Store call failed");
        }
        result
    }
}

impl<M: SnapshotMetric> DailyCounterAggregator<M> {
    /// Most recent record on or before `today`, or a zero record dated today
    #[instrument(skip(self), fields(kind = M::KIND.as_str()))]
    pub async fn current_snapshot(
        &self,
        tenant: &TenantId,
        today: NaiveDate,
    ) -> Result<DailyAggregate<M>> {
        let latest = self.guarded("latest", self.store.latest(tenant, today)).await?;

        Ok(match latest {
            Some(record) if record.date <= today => DailyAggregate::new(record.date, record.counters),
            _ => DailyAggregate::zero(today),
        })
    }
}
