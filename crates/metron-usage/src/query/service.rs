//! Usage query façade
//!
//! Composes the call and storage aggregators with the plan provider. Every
//! operation validates its input and resolves the tenant before touching a
//! counter store, and answers either completely or with an error.

use metron_common::{IntoDay, Result, TenantId, MAX_RANGE_DAYS};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use super::metrics::QueryMetrics;
use super::model::{CallUsage, CurrentCalls, CurrentStorage, StorageUsage};
use super::validation::validate_range;
use crate::clock::{Clock, SystemClock};
use crate::config::QuerySettings;
use crate::metering::{CallCounters, DailyCounterAggregator, StorageCounters};
use crate::plans::PlanLimitProvider;
use crate::store::DailyCounterStore;

/// Usage query service
pub struct UsageQueryService {
    calls: DailyCounterAggregator<CallCounters>,
    storage: DailyCounterAggregator<StorageCounters>,
    plans: Arc<dyn PlanLimitProvider>,
    clock: Arc<dyn Clock>,
    max_range_days: i64,
    metrics: Option<Arc<QueryMetrics>>,
}

impl UsageQueryService {
    /// Create a service over the call store, the storage store and a plan provider
    pub fn new(
        calls: Arc<dyn DailyCounterStore<CallCounters>>,
        storage: Arc<dyn DailyCounterStore<StorageCounters>>,
        plans: Arc<dyn PlanLimitProvider>,
    ) -> Self {
        Self {
            calls: DailyCounterAggregator::new(calls),
            storage: DailyCounterAggregator::new(storage),
            plans,
            clock: Arc::new(SystemClock),
            max_range_days: MAX_RANGE_DAYS,
            metrics: None,
        }
    }

    /// Apply query settings
    pub fn with_settings(mut self, settings: &QuerySettings) -> Self {
        self.max_range_days = settings.max_range_days;
        if let Some(timeout) = settings.storage_timeout() {
            self.calls = self.calls.with_timeout(timeout);
            self.storage = self.storage.with_timeout(timeout);
        }
        self
    }

    /// Use a custom source of "today"
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record query metrics
    pub fn with_metrics(mut self, metrics: Arc<QueryMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// API calls from the first of the current month through today
    #[instrument(skip(self))]
    pub async fn get_monthly_calls(&self, tenant: &TenantId) -> Result<CurrentCalls> {
        let started = Instant::now();
        let result = self.monthly_calls(tenant).await;
        self.record("monthly_calls", started, &result);
        result
    }

    /// Per-day API calls and average latency for `[from, to]`
    #[instrument(skip(self, from, to))]
    pub async fn get_call_usage_range(
        &self,
        tenant: &TenantId,
        from: impl IntoDay,
        to: impl IntoDay,
    ) -> Result<Vec<CallUsage>> {
        let started = Instant::now();
        let result = self.call_range(tenant, from, to).await;
        self.record("call_range", started, &result);
        result
    }

    /// Latest total asset size
    #[instrument(skip(self))]
    pub async fn get_current_storage_size(&self, tenant: &TenantId) -> Result<CurrentStorage> {
        let started = Instant::now();
        let result = self.current_storage(tenant).await;
        self.record("current_storage", started, &result);
        result
    }

    /// Per-day asset count and size for `[from, to]`
    #[instrument(skip(self, from, to))]
    pub async fn get_storage_size_range(
        &self,
        tenant: &TenantId,
        from: impl IntoDay,
        to: impl IntoDay,
    ) -> Result<Vec<StorageUsage>> {
        let started = Instant::now();
        let result = self.storage_range(tenant, from, to).await;
        self.record("storage_range", started, &result);
        result
    }

    async fn monthly_calls(&self, tenant: &TenantId) -> Result<CurrentCalls> {
        let plan = self.plans.resolve_plan(tenant).await?;
        let today = self.clock.today();

        let total = self.calls.month_to_date_total(tenant, today).await?;

        debug!(count = total.counters.total_count, plan = %plan.plan_id, "Monthly calls");
        Ok(CurrentCalls {
            count: total.counters.total_count,
            max_allowed: plan.max_api_calls,
        })
    }

    async fn call_range(
        &self,
        tenant: &TenantId,
        from: impl IntoDay,
        to: impl IntoDay,
    ) -> Result<Vec<CallUsage>> {
        let span = validate_range(from.into_day()?, to.into_day()?, self.max_range_days)?;
        self.plans.resolve_plan(tenant).await?;

        let series = self.calls.range_query(tenant, span).await?;
        Ok(series.into_iter().map(CallUsage::from).collect())
    }

    async fn current_storage(&self, tenant: &TenantId) -> Result<CurrentStorage> {
        let plan = self.plans.resolve_plan(tenant).await?;
        let today = self.clock.today();

        let snapshot = self.storage.current_snapshot(tenant, today).await?;

        debug!(size = snapshot.counters.total_size, as_of = %snapshot.date, "Current storage");
        Ok(CurrentStorage {
            size: snapshot.counters.total_size,
            max_allowed: plan.max_asset_size,
        })
    }

    async fn storage_range(
        &self,
        tenant: &TenantId,
        from: impl IntoDay,
        to: impl IntoDay,
    ) -> Result<Vec<StorageUsage>> {
        let span = validate_range(from.into_day()?, to.into_day()?, self.max_range_days)?;
        self.plans.resolve_plan(tenant).await?;

        let series = self.storage.range_query(tenant, span).await?;
        Ok(series.into_iter().map(StorageUsage::from).collect())
    }

    fn record<T>(&self, operation: &'static str, started: Instant, result: &Result<T>) {
        if let Some(metrics) = &self.metrics {
            metrics.observe(operation, started.elapsed(), result.as_ref().err());
        }
    }
}
