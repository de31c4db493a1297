//! Prometheus metrics for the query façade

use metron_common::{MeterError, Result};
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Duration;

fn metrics_error(err: prometheus::Error) -> MeterError {
    MeterError::Metrics(err.to_string())
}

/// Query counters and latencies, labelled by operation
pub struct QueryMetrics {
    pub queries_total: IntCounterVec,
    pub query_errors_total: IntCounterVec,
    pub query_duration_seconds: HistogramVec,
}

impl QueryMetrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            queries_total: IntCounterVec::new(
                Opts::new("metron_usage_queries_total", "Total usage queries served"),
                &["operation"],
            )
            .map_err(metrics_error)?,
            query_errors_total: IntCounterVec::new(
                Opts::new("metron_usage_query_errors_total", "Usage queries that failed"),
                &["operation", "kind"],
            )
            .map_err(metrics_error)?,
            query_duration_seconds: HistogramVec::new(
                HistogramOpts::new(
                    "metron_usage_query_duration_seconds",
                    "Usage query duration",
                )
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
                &["operation"],
            )
            .map_err(metrics_error)?,
        })
    }

    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry
            .register(Box::new(self.queries_total.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(self.query_errors_total.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(self.query_duration_seconds.clone()))
            .map_err(metrics_error)?;
        Ok(())
    }

    /// Record one finished query
    pub fn observe(&self, operation: &str, elapsed: Duration, error: Option<&MeterError>) {
        self.queries_total.with_label_values(&[operation]).inc();
        self.query_duration_seconds
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
        if let Some(err) = error {
            self.query_errors_total
                .with_label_values(&[operation, err.kind()])
                .inc();
        }
    }
}
