//! Daily metric payloads
//!
//! A [`DailyMetric`] is the per-day counter shape stored for one metric kind.
//! The aggregator is generic over it, so calls and storage share one query
//! path and differ only in how days combine and what they derive.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

/// Which counter timeline a metric belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// API calls with cumulative latency
    Calls,
    /// Asset count and total bytes
    Storage,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Calls => "calls",
            MetricKind::Storage => "storage",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How two records of the same metric combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulation {
    /// Deltas: combined records are summed
    Sum,
    /// Snapshots: the chronologically later record wins
    Latest,
}

/// Per-day counter payload
pub trait DailyMetric:
    Copy + Default + PartialEq + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Timeline this metric is stored under
    const KIND: MetricKind;

    /// Combination rule for records of this metric
    const ACCUMULATION: Accumulation;

    /// Value computed from the raw counters
    type Derived: Copy + Default + PartialEq + Debug + Send + Sync + Serialize;

    /// Field-wise saturating sum
    fn add(&self, other: &Self) -> Self;

    /// Compute the derived value
    fn derive(&self) -> Self::Derived;

    /// Named counter values, as persisted by field-oriented backends
    fn fields(&self) -> Vec<(&'static str, u64)>;

    /// Rebuild from named counter values; missing fields read as zero
    fn from_fields(fields: &HashMap<String, u64>) -> Self;

    /// Combine `self` with a record that is chronologically not earlier
    fn combine(self, next: Self) -> Self {
        match Self::ACCUMULATION {
            Accumulation::Sum => self.add(&next),
            Accumulation::Latest => next,
        }
    }

    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Metrics whose latest record describes current state
pub trait SnapshotMetric: DailyMetric {}

fn field(fields: &HashMap<String, u64>, name: &str) -> u64 {
    fields.get(name).copied().unwrap_or(0)
}

/// API call counters for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCounters {
    /// Number of calls
    pub total_count: u64,
    /// Sum of per-call latencies (ms)
    pub total_elapsed_ms: u64,
}

impl CallCounters {
    pub fn new(total_count: u64, total_elapsed_ms: u64) -> Self {
        Self {
            total_count,
            total_elapsed_ms,
        }
    }

    /// Truncating average latency, zero when there were no calls
    pub fn average_ms(&self) -> u64 {
        if self.total_count == 0 {
            return 0;
        }
        self.total_elapsed_ms / self.total_count
    }
}

/// Derived value for call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallLatency {
    pub average_ms: u64,
}

impl DailyMetric for CallCounters {
    const KIND: MetricKind = MetricKind::Calls;
    const ACCUMULATION: Accumulation = Accumulation::Sum;

    type Derived = CallLatency;

    fn add(&self, other: &Self) -> Self {
        Self {
            total_count: self.total_count.saturating_add(other.total_count),
            total_elapsed_ms: self.total_elapsed_ms.saturating_add(other.total_elapsed_ms),
        }
    }

    fn derive(&self) -> CallLatency {
        CallLatency {
            average_ms: self.average_ms(),
        }
    }

    fn fields(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("total_count", self.total_count),
            ("total_elapsed_ms", self.total_elapsed_ms),
        ]
    }

    fn from_fields(fields: &HashMap<String, u64>) -> Self {
        Self {
            total_count: field(fields, "total_count"),
            total_elapsed_ms: field(fields, "total_elapsed_ms"),
        }
    }
}

/// Asset storage snapshot for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCounters {
    /// Number of assets
    pub total_count: u64,
    /// Total asset size in bytes
    pub total_size: u64,
}

impl StorageCounters {
    pub fn new(total_count: u64, total_size: u64) -> Self {
        Self {
            total_count,
            total_size,
        }
    }
}

impl DailyMetric for StorageCounters {
    const KIND: MetricKind = MetricKind::Storage;
    const ACCUMULATION: Accumulation = Accumulation::Latest;

    type Derived = ();

    fn add(&self, other: &Self) -> Self {
        Self {
            total_count: self.total_count.saturating_add(other.total_count),
            total_size: self.total_size.saturating_add(other.total_size),
        }
    }

    fn derive(&self) {}

    fn fields(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("total_count", self.total_count),
            ("total_size", self.total_size),
        ]
    }

    fn from_fields(fields: &HashMap<String, u64>) -> Self {
        Self {
            total_count: field(fields, "total_count"),
            total_size: field(fields, "total_size"),
        }
    }
}

impl SnapshotMetric for StorageCounters {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_average_with_zero_calls() {
        assert_eq!(CallCounters::new(0, 0).average_ms(), 0);
        // Latency without calls is inconsistent input, still no division
        assert_eq!(CallCounters::new(0, 750).average_ms(), 0);
    }

    #[test]
    fn test_average_truncates() {
        assert_eq!(CallCounters::new(10, 500).average_ms(), 50);
        assert_eq!(CallCounters::new(3, 10).average_ms(), 3);
        assert_eq!(CallCounters::new(3, 10).derive().average_ms, 3);
    }

    #[test]
    fn test_calls_combine_by_summing() {
        let combined = CallCounters::new(10, 500).combine(CallCounters::new(5, 100));
        assert_eq!(combined, CallCounters::new(15, 600));
    }

    #[test]
    fn test_storage_combine_keeps_latest() {
        let combined = StorageCounters::new(4, 4096).combine(StorageCounters::new(3, 1024));
        assert_eq!(combined, StorageCounters::new(3, 1024));
    }

    #[test]
    fn test_add_saturates() {
        let sum = CallCounters::new(u64::MAX, 1).add(&CallCounters::new(1, 1));
        assert_eq!(sum.total_count, u64::MAX);
        assert_eq!(sum.total_elapsed_ms, 2);
    }

    #[test]
    fn test_fields_round_trip_and_missing_fields() {
        let counters = StorageCounters::new(7, 1 << 20);
        let map: HashMap<String, u64> = counters
            .fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(StorageCounters::from_fields(&map), counters);
        assert!(CallCounters::from_fields(&HashMap::new()).is_zero());
    }

    proptest! {
        #[test]
        fn prop_average_never_faults(count in 0u64..1_000_000, elapsed in 0u64..u64::MAX / 2) {
            let avg = CallCounters::new(count, elapsed).average_ms();
            if count == 0 {
                prop_assert_eq!(avg, 0);
            } else {
                prop_assert_eq!(avg, elapsed / count);
            }
        }
    }
}
