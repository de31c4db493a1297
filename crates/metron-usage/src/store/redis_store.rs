//! Redis counter store
//!
//! Layout per metric kind and tenant:
//! - `{prefix}:{kind}:{tenant}:{YYYY-MM-DD}`: hash of counter fields for a day
//! - `{prefix}:{kind}:{tenant}:days`: sorted set of recorded days, scored by
//!   day number, used to find the latest snapshot
//!
//! Range reads are sent as one pipeline. Redis failures are reported as
//! `StorageUnavailable`, unparsable replies as `Serialization`; retrying is
//! left to the caller.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use metron_common::{DaySpan, MeterError, Result, TenantId, DAY_FORMAT};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, ErrorKind, RedisError};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::{debug, instrument, warn};

use super::{DailyCounterStore, DailyRecord};
use crate::metering::{Accumulation, DailyMetric};

/// Default key prefix for counter keys
pub const DEFAULT_KEY_PREFIX: &str = "metron:usage";

/// Unparsable replies are corrupt data, everything else is an outage
fn redis_error(err: RedisError) -> MeterError {
    warn!("Redis command failed: {}", err);
    match err.kind() {
        ErrorKind::TypeError => MeterError::Serialization(format!("Redis: {}", err)),
        _ => MeterError::StorageUnavailable(format!("Redis: {}", err)),
    }
}

/// Redis-backed counter store for one metric kind
pub struct RedisCounterStore<M: DailyMetric> {
    /// Multiplexed connection, cloned per command
    connection: MultiplexedConnection,
    /// Key prefix for all entries
    prefix: String,
    _metric: PhantomData<fn() -> M>,
}

impl<M: DailyMetric> RedisCounterStore<M> {
    /// Connect to Redis
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| MeterError::Config(format!("Failed to create Redis client: {}", e)))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| MeterError::StorageUnavailable(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self::from_connection(connection))
    }

    /// Wrap an existing connection
    pub fn from_connection(connection: MultiplexedConnection) -> Self {
        Self {
            connection,
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            _metric: PhantomData,
        }
    }

    /// Use a custom key prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Merge counters into a day using the metric's accumulation rule
    ///
    /// Deltas are applied with `HINCRBY`, snapshots overwrite with `HSET`.
    #[instrument(skip(self, counters), fields(kind = M::KIND.as_str()))]
    pub async fn record(&self, tenant: &TenantId, day: NaiveDate, counters: M) -> Result<()> {
        let key = day_key::<M>(&self.prefix, tenant, day);
        let fields = counters.fields();

        let mut pipe = redis::pipe();
        pipe.atomic();
        match M::ACCUMULATION {
            Accumulation::Sum => {
                for (field, value) in &fields {
                    pipe.hincr(&key, *field, *value).ignore();
                }
            }
            Accumulation::Latest => {
                pipe.hset_multiple(&key, &fields).ignore();
            }
        }
        pipe.zadd(
            index_key::<M>(&self.prefix, tenant),
            day.format(DAY_FORMAT).to_string(),
            day.num_days_from_ce(),
        )
        .ignore();

        let mut conn = self.connection.clone();
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(redis_error)?;

        debug!(key = %key, "Recorded counters");
        Ok(())
    }

    async fn read_day(&self, tenant: &TenantId, day: NaiveDate) -> Result<Option<M>> {
        let mut conn = self.connection.clone();
        let row: HashMap<String, u64> = conn
            .hgetall(day_key::<M>(&self.prefix, tenant, day))
            .await
            .map_err(redis_error)?;

        Ok((!row.is_empty()).then(|| M::from_fields(&row)))
    }
}

fn day_key<M: DailyMetric>(prefix: &str, tenant: &TenantId, day: NaiveDate) -> String {
    format!("{}:{}:{}:{}", prefix, M::KIND, tenant, day.format(DAY_FORMAT))
}

fn index_key<M: DailyMetric>(prefix: &str, tenant: &TenantId) -> String {
    format!("{}:{}:{}:days", prefix, M::KIND, tenant)
}

#[async_trait]
impl<M: DailyMetric> DailyCounterStore<M> for RedisCounterStore<M> {
    #[instrument(skip(self), fields(kind = M::KIND.as_str()))]
    async fn query(&self, tenant: &TenantId, span: DaySpan) -> Result<Vec<DailyRecord<M>>> {
        let days: Vec<NaiveDate> = span.days().collect();
        if days.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for day in &days {
            pipe.hgetall(day_key::<M>(&self.prefix, tenant, *day));
        }

        let mut conn = self.connection.clone();
        let rows: Vec<HashMap<String, u64>> = pipe
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        let records: Vec<DailyRecord<M>> = days
            .into_iter()
            .zip(rows)
            .filter(|(_, row)| !row.is_empty())
            .map(|(day, row)| DailyRecord::new(day, M::from_fields(&row)))
            .collect();

        debug!(days = span.len(), found = records.len(), "Queried counters");
        Ok(records)
    }

    #[instrument(skip(self), fields(kind = M::KIND.as_str()))]
    async fn latest(&self, tenant: &TenantId, day: NaiveDate) -> Result<Option<DailyRecord<M>>> {
        let mut conn = self.connection.clone();
        let members: Vec<String> = conn
            .zrevrangebyscore_limit(
                index_key::<M>(&self.prefix, tenant),
                day.num_days_from_ce(),
                "-inf",
                0,
                1,
            )
            .await
            .map_err(redis_error)?;

        let Some(member) = members.first() else {
            return Ok(None);
        };

        let recorded = NaiveDate::parse_from_str(member, DAY_FORMAT).map_err(|e| {
            MeterError::Serialization(format!("Corrupt day index entry '{}': {}", member, e))
        })?;

        // An index entry without its hash reads as no snapshot
        Ok(self
            .read_day(tenant, recorded)
            .await?
            .map(|counters| DailyRecord::new(recorded, counters)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metering::{CallCounters, StorageCounters};

    #[test]
    fn test_key_layout() {
        let tenant = TenantId::new("acme").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();

        assert_eq!(
            day_key::<CallCounters>(DEFAULT_KEY_PREFIX, &tenant, day),
            "metron:usage:calls:acme:2024-01-03"
        );
        assert_eq!(
            day_key::<StorageCounters>("custom", &tenant, day),
            "custom:storage:acme:2024-01-03"
        );
        assert_eq!(
            index_key::<StorageCounters>(DEFAULT_KEY_PREFIX, &tenant),
            "metron:usage:storage:acme:days"
        );
    }

    #[test]
    fn test_error_mapping() {
        let corrupt = redis_error(RedisError::from((ErrorKind::TypeError, "Response was of incompatible type")));
        assert!(matches!(corrupt, MeterError::Serialization(_)));
        assert!(!corrupt.is_transient());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let down = redis_error(RedisError::from(io));
        assert!(matches!(down, MeterError::StorageUnavailable(_)));
        assert!(down.is_transient());
    }

    #[test]
    fn test_index_score_is_chronological() {
        let a = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(b.num_days_from_ce() - a.num_days_from_ce(), 1);
    }
}
