//! Metron configuration
//!
//! Sources, lowest precedence first:
//! - built-in defaults
//! - an optional TOML file (`METRON_CONFIG`, or the path passed to `load_from`)
//! - `METRON__`-prefixed environment variables, `__` separating sections,
//!   e.g. `METRON__QUERY__MAX_RANGE_DAYS=60`

use config::{Config, Environment, File, FileFormat};
use metron_common::{MeterError, Result, MAX_RANGE_DAYS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::store::redis_store::DEFAULT_KEY_PREFIX;

/// Metron service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetronConfig {
    /// Query behaviour
    pub query: QuerySettings,
    /// Redis counter store
    pub redis: RedisSettings,
    /// Plan catalogue and subscriptions
    pub plans: PlanSettings,
}

impl MetronConfig {
    /// Load configuration from `.env`, `METRON_CONFIG` and the environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let path = std::env::var("METRON_CONFIG").ok();
        Self::load_from(path.as_deref())
    }

    /// Load configuration with an explicit file path
    ///
    /// A named file must exist; only the environment is consulted without one.
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("METRON")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| MeterError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse configuration from TOML text, without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let cfg: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| MeterError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<()> {
        if self.query.max_range_days <= 0 {
            return Err(MeterError::Config(format!(
                "query.max_range_days must be positive, got {}",
                self.query.max_range_days
            )));
        }

        let mut ids = HashSet::new();
        for plan in &self.plans.plans {
            if !ids.insert(plan.id.as_str()) {
                return Err(MeterError::Config(format!("duplicate plan id '{}'", plan.id)));
            }
        }

        if let Some(default_plan) = &self.plans.default_plan {
            if !ids.contains(default_plan.as_str()) {
                return Err(MeterError::Config(format!(
                    "default plan '{}' is not defined",
                    default_plan
                )));
            }
        }

        for subscription in &self.plans.tenants {
            if subscription.tenant.trim().is_empty() {
                return Err(MeterError::Config("tenant subscription with blank tenant id".into()));
            }
            if let Some(plan) = &subscription.plan {
                if !ids.contains(plan.as_str()) {
                    return Err(MeterError::Config(format!(
                        "tenant '{}' references undefined plan '{}'",
                        subscription.tenant, plan
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Query behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Longest accepted span between range bounds, in days
    pub max_range_days: i64,
    /// Per store call timeout in milliseconds; unset waits indefinitely
    pub storage_timeout_ms: Option<u64>,
}

impl QuerySettings {
    pub fn storage_timeout(&self) -> Option<Duration> {
        self.storage_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_range_days: MAX_RANGE_DAYS,
            storage_timeout_ms: None,
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,
    /// Prefix for all counter keys
    pub key_prefix: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Plan catalogue settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSettings {
    /// Plan for subscriptions that name none
    pub default_plan: Option<String>,
    /// Available plans
    pub plans: Vec<PlanDefinition>,
    /// Tenant subscriptions
    pub tenants: Vec<TenantSubscription>,
}

/// A subscription plan and its ceilings; absent ceilings are unbounded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDefinition {
    pub id: String,
    #[serde(default)]
    pub max_api_calls: Option<u64>,
    #[serde(default)]
    pub max_asset_size: Option<u64>,
}

/// A tenant's subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSubscription {
    pub tenant: String,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
