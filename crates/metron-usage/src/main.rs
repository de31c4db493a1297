//! Metron usage report
//!
//! Runs one usage query for a tenant against the Redis counter stores and
//! prints the answer as JSON.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metron_common::{TenantId, VERSION};
use metron_usage::{
    CallCounters, ConfiguredPlanProvider, MetronConfig, RedisCounterStore, StorageCounters,
    UsageQueryService,
};

#[derive(Debug, Parser)]
#[command(name = "metron-report", version, about = "Query tenant usage counters")]
struct Cli {
    /// Configuration file (TOML); defaults to `METRON_CONFIG`
    #[arg(long)]
    config: Option<String>,

    /// Tenant identifier
    #[arg(long)]
    tenant: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// API calls this month against the plan ceiling
    MonthlyCalls,
    /// Per-day API calls and average latency
    CallRange {
        /// First day (YYYY-MM-DD or RFC 3339)
        from: String,
        /// Last day, inclusive
        to: String,
    },
    /// Current asset storage against the plan ceiling
    Storage,
    /// Per-day asset count and size
    StorageRange {
        /// First day (YYYY-MM-DD or RFC 3339)
        from: String,
        /// Last day, inclusive
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    info!("Starting metron-report v{}", VERSION);

    let config = match cli.config.as_deref() {
        Some(path) => MetronConfig::load_from(Some(path))?,
        None => MetronConfig::load()?,
    };
    let tenant = TenantId::new(cli.tenant)?;

    let calls = RedisCounterStore::<CallCounters>::connect(&config.redis.url)
        .await?
        .with_prefix(&config.redis.key_prefix);
    let storage = RedisCounterStore::<StorageCounters>::connect(&config.redis.url)
        .await?
        .with_prefix(&config.redis.key_prefix);
    let plans = ConfiguredPlanProvider::from_settings(&config.plans)?;

    let service = UsageQueryService::new(Arc::new(calls), Arc::new(storage), Arc::new(plans))
        .with_settings(&config.query);

    let output = match cli.command {
        Command::MonthlyCalls => serde_json::to_string_pretty(&service.get_monthly_calls(&tenant).await?)?,
        Command::CallRange { from, to } => serde_json::to_string_pretty(
            &service.get_call_usage_range(&tenant, &from, &to).await?,
        )?,
        Command::Storage => {
            serde_json::to_string_pretty(&service.get_current_storage_size(&tenant).await?)?
        }
        Command::StorageRange { from, to } => serde_json::to_string_pretty(
            &service.get_storage_size_range(&tenant, &from, &to).await?,
        )?,
    };

    println!("{}", output);
    Ok(())
}
