//! Plan limit resolution
//!
//! Resolves a tenant to the ceilings of its active subscription plan.

pub mod configured;

use async_trait::async_trait;
use metron_common::{PlanLimits, Result, TenantId};

pub use configured::ConfiguredPlanProvider;

/// Resolves tenants to plan ceilings
///
/// Implementations are read-only. A tenant without a known, active
/// subscription resolves to `TenantNotFound`.
#[async_trait]
pub trait PlanLimitProvider: Send + Sync {
    async fn resolve_plan(&self, tenant: &TenantId) -> Result<PlanLimits>;
}
