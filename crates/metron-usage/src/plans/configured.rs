//! Plan catalogue loaded from configuration

use async_trait::async_trait;
use metron_common::{MeterError, PlanLimits, Result, TenantId};
use std::collections::HashMap;
use tracing::{debug, info};

use super::PlanLimitProvider;
use crate::config::PlanSettings;

/// Plan id used when a subscription names no plan and no default is set
pub const UNLIMITED_PLAN_ID: &str = "unlimited";

#[derive(Debug, Clone)]
struct Subscription {
    /// Plan id; `None` falls back to the default plan
    plan_id: Option<String>,
    active: bool,
}

/// Static plan catalogue with tenant subscriptions
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPlanProvider {
    /// Plan ceilings by plan id
    plans: HashMap<String, PlanLimits>,
    /// Subscriptions by tenant
    subscriptions: HashMap<TenantId, Subscription>,
    /// Plan for subscriptions without an explicit plan
    default_plan: Option<String>,
}

impl ConfiguredPlanProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from validated plan settings
    pub fn from_settings(settings: &PlanSettings) -> Result<Self> {
        let mut provider = Self::new();

        for plan in &settings.plans {
            provider = provider.with_plan(PlanLimits::new(
                plan.id.clone(),
                plan.max_api_calls,
                plan.max_asset_size,
            ));
        }

        if let Some(default_plan) = &settings.default_plan {
            provider = provider.with_default_plan(default_plan);
        }

        for subscription in &settings.tenants {
            let tenant = TenantId::new(subscription.tenant.clone())?;
            provider.subscriptions.insert(
                tenant,
                Subscription {
                    plan_id: subscription.plan.clone(),
                    active: subscription.active,
                },
            );
        }

        info!(
            plans = provider.plans.len(),
            tenants = provider.subscriptions.len(),
            "Loaded plan catalogue"
        );
        Ok(provider)
    }

    /// Add or replace a plan
    pub fn with_plan(mut self, limits: PlanLimits) -> Self {
        self.plans.insert(limits.plan_id.clone(), limits);
        self
    }

    /// Plan used by subscriptions that name none
    pub fn with_default_plan(mut self, plan_id: &str) -> Self {
        self.default_plan = Some(plan_id.to_string());
        self
    }

    /// Subscribe a tenant to a plan
    pub fn with_tenant(mut self, tenant: TenantId, plan_id: Option<&str>) -> Self {
        self.subscriptions.insert(
            tenant,
            Subscription {
                plan_id: plan_id.map(str::to_string),
                active: true,
            },
        );
        self
    }

    /// Register a tenant whose subscription is not active
    pub fn with_inactive_tenant(mut self, tenant: TenantId, plan_id: Option<&str>) -> Self {
        self.subscriptions.insert(
            tenant,
            Subscription {
                plan_id: plan_id.map(str::to_string),
                active: false,
            },
        );
        self
    }
}

#[async_trait]
impl PlanLimitProvider for ConfiguredPlanProvider {
    async fn resolve_plan(&self, tenant: &TenantId) -> Result<PlanLimits> {
        let subscription = self
            .subscriptions
            .get(tenant)
            .filter(|s| s.active)
            .ok_or_else(|| MeterError::TenantNotFound(tenant.to_string()))?;

        let limits = match subscription.plan_id.as_ref().or(self.default_plan.as_ref()) {
            Some(plan_id) => self.plans.get(plan_id).cloned().ok_or_else(|| {
                MeterError::Config(format!(
                    "tenant '{}' is subscribed to unknown plan '{}'",
                    tenant, plan_id
                ))
            })?,
            None => PlanLimits::unbounded(UNLIMITED_PLAN_ID),
        };

        debug!(tenant = %tenant, plan = %limits.plan_id, "Resolved plan");
        Ok(limits)
    }
}
