//! Plan limits - resolved subscription ceilings for a tenant
//!
//! A ceiling of `None` means the plan does not bound that metric. Usage above
//! a ceiling is reported as-is; nothing in Metron clamps or rejects it.

use serde::{Deserialize, Serialize};

/// Subscription ceilings resolved for one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Identifier of the plan these limits come from
    pub plan_id: String,
    /// Maximum API calls per calendar month
    pub max_api_calls: Option<u64>,
    /// Maximum total asset size in bytes
    pub max_asset_size: Option<u64>,
}

impl PlanLimits {
    pub fn new(
        plan_id: impl Into<String>,
        max_api_calls: Option<u64>,
        max_asset_size: Option<u64>,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            max_api_calls,
            max_asset_size,
        }
    }

    /// Limits of a plan that bounds nothing
    pub fn unbounded(plan_id: impl Into<String>) -> Self {
        Self::new(plan_id, None, None)
    }

    pub fn api_calls_exceeded(&self, calls: u64) -> bool {
        exceeds(self.max_api_calls, calls)
    }

    pub fn asset_size_exceeded(&self, bytes: u64) -> bool {
        exceeds(self.max_asset_size, bytes)
    }
}

/// Whether `value` is above `ceiling`; an absent ceiling is never exceeded
pub fn exceeds(ceiling: Option<u64>, value: u64) -> bool {
    ceiling.map_or(false, |max| value > max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_exceeded() {
        let limits = PlanLimits::unbounded("enterprise");
        assert!(!limits.api_calls_exceeded(u64::MAX));
        assert!(!limits.asset_size_exceeded(u64::MAX));
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        let limits = PlanLimits::new("basic", Some(1000), Some(10));
        assert!(!limits.api_calls_exceeded(1000));
        assert!(limits.api_calls_exceeded(1200));
        assert!(limits.asset_size_exceeded(11));
    }

    #[test]
    fn test_unbounded_serializes_as_null() {
        let json = serde_json::to_value(PlanLimits::new("free", Some(5), None)).unwrap();
        assert_eq!(json["max_api_calls"], 5);
        assert!(json["max_asset_size"].is_null());
    }
}
