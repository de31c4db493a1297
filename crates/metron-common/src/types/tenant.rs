//! TenantId - opaque identifier of a metered tenant ("app")

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{MeterError, Result};

/// Opaque tenant identifier
///
/// Tenants are the isolated customers whose usage is measured. The identifier
/// is never interpreted beyond being non-blank; isolation between tenants is
/// the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant identifier, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(MeterError::InvalidArgument(
                "tenant id must not be blank".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for TenantId {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = MeterError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_rejected() {
        assert!(matches!(
            TenantId::new("   "),
            Err(MeterError::InvalidArgument(_))
        ));
        assert!(TenantId::new("").is_err());
    }

    #[test]
    fn test_display_round_trips_input() {
        let id: TenantId = "acme".parse().unwrap();
        assert_eq!(id.to_string(), "acme");
        assert_eq!(id.as_str(), "acme");
    }

    #[test]
    fn test_serde_validates() {
        let id: TenantId = serde_json::from_str("\"acme\"").unwrap();
        assert_eq!(id.as_str(), "acme");
        assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
    }
}
