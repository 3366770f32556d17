//! Customer profile contract

use serde::{Deserialize, Serialize};

/// Customer profile as returned by the customer service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CustomerProfile {
    /// Placeholder profile used when the customer service is unavailable.
    /// Reads must never fail on enrichment.
    pub fn fallback(user_id: i64) -> Self {
        Self {
            id: user_id,
            name: format!("Customer #{user_id}"),
            phone: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_profile() {
        let profile = CustomerProfile::fallback(42);
        assert_eq!(profile.id, 42);
        assert_eq!(profile.name, "Customer #42");
        assert!(profile.phone.is_none());
    }
}
