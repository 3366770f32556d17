//! Typed request roles
//!
//! The gateway forwards caller roles as a comma-separated header value.
//! Role checks are typed set-membership tests, never substring matches on
//! the raw header.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Roles recognised by the order service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Restaurant,
    DeliveryAgent,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Restaurant => "RESTAURANT",
            Role::DeliveryAgent => "DELIVERY_AGENT",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a role token that is not in the enumeration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CUSTOMER" => Ok(Role::Customer),
            "RESTAURANT" => Ok(Role::Restaurant),
            "DELIVERY_AGENT" => Ok(Role::DeliveryAgent),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Set of roles attached to a request identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(HashSet<Role>);

impl RoleSet {
    /// Parse a comma-separated header value. Unknown tokens are dropped —
    /// this service only cares about the roles it knows.
    pub fn parse(header: &str) -> Self {
        header
            .split(',')
            .filter_map(|token| token.parse::<Role>().ok())
            .collect()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_role() {
        let roles = RoleSet::parse("CUSTOMER");
        assert!(roles.contains(Role::Customer));
        assert!(!roles.contains(Role::Restaurant));
    }

    #[test]
    fn test_parse_multiple_roles_with_whitespace() {
        let roles = RoleSet::parse("CUSTOMER, RESTAURANT ,ADMIN");
        assert!(roles.contains(Role::Customer));
        assert!(roles.contains(Role::Restaurant));
        assert!(roles.contains(Role::Admin));
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let roles = RoleSet::parse("SUPERUSER,CUSTOMER,");
        assert!(roles.contains(Role::Customer));
        assert!(!roles.contains(Role::Admin));
    }

    #[test]
    fn test_substring_tokens_do_not_match() {
        // A raw contains() check on the header would accept this; the typed
        // parse must not.
        let roles = RoleSet::parse("NOT_A_CUSTOMER");
        assert!(!roles.contains(Role::Customer));
        assert!(roles.is_empty());
    }

    #[test]
    fn test_empty_header() {
        assert!(RoleSet::parse("").is_empty());
    }
}
