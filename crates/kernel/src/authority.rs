//! Authorities: the role classes that gate route visibility.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role class of the signed-in principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    /// Platform administrator.
    SysAdmin,
    /// Administrator of a single tenant.
    TenantAdmin,
    /// End user belonging to a tenant's customer.
    CustomerUser,
}

impl Authority {
    /// All authorities, in privilege order.
    pub const ALL: [Authority; 3] = [
        Authority::SysAdmin,
        Authority::TenantAdmin,
        Authority::CustomerUser,
    ];

    /// Wire name (e.g. `"TENANT_ADMIN"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Authority::SysAdmin => "SYS_ADMIN",
            Authority::TenantAdmin => "TENANT_ADMIN",
            Authority::CustomerUser => "CUSTOMER_USER",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Authority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Authority::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| {
                format!("unknown authority '{s}'; expected one of SYS_ADMIN, TENANT_ADMIN, CUSTOMER_USER")
            })
    }
}

/// Authority requirement declared on a route: a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorityRule {
    One(Authority),
    Any(Vec<Authority>),
}

impl AuthorityRule {
    /// Whether `authority` satisfies this rule.
    ///
    /// A principal with no authority never satisfies a rule.
    pub fn allows(&self, authority: Option<Authority>) -> bool {
        let Some(authority) = authority else {
            return false;
        };
        match self {
            AuthorityRule::One(required) => *required == authority,
            AuthorityRule::Any(required) => required.contains(&authority),
        }
    }
}
