// 4.x capability.rs: privileged entry points check a capability, not a type hierarchy.
// each capability maps to exactly one collaborator identity fixed in config.

use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// fees, thresholds, oracle params, pause, fee withdrawal, price refresh
    Governance,
    /// credit/debit of pooled margin
    MarginPool,
    /// moving idle reserve to and from the yield venue
    YieldVenue,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Governance => "governance",
            Capability::MarginPool => "margin_pool",
            Capability::YieldVenue => "yield_venue",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignments {
    pub governance: AccountId,
    pub margin_pool: AccountId,
    pub yield_venue: AccountId,
}

impl Default for RoleAssignments {
    fn default() -> Self {
        Self {
            governance: AccountId(1),
            margin_pool: AccountId(2),
            yield_venue: AccountId(3),
        }
    }
}

impl RoleAssignments {
    pub fn holder(&self, capability: Capability) -> AccountId {
        match capability {
            Capability::Governance => self.governance,
            Capability::MarginPool => self.margin_pool,
            Capability::YieldVenue => self.yield_venue,
        }
    }

    pub fn grants(&self, caller: AccountId, capability: Capability) -> bool {
        self.holder(capability) == caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_identity_per_capability() {
        let roles = RoleAssignments::default();
        assert!(roles.grants(AccountId(1), Capability::Governance));
        assert!(!roles.grants(AccountId(1), Capability::MarginPool));
        assert!(roles.grants(AccountId(2), Capability::MarginPool));
        assert_eq!(roles.holder(Capability::YieldVenue), AccountId(3));
    }
}
