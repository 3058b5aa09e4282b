//! # Operator Key Authorization
//!
//! Least-privilege gate on the key used to invoke an operation. The
//! governance authority may do anything; operator keys may run the ruling
//! workflow but never mutate policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decision::{Decision, RejectionKind};

/// The role of the signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRole {
    GovernanceAuthority,
    Operator,
}

/// The class of operation being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    CreateProposal,
    Vote,
    ExecuteRuling,
    PolicyMutation,
}

impl KeyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GovernanceAuthority => "governance_authority",
            Self::Operator => "operator",
        }
    }
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProposal => "create_proposal",
            Self::Vote => "vote",
            Self::ExecuteRuling => "execute_ruling",
            Self::PolicyMutation => "policy_mutation",
        }
    }

    /// Whether the operation changes DAO policy.
    pub fn is_policy_mutation(&self) -> bool {
        matches!(self, Self::PolicyMutation)
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "governance_authority" => Ok(Self::GovernanceAuthority),
            "operator" => Ok(Self::Operator),
            other => Err(format!("unknown key role: {other}")),
        }
    }
}

/// Authorize `operation` for a key with `role`.
pub fn authorize_operation(role: KeyRole, operation: OperationType) -> Decision {
    match (role, operation.is_policy_mutation()) {
        (KeyRole::GovernanceAuthority, _) | (KeyRole::Operator, false) => Decision::proceed(),
        (KeyRole::Operator, true) => {
            tracing::warn!(role = %role, operation = %operation, "operation denied for key role");
            Decision::reject(
                RejectionKind::OperationNotPermitted,
                "authorization denied: operator keys cannot perform policy mutation operations",
            )
        }
    }
}
