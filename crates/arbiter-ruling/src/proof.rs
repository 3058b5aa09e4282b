//! # Proposal Proof Parser
//!
//! A proposal proof is an untyped JSON object claiming that governance
//! executed a proposal. Parsing is strict and all-or-nothing: any field of
//! the wrong type rejects the whole object. A missing proof is a normal
//! outcome (`None`), and the caller attaches its own context.
//!
//! | field         | rule                                                    |
//! |---------------|---------------------------------------------------------|
//! | `proposal_id` | string, trimmed, non-empty                              |
//! | `proof_type`  | string, trimmed, non-empty; defaults when the key is absent |
//! | `executed`    | strictly boolean (`"true"` and `1` are rejected)        |
//! | `dispute_id`  | absent/null → `None`; else string, trimmed, non-empty   |
//! | `round`       | absent/null → `None`; else non-negative integer, never a boolean |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use arbiter_core::{DisputeId, ProposalId};

/// The proof type produced by governance for an executed proposal.
pub const EXECUTED_GOVERNANCE_PROOF_TYPE: &str = "executed-governance-proposal";

/// A typed claim that governance executed `proposal_id`.
///
/// `dispute_id` and `round` are the binding fields. The wire shape allows
/// them to be absent, but write authorization requires both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalProof {
    /// The governance proposal.
    pub proposal_id: ProposalId,
    /// The kind of proof, normally [`EXECUTED_GOVERNANCE_PROOF_TYPE`].
    pub proof_type: String,
    /// Whether the proposal was executed.
    pub executed: bool,
    /// Dispute this proof is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_id: Option<DisputeId>,
    /// Round this proof is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
}

impl ProposalProof {
    /// A proof of the default type, not yet executed, bound to a dispute round.
    pub fn pending(proposal_id: ProposalId, dispute_id: DisputeId, round: u32) -> Self {
        Self {
            proposal_id,
            proof_type: EXECUTED_GOVERNANCE_PROOF_TYPE.to_string(),
            executed: false,
            dispute_id: Some(dispute_id),
            round: Some(round),
        }
    }

    /// A copy with `executed` set, all other fields preserved.
    pub fn into_executed(self) -> Self {
        Self {
            executed: true,
            ..self
        }
    }

    /// Whether both binding fields are present.
    pub fn is_bound(&self) -> bool {
        self.dispute_id.is_some() && self.round.is_some()
    }

    /// The wire form of this proof.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Parse a JSON value. Anything other than an object yields `None`.
pub fn parse_value(raw: &Value) -> Option<ProposalProof> {
    raw.as_object().and_then(parse)
}

/// Parse an untyped proof object into a [`ProposalProof`].
pub fn parse(raw: &Map<String, Value>) -> Option<ProposalProof> {
    let proposal_id = ProposalId::new(raw.get("proposal_id")?.as_str()?).ok()?;

    let proof_type = match raw.get("proof_type") {
        None => EXECUTED_GOVERNANCE_PROOF_TYPE.to_string(),
        Some(value) => non_empty_trimmed(value)?,
    };

    let executed = match raw.get("executed")? {
        Value::Bool(flag) => *flag,
        _ => return None,
    };

    let dispute_id = match raw.get("dispute_id") {
        None | Some(Value::Null) => None,
        Some(value) => Some(DisputeId::new(value.as_str()?).ok()?),
    };

    let round = match raw.get("round") {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_round(value)?),
    };

    Some(ProposalProof {
        proposal_id,
        proof_type,
        executed,
        dispute_id,
        round,
    })
}

fn non_empty_trimmed(value: &Value) -> Option<String> {
    let trimmed = value.as_str()?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A round must be a JSON integer in `0..=u32::MAX`. Booleans, floats, and
/// numeric strings are all rejected.
fn parse_round(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => u32::try_from(n.as_u64()?).ok(),
        _ => None,
    }
}
