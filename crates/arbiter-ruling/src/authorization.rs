//! # Ruling Write Authorization
//!
//! Decides whether a governance proof authorizes a ruling write against a
//! target `(dispute_id, round)`. Checks run in a fixed order and the first
//! failure wins:
//!
//! 1. target dispute id non-empty
//! 2. target round non-negative
//! 3. proof present
//! 4. proof parses
//! 5. proof type is `executed-governance-proposal`
//! 6. proof claims execution
//! 7. ledger knows the proposal
//! 8. ledger's own record is executed
//! 9. proof carries `dispute_id`
//! 10. proof carries `round`
//! 11. proof dispute equals target dispute
//! 12. proof round equals target round
//!
//! Passing every check yields `Pending`, not `Executed`: the round-safety
//! ledger still gates the actual write.
//!
//! ## Security Invariant
//!
//! A proof without an explicit dispute/round binding can be replayed
//! against any dispute. Checks 9 and 10 make the binding mandatory for
//! writes even though the wire format marks both fields optional.

use serde_json::Value;

use crate::decision::{Decision, RejectionKind};
use crate::ledger::ProposalLedger;
use crate::proof::{self, EXECUTED_GOVERNANCE_PROOF_TYPE};

/// Authorize a ruling write.
///
/// `target_round` is signed so that a negative round from an external
/// layer is reported as an invalid target instead of being wrapped.
pub fn authorize<L>(
    ledger: &L,
    proof: Option<&Value>,
    target_dispute_id: &str,
    target_round: i64,
) -> Decision
where
    L: ProposalLedger + ?Sized,
{
    let decision = evaluate(ledger, proof, target_dispute_id, target_round);
    match &decision.rejection {
        Some(rejection) => tracing::warn!(
            dispute_id = target_dispute_id,
            round = target_round,
            kind = ?rejection.kind,
            reason = %rejection.message,
            "ruling write not authorized"
        ),
        None => tracing::debug!(
            dispute_id = target_dispute_id,
            round = target_round,
            "ruling write authorized"
        ),
    }
    decision
}

fn evaluate<L>(
    ledger: &L,
    proof: Option<&Value>,
    target_dispute_id: &str,
    target_round: i64,
) -> Decision
where
    L: ProposalLedger + ?Sized,
{
    let target_dispute_id = target_dispute_id.trim();
    if target_dispute_id.is_empty() {
        return Decision::reject(
            RejectionKind::InvalidTarget,
            "invalid target dispute: dispute_id is required",
        );
    }

    if target_round < 0 {
        return Decision::reject(
            RejectionKind::InvalidTarget,
            "invalid target round: round must be non-negative",
        );
    }

    let Some(raw) = proof else {
        return Decision::reject(
            RejectionKind::ProofMissing,
            "proposal proof missing: resolver write requires executed governance proposal",
        );
    };

    let Some(parsed) = proof::parse_value(raw) else {
        let message = if raw.is_object() {
            "invalid proposal proof: missing or malformed required fields (proposal_id, executed)"
        } else {
            "invalid proposal proof: expected JSON object"
        };
        return Decision::reject(RejectionKind::ProofMalformed, message);
    };

    if parsed.proof_type != EXECUTED_GOVERNANCE_PROOF_TYPE {
        return Decision::reject(
            RejectionKind::ProofTypeMismatch,
            format!("invalid proposal proof type: expected {EXECUTED_GOVERNANCE_PROOF_TYPE}"),
        );
    }

    if !parsed.executed {
        return Decision::reject(
            RejectionKind::ProofNotExecuted,
            format!(
                "proposal not executed: proposal {} status is not executed",
                parsed.proposal_id
            ),
        );
    }

    let Some(stored) = ledger.get_proposal(&parsed.proposal_id) else {
        return Decision::reject(
            RejectionKind::ProposalNotFound,
            format!("proposal not found: {}", parsed.proposal_id),
        );
    };

    if !stored.executed {
        return Decision::reject(
            RejectionKind::LedgerNotExecuted,
            format!(
                "proposal not executed: proposal {} is not marked as executed",
                parsed.proposal_id
            ),
        );
    }

    let Some(proof_dispute) = parsed.dispute_id.as_ref() else {
        return Decision::reject(
            RejectionKind::ReplayBindingMissing,
            "invalid proposal proof: dispute_id is required for replay protection",
        );
    };

    let Some(proof_round) = parsed.round else {
        return Decision::reject(
            RejectionKind::ReplayBindingMissing,
            "invalid proposal proof: round is required for replay protection",
        );
    };

    if proof_dispute.as_str() != target_dispute_id {
        return Decision::reject(
            RejectionKind::ReplayBindingMismatch,
            format!(
                "dispute mismatch: proposal dispute {proof_dispute} != target dispute {target_dispute_id}"
            ),
        );
    }

    if i64::from(proof_round) != target_round {
        return Decision::reject(
            RejectionKind::ReplayBindingMismatch,
            format!("round mismatch: proposal round {proof_round} != target round {target_round}"),
        );
    }

    Decision::proceed()
}
