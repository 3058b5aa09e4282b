//! # Governance Adapter
//!
//! Deterministic stand-in for the governance program. It derives proposal
//! ids, produces binding-complete executed-proposal proofs, and validates
//! votes and resolver bindings. Nothing here talks to a network: a real
//! governance client would replace this adapter at the same seam.

use serde::{Deserialize, Serialize};

use arbiter_core::{sha256_raw_hex, AddressValidator, DisputeId, ProposalId, ValidationError};

use crate::proof::ProposalProof;
use crate::treasury::RecordRulingPayload;

/// Hex characters of the intent digest used as a governance proposal id.
pub const GOVERNANCE_PROPOSAL_ID_LEN: usize = 32;

/// What a governance proposal asks the DAO to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalIntent {
    pub governance_address: String,
    pub dispute_id: DisputeId,
    pub round: u32,
    pub payload: RecordRulingPayload,
}

/// Governance stub bound to one governance address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceAdapter {
    governance_address: String,
}

impl GovernanceAdapter {
    /// Build an adapter after normalizing the governance address.
    pub fn new(
        validator: &dyn AddressValidator,
        governance_address: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            governance_address: validator.normalize(governance_address, "governance_address")?,
        })
    }

    pub fn governance_address(&self) -> &str {
        &self.governance_address
    }

    /// Intent for recording `payload` against a dispute round.
    pub fn intent(&self, dispute_id: DisputeId, round: u32, payload: RecordRulingPayload) -> ProposalIntent {
        ProposalIntent {
            governance_address: self.governance_address.clone(),
            dispute_id,
            round,
            payload,
        }
    }

    /// Proposal id: first 32 hex characters of
    /// `sha256("{governance}|{dispute}|{round}|{instruction hash}")`.
    pub fn derive_proposal_id(&self, intent: &ProposalIntent) -> Result<ProposalId, ValidationError> {
        let preimage = format!(
            "{}|{}|{}|{}",
            intent.governance_address,
            intent.dispute_id,
            intent.round,
            intent.payload.payload_hash()
        );
        let digest = sha256_raw_hex(preimage.as_bytes());
        ProposalId::new(digest.prefix(GOVERNANCE_PROPOSAL_ID_LEN))
    }

    /// The proof governance hands out once it has executed `proposal_id`.
    pub fn proposal_proof(&self, proposal_id: ProposalId, dispute_id: DisputeId, round: u32) -> ProposalProof {
        ProposalProof::pending(proposal_id, dispute_id, round).into_executed()
    }
}

/// A vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Approve,
    Deny,
}

impl From<bool> for VoteChoice {
    fn from(approve: bool) -> Self {
        if approve {
            Self::Approve
        } else {
            Self::Deny
        }
    }
}

/// A validated vote. Votes are passed through to governance; nothing here
/// tallies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: String,
    pub vote: VoteChoice,
}

/// Validate a vote for submission.
pub fn prepare_vote(
    validator: &dyn AddressValidator,
    proposal_id: &str,
    voter: &str,
    approve: bool,
) -> Result<Vote, ValidationError> {
    let proposal_id = ProposalId::new(proposal_id)?;
    let voter = validator.normalize(voter, "voter")?;
    Ok(Vote {
        proposal_id,
        voter,
        vote: VoteChoice::from(approve),
    })
}

/// Outcome of checking that a resolver is bound to the governance address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverBinding {
    pub governance_address: String,
    pub resolver_address: String,
}

impl ResolverBinding {
    /// Normalize both addresses.
    pub fn new(
        validator: &dyn AddressValidator,
        governance_address: &str,
        resolver_address: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            governance_address: validator.normalize(governance_address, "governance_address")?,
            resolver_address: validator.normalize(resolver_address, "resolver_address")?,
        })
    }

    /// The resolver must be the governance address itself.
    pub fn is_bound(&self) -> bool {
        self.governance_address == self.resolver_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Outcome;
    use arbiter_core::Base58AddressValidator;

    const GOV: &str = "GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw";
    const OTHER: &str = "SafeTreasury1111111111111111111111111111111";

    fn payload() -> RecordRulingPayload {
        RecordRulingPayload {
            payout_id: 1,
            round: 0,
            outcome: Outcome::Allow,
            is_final: false,
        }
    }

    #[test]
    fn proposal_id_is_deterministic_and_sized() {
        let adapter = GovernanceAdapter::new(&Base58AddressValidator, GOV).unwrap();
        let intent = adapter.intent(DisputeId::new("d-1").unwrap(), 0, payload());
        let a = adapter.derive_proposal_id(&intent).unwrap();
        let b = adapter.derive_proposal_id(&intent).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), GOVERNANCE_PROPOSAL_ID_LEN);

        let other_round = adapter.intent(DisputeId::new("d-1").unwrap(), 1, payload());
        assert_ne!(adapter.derive_proposal_id(&other_round).unwrap(), a);
    }

    #[test]
    fn proof_is_executed_and_bound() {
        let adapter = GovernanceAdapter::new(&Base58AddressValidator, GOV).unwrap();
        let proof = adapter.proposal_proof(
            ProposalId::new("p1").unwrap(),
            DisputeId::new("d-1").unwrap(),
            2,
        );
        assert!(proof.executed);
        assert!(proof.is_bound());
        assert_eq!(proof.round, Some(2));
    }

    #[test]
    fn adapter_rejects_invalid_governance_address() {
        let err = GovernanceAdapter::new(&Base58AddressValidator, "not-a-key").unwrap_err();
        assert_eq!(err.to_string(), "governance_address must be a valid public key");
    }

    #[test]
    fn vote_validation() {
        let vote = prepare_vote(&Base58AddressValidator, " p1 ", GOV, false).unwrap();
        assert_eq!(vote.proposal_id.as_str(), "p1");
        assert_eq!(vote.vote, VoteChoice::Deny);

        let err = prepare_vote(&Base58AddressValidator, "", GOV, true).unwrap_err();
        assert_eq!(err.to_string(), "proposal_id is required");
        let err = prepare_vote(&Base58AddressValidator, "p1", "", true).unwrap_err();
        assert_eq!(err.to_string(), "voter is required");
    }

    #[test]
    fn resolver_binding() {
        let bound = ResolverBinding::new(&Base58AddressValidator, GOV, &format!(" {GOV} ")).unwrap();
        assert!(bound.is_bound());
        let mismatch = ResolverBinding::new(&Base58AddressValidator, GOV, OTHER).unwrap();
        assert!(!mismatch.is_bound());
        let err = ResolverBinding::new(&Base58AddressValidator, GOV, "").unwrap_err();
        assert_eq!(err.to_string(), "resolver_address is required");
    }
}
