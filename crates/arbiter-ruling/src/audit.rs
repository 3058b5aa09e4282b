//! Audit artifact: the immutable, externally reportable record of a
//! committed ruling.

use serde::{Deserialize, Serialize};

use arbiter_core::{DisputeId, PayloadHash, ProposalId};

use crate::snapshot::Outcome;

/// Prefix of the stub transaction reference.
pub const TX_SIGNATURE_PREFIX: &str = "sig_";

/// Proposal-id characters carried into the stub transaction reference.
pub const TX_SIGNATURE_ID_LEN: usize = 16;

/// Record of a successful ruling write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditArtifact {
    pub proposal_id: ProposalId,
    pub tx_signature: String,
    pub payload_hash: PayloadHash,
    pub dispute_id: DisputeId,
    pub round: u32,
    pub outcome: Outcome,
}

impl AuditArtifact {
    /// Assemble the record. Inputs are assumed already authorized.
    pub fn build(
        proposal_id: ProposalId,
        tx_signature: impl Into<String>,
        payload_hash: PayloadHash,
        dispute_id: DisputeId,
        round: u32,
        outcome: Outcome,
    ) -> Self {
        Self {
            proposal_id,
            tx_signature: tx_signature.into(),
            payload_hash,
            dispute_id,
            round,
            outcome,
        }
    }
}

/// Deterministic transaction reference for a proposal. No transaction is
/// submitted anywhere.
pub fn stub_tx_signature(proposal_id: &ProposalId) -> String {
    let id: String = proposal_id.as_str().chars().take(TX_SIGNATURE_ID_LEN).collect();
    format!("{TX_SIGNATURE_PREFIX}{id}")
}
