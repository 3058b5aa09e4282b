//! # Proposal Ledger
//!
//! A key-value fact store of known governance proposals, keyed by
//! proposal id. The ledger has no opinion on authorization: replay
//! protection lives in [`authorization`](crate::authorization) and
//! [`round_safety`](crate::round_safety).
//!
//! Entries are replaced wholesale; `mark_executed` writes a new proof with
//! `executed = true` rather than mutating the stored one in place.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use arbiter_core::ProposalId;

use crate::proof::ProposalProof;

/// Storage contract for known proposals.
///
/// Implementations may be backed by any medium. The authorization engine
/// only depends on this trait.
pub trait ProposalLedger: Send + Sync {
    /// Insert or overwrite the proposal keyed by its id. Last write wins.
    fn add_proposal(&self, proof: ProposalProof);

    /// Look up a proposal.
    fn get_proposal(&self, id: &ProposalId) -> Option<ProposalProof>;

    /// Flip `executed` to `true`, preserving the other fields.
    ///
    /// Returns `false` (and changes nothing) if the id is unknown.
    fn mark_executed(&self, id: &ProposalId) -> bool;

    /// All known proposals, ordered by id.
    fn proposals(&self) -> Vec<ProposalProof>;
}

/// In-memory proposal ledger.
///
/// Thread-safe via `parking_lot::RwLock`. `mark_executed` runs its
/// read-modify-write under a single write guard.
#[derive(Debug, Default)]
pub struct InMemoryProposalLedger {
    proposals: RwLock<BTreeMap<ProposalId, ProposalProof>>,
}

impl InMemoryProposalLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-populated with proposals (e.g. loaded from disk).
    pub fn from_proposals(proposals: impl IntoIterator<Item = ProposalProof>) -> Self {
        let ledger = Self::new();
        for proof in proposals {
            ledger.add_proposal(proof);
        }
        ledger
    }

    /// Number of known proposals.
    pub fn len(&self) -> usize {
        self.proposals.read().len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.proposals.read().is_empty()
    }
}

impl ProposalLedger for InMemoryProposalLedger {
    fn add_proposal(&self, proof: ProposalProof) {
        tracing::debug!(proposal_id = %proof.proposal_id, executed = proof.executed, "proposal stored");
        self.proposals
            .write()
            .insert(proof.proposal_id.clone(), proof);
    }

    fn get_proposal(&self, id: &ProposalId) -> Option<ProposalProof> {
        self.proposals.read().get(id).cloned()
    }

    fn mark_executed(&self, id: &ProposalId) -> bool {
        let mut guard = self.proposals.write();
        match guard.remove(id) {
            Some(stored) => {
                guard.insert(id.clone(), stored.into_executed());
                tracing::debug!(proposal_id = %id, "proposal marked executed");
                true
            }
            None => false,
        }
    }

    fn proposals(&self) -> Vec<ProposalProof> {
        self.proposals.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::DisputeId;

    fn pid(s: &str) -> ProposalId {
        ProposalId::new(s).unwrap()
    }

    fn pending(id: &str) -> ProposalProof {
        ProposalProof::pending(pid(id), DisputeId::new("d-1").unwrap(), 0)
    }

    #[test]
    fn add_then_get() {
        let ledger = InMemoryProposalLedger::new();
        assert!(ledger.get_proposal(&pid("p1")).is_none());
        ledger.add_proposal(pending("p1"));
        assert_eq!(ledger.get_proposal(&pid("p1")), Some(pending("p1")));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn last_write_wins() {
        let ledger = InMemoryProposalLedger::new();
        ledger.add_proposal(pending("p1"));
        let mut replacement = pending("p1");
        replacement.round = Some(9);
        ledger.add_proposal(replacement.clone());
        assert_eq!(ledger.get_proposal(&pid("p1")), Some(replacement));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn mark_executed_preserves_other_fields() {
        let ledger = InMemoryProposalLedger::new();
        ledger.add_proposal(pending("p1"));
        assert!(ledger.mark_executed(&pid("p1")));
        let stored = ledger.get_proposal(&pid("p1")).unwrap();
        assert!(stored.executed);
        assert_eq!(stored.dispute_id.unwrap().as_str(), "d-1");
        assert_eq!(stored.round, Some(0));
    }

    #[test]
    fn mark_executed_unknown_id_is_noop() {
        let ledger = InMemoryProposalLedger::new();
        ledger.add_proposal(pending("p1"));
        assert!(!ledger.mark_executed(&pid("p2")));
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.get_proposal(&pid("p1")).unwrap().executed);
    }

    #[test]
    fn from_proposals_round_trips_listing() {
        let ledger = InMemoryProposalLedger::from_proposals([pending("b"), pending("a")]);
        let ids: Vec<String> = ledger
            .proposals()
            .into_iter()
            .map(|p| p.proposal_id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
