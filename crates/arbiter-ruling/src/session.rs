//! # Ruling Session
//!
//! Orchestrates the ruling lifecycle over a proposal ledger and a round
//! safety ledger that the session owns for its lifetime:
//!
//! ```text
//! create_proposal ──▶ ledger: proposal (executed = false), draft kept
//! mark_executed   ──▶ ledger: proposal (executed = true)
//! execute         ──▶ authorize ─▶ proposal-id agreement ─▶ ledger binding
//!                     ─▶ outcome ─▶ round safety ─▶ record_ruling ─▶ artifact
//! verify/reconcile──▶ read-only view of a round's status
//! ```
//!
//! The ledger is only ever populated by `create_proposal` and flipped by
//! `mark_executed`. `execute` never seeds it from the proof it is checking,
//! so "proposal not found" and "not marked as executed" are live checks.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use arbiter_core::{sha256_digest, CanonicalBytes, DisputeId, PayloadHash, ProposalId};
use arbiter_state::{CommandStatus, Reconciliation};

use crate::audit::{stub_tx_signature, AuditArtifact};
use crate::authorization::authorize;
use crate::decision::{Rejection, RejectionKind};
use crate::error::RulingError;
use crate::ledger::ProposalLedger;
use crate::payload::{compile, RulingPayload};
use crate::proof::{self, ProposalProof};
use crate::round_safety::{check_round_safety, RoundSafetyLedger, RoundState};
use crate::snapshot::{DisputeSnapshot, Outcome};

/// A created proposal: the snapshot it was compiled from and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub proposal_id: ProposalId,
    pub snapshot: DisputeSnapshot,
    pub payload: RulingPayload,
}

/// A request to write a ruling for a dispute round.
#[derive(Debug, Clone, Default)]
pub struct ExecuteRequest {
    pub proposal_id: String,
    pub dispute_id: String,
    pub round: i64,
    pub proof: Option<Value>,
}

/// Result of [`RulingSession::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The ruling was recorded.
    Executed(AuditArtifact),
    /// The write was refused.
    Rejected(Rejection),
}

impl ExecutionOutcome {
    pub fn status(&self) -> CommandStatus {
        match self {
            Self::Executed(_) => CommandStatus::Executed,
            Self::Rejected(rejection) => rejection.kind.status(),
        }
    }
}

/// Read-only view of one dispute round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub dispute_id: DisputeId,
    pub round: u32,
    pub status: CommandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruling_hash: Option<PayloadHash>,
}

#[derive(Serialize)]
struct DraftlessRuling<'a> {
    dispute_id: &'a str,
    outcome: Outcome,
    proposal_id: &'a str,
    round: u32,
}

/// Owns the ledgers and drafts for a processing session.
#[derive(Debug)]
pub struct RulingSession<P, R> {
    proposals: P,
    rounds: R,
    drafts: RwLock<BTreeMap<ProposalId, ProposalDraft>>,
}

impl<P, R> RulingSession<P, R>
where
    P: ProposalLedger,
    R: RoundSafetyLedger,
{
    pub fn new(proposals: P, rounds: R) -> Self {
        Self::with_drafts(proposals, rounds, Vec::new())
    }

    /// Rebuild a session from persisted parts.
    pub fn with_drafts(proposals: P, rounds: R, drafts: impl IntoIterator<Item = ProposalDraft>) -> Self {
        let drafts = drafts
            .into_iter()
            .map(|draft| (draft.proposal_id.clone(), draft))
            .collect();
        Self {
            proposals,
            rounds,
            drafts: RwLock::new(drafts),
        }
    }

    pub fn proposal_ledger(&self) -> &P {
        &self.proposals
    }

    pub fn round_ledger(&self) -> &R {
        &self.rounds
    }

    /// All drafts, ordered by proposal id.
    pub fn drafts(&self) -> Vec<ProposalDraft> {
        self.drafts.read().values().cloned().collect()
    }

    pub fn draft(&self, proposal_id: &ProposalId) -> Option<ProposalDraft> {
        self.drafts.read().get(proposal_id).cloned()
    }

    /// Compile a snapshot into a proposal and register it as not executed.
    ///
    /// Creating the same proposal again returns the existing draft and
    /// leaves the ledger entry (including its executed flag) untouched.
    pub fn create_proposal(
        &self,
        snapshot: DisputeSnapshot,
        is_final: bool,
    ) -> Result<ProposalDraft, RulingError> {
        let payload = compile(&snapshot, is_final)?;
        let proposal_id = ProposalId::new(payload.proposal_id())?;

        let mut drafts = self.drafts.write();
        if self.proposals.get_proposal(&proposal_id).is_none() {
            self.proposals.add_proposal(ProposalProof::pending(
                proposal_id.clone(),
                snapshot.dispute_id().clone(),
                snapshot.round(),
            ));
        }
        let draft = drafts
            .entry(proposal_id.clone())
            .or_insert_with(|| ProposalDraft {
                proposal_id: proposal_id.clone(),
                snapshot,
                payload,
            })
            .clone();
        tracing::info!(
            proposal_id = %proposal_id,
            dispute_id = %draft.snapshot.dispute_id(),
            round = draft.snapshot.round(),
            "ruling proposal created"
        );
        Ok(draft)
    }

    /// Record that governance executed a proposal. `false` if unknown.
    pub fn mark_executed(&self, proposal_id: &ProposalId) -> bool {
        let marked = self.proposals.mark_executed(proposal_id);
        if marked {
            tracing::info!(proposal_id = %proposal_id, "proposal executed by governance");
        }
        marked
    }

    /// Authorize and commit a ruling write.
    ///
    /// # Errors
    ///
    /// Only internal invariant violations are errors. Every refusal is an
    /// [`ExecutionOutcome::Rejected`].
    pub fn execute(&self, request: &ExecuteRequest) -> Result<ExecutionOutcome, RulingError> {
        let outcome = self.try_execute(request)?;
        match &outcome {
            ExecutionOutcome::Executed(artifact) => tracing::info!(
                proposal_id = %artifact.proposal_id,
                dispute_id = %artifact.dispute_id,
                round = artifact.round,
                outcome = %artifact.outcome,
                "ruling recorded"
            ),
            ExecutionOutcome::Rejected(rejection) => tracing::warn!(
                proposal_id = request.proposal_id.trim(),
                dispute_id = request.dispute_id.trim(),
                round = request.round,
                kind = ?rejection.kind,
                reason = %rejection.message,
                "ruling write refused"
            ),
        }
        Ok(outcome)
    }

    fn try_execute(&self, request: &ExecuteRequest) -> Result<ExecutionOutcome, RulingError> {
        let Ok(proposal_id) = ProposalId::new(&request.proposal_id) else {
            return Ok(rejected(RejectionKind::InvalidTarget, "proposal_id is required"));
        };

        let decision = authorize(
            &self.proposals,
            request.proof.as_ref(),
            &request.dispute_id,
            request.round,
        );
        if let Some(rejection) = decision.rejection {
            return Ok(ExecutionOutcome::Rejected(rejection));
        }

        // Authorization passed, so the proof parses and is bound.
        let (Some(raw_proof), Some(parsed)) = (
            request.proof.as_ref(),
            request.proof.as_ref().and_then(proof::parse_value),
        ) else {
            return Ok(rejected(RejectionKind::ProofMalformed, "invalid proposal proof"));
        };
        if parsed.proposal_id != proposal_id {
            return Ok(rejected(
                RejectionKind::ProofMismatch,
                "proposal proof mismatch: proposal_id does not match command argument",
            ));
        }

        let dispute_id = DisputeId::new(&request.dispute_id)?;
        let Ok(round) = u32::try_from(request.round) else {
            return Ok(rejected(
                RejectionKind::InvalidTarget,
                "invalid target round: round exceeds the supported range",
            ));
        };

        if let Some(rejection) = self.check_ledger_binding(&proposal_id, &dispute_id, round) {
            return Ok(ExecutionOutcome::Rejected(rejection));
        }

        let draft = self.draft(&proposal_id);
        let outcome = match resolve_outcome(raw_proof, draft.as_ref()) {
            Ok(outcome) => outcome,
            Err(rejection) => return Ok(ExecutionOutcome::Rejected(rejection)),
        };

        let payload_round = draft.as_ref().map(|d| d.snapshot.round());
        let safety = check_round_safety(&self.rounds, &dispute_id, round, payload_round);
        if let Some(rejection) = safety.rejection {
            return Ok(ExecutionOutcome::Rejected(rejection));
        }

        let payload_hash = match &draft {
            Some(draft) => draft.payload.payload_hash.clone(),
            None => sha256_digest(&CanonicalBytes::new(&DraftlessRuling {
                dispute_id: dispute_id.as_str(),
                outcome,
                proposal_id: proposal_id.as_str(),
                round,
            })?),
        };

        if !self.rounds.record_ruling(&dispute_id, round, payload_hash.clone()) {
            return Ok(rejected(
                RejectionKind::DuplicateRoundWrite,
                "duplicate round write rejected",
            ));
        }

        let tx_signature = stub_tx_signature(&proposal_id);
        Ok(ExecutionOutcome::Executed(AuditArtifact::build(
            proposal_id,
            tx_signature,
            payload_hash,
            dispute_id,
            round,
            outcome,
        )))
    }

    /// A proposal created for one dispute round must not be spent on another,
    /// whatever binding the submitted proof claims.
    fn check_ledger_binding(
        &self,
        proposal_id: &ProposalId,
        dispute_id: &DisputeId,
        round: u32,
    ) -> Option<Rejection> {
        let stored = self.proposals.get_proposal(proposal_id)?;
        if let Some(bound) = stored.dispute_id.as_ref().filter(|bound| *bound != dispute_id) {
            return Some(Rejection::new(
                RejectionKind::ReplayBindingMismatch,
                format!("dispute mismatch: proposal dispute {bound} != target dispute {dispute_id}"),
            ));
        }
        match stored.round {
            Some(bound) if bound != round => Some(Rejection::new(
                RejectionKind::ReplayBindingMismatch,
                format!("round mismatch: proposal round {bound} != target round {round}"),
            )),
            _ => None,
        }
    }

    /// The stored status of a round.
    pub fn verify(&self, dispute_id: &DisputeId, round: u32) -> RoundReport {
        let state = self.rounds.get_state(dispute_id, round).unwrap_or(RoundState {
            status: CommandStatus::Pending,
            ruling_hash: None,
        });
        RoundReport {
            dispute_id: dispute_id.clone(),
            round,
            status: state.status,
            ruling_hash: state.ruling_hash,
        }
    }

    /// Fold an observed status into the round's stored status.
    ///
    /// Nothing is written: the round ledger only changes through
    /// `record_ruling`.
    pub fn reconcile(&self, dispute_id: &DisputeId, round: u32, observed: CommandStatus) -> Reconciliation {
        let current = self.rounds.get_status(dispute_id, round);
        let reconciliation = Reconciliation::apply(current, observed);
        if reconciliation.was_sticky() {
            tracing::debug!(
                dispute_id = %dispute_id,
                round,
                current = %current,
                observed = %observed,
                "terminal status kept"
            );
        }
        reconciliation
    }
}

fn rejected(kind: RejectionKind, message: impl Into<String>) -> ExecutionOutcome {
    ExecutionOutcome::Rejected(Rejection::new(kind, message))
}

/// The draft's outcome wins; a proof `outcome` may only confirm it. Without
/// a draft the proof's outcome is used, defaulting to `Allow`.
fn resolve_outcome(proof: &Value, draft: Option<&ProposalDraft>) -> Result<Outcome, Rejection> {
    let claimed = match proof.get("outcome") {
        None => None,
        Some(Value::String(raw)) => Some(raw.parse::<Outcome>().map_err(|_| invalid_outcome())?),
        Some(_) => return Err(invalid_outcome()),
    };
    match (draft, claimed) {
        (Some(draft), Some(claimed)) if claimed != draft.snapshot.outcome() => Err(Rejection::new(
            RejectionKind::InvalidOutcome,
            format!(
                "invalid outcome in proposal proof: {claimed} contradicts proposal outcome {}",
                draft.snapshot.outcome()
            ),
        )),
        (Some(draft), _) => Ok(draft.snapshot.outcome()),
        (None, claimed) => Ok(claimed.unwrap_or(Outcome::Allow)),
    }
}

fn invalid_outcome() -> Rejection {
    Rejection::new(
        RejectionKind::InvalidOutcome,
        "invalid outcome in proposal proof: expected Allow or Deny",
    )
}
