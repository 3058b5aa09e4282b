//! # Ruling Subcommands
//!
//! Proposal creation, governance execution, ruling writes, and round status
//! queries. Each handler returns a [`CommandResult`]; domain refusals are
//! `failed`/`already_ruled` results, and only I/O or internal invariant
//! failures surface as `Err`.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::{json, Value};

use arbiter_core::{Base58AddressValidator, DisputeId, ProposalId};
use arbiter_ruling::{
    DisputeSnapshot, ExecuteRequest, ExecutionOutcome, GovernanceAdapter, OperationType, Outcome,
    ProposalDraft, ProposalLedger, RulingError, SafeTreasuryAdapter,
};
use arbiter_state::CommandStatus;

use crate::result::CommandResult;
use crate::state::{with_locked_session, StateFile};
use crate::{parse_round, Context};

const CREATE: &str = "create-ruling-proposal";
const MARK_EXECUTED: &str = "mark-executed";
const EXECUTE: &str = "execute-ruling-proposal";
const VERIFY: &str = "verify-ruling-status";
const RECONCILE: &str = "reconcile-ruling-status";

/// Arguments for `arbiter create-ruling-proposal`.
#[derive(Args, Debug)]
pub struct CreateProposalArgs {
    /// Safe (treasury vault) address holding the payout.
    #[arg(long)]
    pub safe: String,
    /// Disputed payout identifier.
    #[arg(long, allow_negative_numbers = true)]
    pub payout_id: i128,
    /// Dispute identifier.
    #[arg(long)]
    pub dispute_id: String,
    /// Dispute round.
    #[arg(long, allow_negative_numbers = true)]
    pub round: i64,
    /// Ruling outcome: `Allow` or `Deny`.
    #[arg(long)]
    pub outcome: String,
    /// Mark the ruling as final for the dispute.
    #[arg(long)]
    pub is_final: bool,
}

/// Arguments for `arbiter mark-executed`.
#[derive(Args, Debug)]
pub struct MarkExecutedArgs {
    /// Proposal that governance executed.
    #[arg(long)]
    pub proposal_id: String,
}

/// Arguments for `arbiter execute-ruling-proposal`.
#[derive(Args, Debug)]
pub struct ExecuteArgs {
    /// Proposal whose ruling is being written.
    #[arg(long)]
    pub proposal_id: String,
    /// Target dispute.
    #[arg(long)]
    pub dispute_id: String,
    /// Target round.
    #[arg(long, allow_negative_numbers = true)]
    pub round: i64,
    /// Executed-proposal proof as inline JSON.
    #[arg(long, conflicts_with = "proof_file")]
    pub proof: Option<String>,
    /// Path to a JSON file holding the proof.
    #[arg(long)]
    pub proof_file: Option<PathBuf>,
}

/// Arguments for `arbiter verify-ruling-status`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[arg(long)]
    pub dispute_id: String,
    #[arg(long, allow_negative_numbers = true)]
    pub round: i64,
    /// Fail unless the stored status equals this one.
    #[arg(long)]
    pub expected_status: Option<String>,
}

/// Arguments for `arbiter reconcile-ruling-status`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    #[arg(long)]
    pub dispute_id: String,
    #[arg(long, allow_negative_numbers = true)]
    pub round: i64,
    /// Status observed elsewhere.
    #[arg(long)]
    pub target_status: String,
}

/// Execute `create-ruling-proposal`.
pub fn run_create(args: &CreateProposalArgs, ctx: &Context) -> Result<CommandResult> {
    if let Some(denied) = ctx.deny(CREATE, OperationType::CreateProposal) {
        return Ok(denied);
    }
    let outcome = match args.outcome.parse::<Outcome>() {
        Ok(outcome) => outcome,
        Err(e) => return Ok(CommandResult::failed(CREATE, e.to_string())),
    };
    let snapshot = match DisputeSnapshot::new(
        &args.safe,
        args.payout_id,
        &args.dispute_id,
        args.round,
        outcome,
    ) {
        Ok(snapshot) => snapshot,
        Err(e) => return Ok(CommandResult::failed(CREATE, e.to_string())),
    };
    let governance =
        match GovernanceAdapter::new(&Base58AddressValidator, &ctx.settings.governance_program_id) {
            Ok(adapter) => adapter,
            Err(e) => return Ok(CommandResult::failed(CREATE, e.to_string())),
        };

    let treasury = SafeTreasuryAdapter::new(&ctx.settings.safe_treasury_program_id);

    with_locked_session(&ctx.state_file, |session| {
        let draft = match session.create_proposal(snapshot, args.is_final) {
            Ok(draft) => draft,
            Err(e) if e.is_internal() => return Err(e.into()),
            Err(e) => return Ok(CommandResult::failed(CREATE, e.to_string())),
        };
        let instruction = match record_ruling_instruction(&treasury, &governance, &draft) {
            Ok(instruction) => instruction,
            Err(e) => return Ok(CommandResult::failed(CREATE, e.to_string())),
        };
        StateFile::capture(session).save(&ctx.state_file)?;

        Ok(CommandResult::new(CREATE, CommandStatus::Pending)
            .with("proposal_id", &draft.proposal_id)
            .with("payload", &draft.payload)
            .with("snapshot", &draft.snapshot)
            .with("record_ruling", instruction))
    })
}

/// The safe-treasury instruction and governance proposal id for a draft.
///
/// `Null` when the round does not fit the instruction's round byte.
fn record_ruling_instruction(
    treasury: &SafeTreasuryAdapter,
    governance: &GovernanceAdapter,
    draft: &ProposalDraft,
) -> Result<Value, RulingError> {
    let payload = match treasury.record_ruling(&draft.snapshot, draft.payload.is_final) {
        Ok(payload) => payload,
        Err(RulingError::Encoding(reason)) => {
            tracing::warn!(proposal_id = %draft.proposal_id, %reason, "record_ruling instruction not encodable");
            return Ok(Value::Null);
        }
        Err(e) => return Err(e),
    };
    let intent = governance.intent(
        draft.snapshot.dispute_id().clone(),
        draft.snapshot.round(),
        payload,
    );
    let governance_proposal_id = governance.derive_proposal_id(&intent)?;
    Ok(json!({
        "program_id": treasury.program_id(),
        "instruction_hash": payload.payload_hash(),
        "governance_address": governance.governance_address(),
        "governance_proposal_id": governance_proposal_id,
    }))
}

/// Execute `mark-executed`.
pub fn run_mark_executed(args: &MarkExecutedArgs, ctx: &Context) -> Result<CommandResult> {
    if let Some(denied) = ctx.deny(MARK_EXECUTED, OperationType::PolicyMutation) {
        return Ok(denied);
    }
    let proposal_id = match ProposalId::new(&args.proposal_id) {
        Ok(id) => id,
        Err(e) => return Ok(CommandResult::failed(MARK_EXECUTED, e.to_string())),
    };
    with_locked_session(&ctx.state_file, |session| {
        if !session.mark_executed(&proposal_id) {
            return Ok(CommandResult::failed(
                MARK_EXECUTED,
                format!("proposal not found: {proposal_id}"),
            ));
        }
        StateFile::capture(session).save(&ctx.state_file)?;

        let proof = session
            .proposal_ledger()
            .get_proposal(&proposal_id)
            .map(|p| p.to_json())
            .unwrap_or(Value::Null);
        Ok(CommandResult::new(MARK_EXECUTED, CommandStatus::Executed)
            .with("proposal_id", &proposal_id)
            .with("proof", proof))
    })
}

/// Execute `execute-ruling-proposal`.
pub fn run_execute(args: &ExecuteArgs, ctx: &Context) -> Result<CommandResult> {
    if let Some(denied) = ctx.deny(EXECUTE, OperationType::ExecuteRuling) {
        return Ok(denied);
    }
    let raw_proof = match (&args.proof, &args.proof_file) {
        (Some(inline), _) => Some(inline.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read proof file {}", path.display()))?,
        ),
        (None, None) => None,
    };
    let proof = match raw_proof.as_deref().map(serde_json::from_str::<Value>) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => {
            return Ok(CommandResult::failed(
                EXECUTE,
                "invalid proposal proof: expected JSON object",
            )
            .with("proposal_id", args.proposal_id.trim()))
        }
    };

    let request = ExecuteRequest {
        proposal_id: args.proposal_id.clone(),
        dispute_id: args.dispute_id.clone(),
        round: args.round,
        proof,
    };
    with_locked_session(&ctx.state_file, |session| match session.execute(&request)? {
        ExecutionOutcome::Executed(artifact) => {
            StateFile::capture(session).save(&ctx.state_file)?;
            Ok(CommandResult::new(EXECUTE, CommandStatus::Executed).with("audit_artifact", artifact))
        }
        ExecutionOutcome::Rejected(rejection) => Ok(CommandResult::rejected(EXECUTE, rejection)
            .with("proposal_id", args.proposal_id.trim())),
    })
}

/// Execute `verify-ruling-status`.
pub fn run_verify(args: &VerifyArgs, ctx: &Context) -> Result<CommandResult> {
    let (dispute_id, round) = match target(&args.dispute_id, args.round) {
        Ok(target) => target,
        Err(message) => return Ok(CommandResult::failed(VERIFY, message)),
    };
    let expected = match args.expected_status.as_deref().map(str::parse::<CommandStatus>) {
        None => None,
        Some(Ok(status)) => Some(status),
        Some(Err(_)) => {
            return Ok(CommandResult::failed(
                VERIFY,
                "expected_status must be a valid command status",
            ))
        }
    };

    let session = StateFile::load(&ctx.state_file)?.into_session();
    let report = session.verify(&dispute_id, round);
    let result = match expected {
        Some(expected) if expected != report.status => CommandResult::failed(
            VERIFY,
            format!("status mismatch: expected {expected}, found {}", report.status),
        ),
        _ => CommandResult::new(VERIFY, report.status),
    };
    Ok(result
        .with("dispute_id", &report.dispute_id)
        .with("round", report.round)
        .with("verified_status", report.status)
        .with("ruling_hash", &report.ruling_hash))
}

/// Execute `reconcile-ruling-status`.
pub fn run_reconcile(args: &ReconcileArgs, ctx: &Context) -> Result<CommandResult> {
    let (dispute_id, round) = match target(&args.dispute_id, args.round) {
        Ok(target) => target,
        Err(message) => return Ok(CommandResult::failed(RECONCILE, message)),
    };
    let Ok(observed) = args.target_status.parse::<CommandStatus>() else {
        return Ok(CommandResult::failed(
            RECONCILE,
            "target_status must be a valid command status",
        ));
    };

    let session = StateFile::load(&ctx.state_file)?.into_session();
    let reconciliation = session.reconcile(&dispute_id, round, observed);
    Ok(CommandResult::new(RECONCILE, reconciliation.reconciled)
        .with("dispute_id", &dispute_id)
        .with("round", round)
        .with("current_status", reconciliation.current)
        .with("target_status", reconciliation.target)
        .with("sticky", reconciliation.was_sticky()))
}

fn target(dispute_id: &str, round: i64) -> Result<(DisputeId, u32), String> {
    let dispute_id = DisputeId::new(dispute_id).map_err(|e| e.to_string())?;
    let round = parse_round(round).map_err(|e| e.to_string())?;
    Ok((dispute_id, round))
}
