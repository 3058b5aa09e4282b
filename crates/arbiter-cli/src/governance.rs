//! # Governance Subcommands
//!
//! Vote submission and resolver binding. Votes are validated and passed
//! through; nothing is tallied here.

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};

use arbiter_core::Base58AddressValidator;
use arbiter_ruling::{prepare_vote, OperationType, RejectionKind, ResolverBinding};
use arbiter_state::CommandStatus;

use crate::result::CommandResult;
use crate::Context;

const SUBMIT_VOTE: &str = "submit-vote";
const BIND_RESOLVER: &str = "bind-resolver";

/// Arguments for `arbiter submit-vote`.
#[derive(Args, Debug)]
pub struct SubmitVoteArgs {
    #[arg(long)]
    pub proposal_id: String,
    /// Voter public key.
    #[arg(long)]
    pub voter: String,
    /// `true`/`false` (also `yes`/`no`, `1`/`0`).
    #[arg(long, default_value = "true", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub approve: bool,
}

/// Arguments for `arbiter bind-resolver`.
#[derive(Args, Debug)]
pub struct BindResolverArgs {
    /// Governance address; defaults to the configured governance program.
    #[arg(long)]
    pub governance_address: Option<String>,
    /// Resolver address recorded on the safe.
    #[arg(long)]
    pub resolver_address: String,
}

/// Execute `submit-vote`.
pub fn run_submit_vote(args: &SubmitVoteArgs, ctx: &Context) -> Result<CommandResult> {
    if let Some(denied) = ctx.deny(SUBMIT_VOTE, OperationType::Vote) {
        return Ok(denied);
    }
    match prepare_vote(&Base58AddressValidator, &args.proposal_id, &args.voter, args.approve) {
        Ok(vote) => {
            tracing::info!(proposal_id = %vote.proposal_id, voter = %vote.voter, "vote accepted");
            Ok(CommandResult::new(SUBMIT_VOTE, CommandStatus::Pending)
                .with("proposal_id", &vote.proposal_id)
                .with("voter", &vote.voter)
                .with("vote", vote.vote))
        }
        Err(e) => Ok(CommandResult::failed(SUBMIT_VOTE, e.to_string())),
    }
}

/// Execute `bind-resolver`.
pub fn run_bind_resolver(args: &BindResolverArgs, ctx: &Context) -> Result<CommandResult> {
    if let Some(denied) = ctx.deny(BIND_RESOLVER, OperationType::PolicyMutation) {
        return Ok(denied);
    }
    let governance = args
        .governance_address
        .as_deref()
        .unwrap_or(&ctx.settings.governance_program_id);
    let binding = match ResolverBinding::new(&Base58AddressValidator, governance, &args.resolver_address) {
        Ok(binding) => binding,
        Err(e) => return Ok(CommandResult::failed(BIND_RESOLVER, e.to_string())),
    };
    if !binding.is_bound() {
        tracing::warn!(
            governance = %binding.governance_address,
            resolver = %binding.resolver_address,
            "resolver not bound to governance"
        );
        return Ok(CommandResult::failed(BIND_RESOLVER, "resolver mismatch")
            .with("kind", RejectionKind::ResolverMismatch)
            .with("expected_governance_address", &binding.governance_address)
            .with("actual_resolver_address", &binding.resolver_address));
    }
    Ok(CommandResult::new(BIND_RESOLVER, CommandStatus::Executed)
        .with("governance_address", &binding.governance_address)
        .with("resolver_address", &binding.resolver_address)
        .with("verified", true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::Settings;
    use arbiter_ruling::KeyRole;

    const GOV: &str = "GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw";
    const OTHER: &str = "SafeTreasury1111111111111111111111111111111";

    fn ctx(role: KeyRole) -> Context {
        Context::new(Settings::default(), None, role)
    }

    #[test]
    fn vote_is_passed_through_as_pending() {
        let args = SubmitVoteArgs {
            proposal_id: "p1".into(),
            voter: GOV.into(),
            approve: false,
        };
        let result = run_submit_vote(&args, &ctx(KeyRole::Operator)).unwrap();
        assert_eq!(result.status, CommandStatus::Pending);
        assert_eq!(result.details["vote"], "deny");
    }

    #[test]
    fn vote_with_bad_voter_fails() {
        let args = SubmitVoteArgs {
            proposal_id: "p1".into(),
            voter: "0xdeadbeef".into(),
            approve: true,
        };
        let result = run_submit_vote(&args, &ctx(KeyRole::Operator)).unwrap();
        assert_eq!(result.details["error"], "voter must be a valid public key");
    }

    #[test]
    fn resolver_defaults_to_configured_governance() {
        let args = BindResolverArgs {
            governance_address: None,
            resolver_address: GOV.into(),
        };
        let result = run_bind_resolver(&args, &ctx(KeyRole::GovernanceAuthority)).unwrap();
        assert_eq!(result.status, CommandStatus::Executed);
        assert_eq!(result.details["verified"], true);
    }

    #[test]
    fn resolver_mismatch_fails() {
        let args = BindResolverArgs {
            governance_address: Some(GOV.into()),
            resolver_address: OTHER.into(),
        };
        let result = run_bind_resolver(&args, &ctx(KeyRole::GovernanceAuthority)).unwrap();
        assert_eq!(result.status, CommandStatus::Failed);
        assert_eq!(result.details["error"], "resolver mismatch");
        assert_eq!(result.details["actual_resolver_address"], OTHER);
    }

    #[test]
    fn operator_cannot_bind_resolver() {
        let args = BindResolverArgs {
            governance_address: None,
            resolver_address: GOV.into(),
        };
        let result = run_bind_resolver(&args, &ctx(KeyRole::Operator)).unwrap();
        assert_eq!(result.status, CommandStatus::Failed);
    }
}
