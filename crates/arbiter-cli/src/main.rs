//! # arbiter CLI entry point
//!
//! Parses command-line arguments, builds the configuration once, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use arbiter_cli::config::run_config;
use arbiter_cli::governance::{run_bind_resolver, run_submit_vote, BindResolverArgs, SubmitVoteArgs};
use arbiter_cli::logging::{self, LogFormat};
use arbiter_cli::ruling::{
    run_create, run_execute, run_mark_executed, run_reconcile, run_verify, CreateProposalArgs,
    ExecuteArgs, MarkExecutedArgs, ReconcileArgs, VerifyArgs,
};
use arbiter_cli::Context;
use arbiter_core::Settings;
use arbiter_ruling::KeyRole;

/// Arbitration ruling engine CLI.
///
/// Creates ruling proposals, records governance execution, and writes
/// rulings at most once per dispute round, keeping its ledgers in a JSON
/// state file.
#[derive(Parser, Debug)]
#[command(name = "arbiter", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// State file; overrides the configured `state_file`.
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// Print the command result as canonical JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Role of the invoking key (`operator` or `governance_authority`).
    #[arg(long, env = "ARBITER_KEY_ROLE", default_value = "operator", global = true)]
    key_role: KeyRole,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a dispute snapshot into a ruling proposal.
    CreateRulingProposal(CreateProposalArgs),

    /// Record that governance executed a proposal.
    MarkExecuted(MarkExecutedArgs),

    /// Authorize and commit a ruling with an executed-proposal proof.
    ExecuteRulingProposal(ExecuteArgs),

    /// Report the stored status of a dispute round.
    VerifyRulingStatus(VerifyArgs),

    /// Fold an observed status into a dispute round's status.
    ReconcileRulingStatus(ReconcileArgs),

    /// Validate a governance vote.
    SubmitVote(SubmitVoteArgs),

    /// Check that a resolver is bound to the governance address.
    BindResolver(BindResolverArgs),

    /// Print the effective configuration with secrets redacted.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref());
    let configured_level = settings
        .as_ref()
        .map(|s| s.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    logging::init(cli.verbose, &configured_level, cli.log_format);

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(app_env = %settings.app_env, dao = %settings.dao_name, "configuration loaded");

    let ctx = Context::new(settings, cli.state_file, cli.key_role);
    let result = match &cli.command {
        Commands::CreateRulingProposal(args) => run_create(args, &ctx),
        Commands::MarkExecuted(args) => run_mark_executed(args, &ctx),
        Commands::ExecuteRulingProposal(args) => run_execute(args, &ctx),
        Commands::VerifyRulingStatus(args) => run_verify(args, &ctx),
        Commands::ReconcileRulingStatus(args) => run_reconcile(args, &ctx),
        Commands::SubmitVote(args) => run_submit_vote(args, &ctx),
        Commands::BindResolver(args) => run_bind_resolver(args, &ctx),
        Commands::Config => run_config(&ctx.settings),
    };

    match result.and_then(|r| Ok((r.render(cli.json)?, r.exit_code()))) {
        Ok((rendered, code)) => {
            println!("{rendered}");
            ExitCode::from(code)
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
