//! # arbiter-cli: Command-Line Tool for the Ruling Engine
//!
//! Provides the `arbiter` binary. Each invocation loads the ledgers from
//! the JSON state file, runs one command, and writes the state back when
//! the command changed it.
//!
//! ## Subcommands
//!
//! - `arbiter create-ruling-proposal`: compile a dispute snapshot into a proposal.
//! - `arbiter mark-executed`: record governance execution of a proposal.
//! - `arbiter execute-ruling-proposal`: authorize and commit a ruling.
//! - `arbiter verify-ruling-status`: report a round's stored status.
//! - `arbiter reconcile-ruling-status`: fold an observed status into it.
//! - `arbiter submit-vote`: validate a governance vote.
//! - `arbiter bind-resolver`: check the resolver/governance binding.
//! - `arbiter config`: print the effective configuration, redacted.
//!
//! ```bash
//! arbiter create-ruling-proposal --safe <SAFE> --payout-id 1 --dispute-id d-1 --round 0 --outcome Allow
//! arbiter --key-role governance_authority mark-executed --proposal-id <ID>
//! arbiter --json execute-ruling-proposal --proposal-id <ID> --dispute-id d-1 --round 0 --proof '<JSON>'
//! ```

pub mod config;
pub mod governance;
pub mod logging;
pub mod result;
pub mod ruling;
pub mod state;

use std::path::PathBuf;

use arbiter_core::{Settings, ValidationError};
use arbiter_ruling::{authorize_operation, KeyRole, OperationType};

use crate::result::CommandResult;

/// Everything a command needs from the process: configuration, the state
/// file location, and the role of the invoking key.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub state_file: PathBuf,
    pub key_role: KeyRole,
}

impl Context {
    pub fn new(settings: Settings, state_file: Option<PathBuf>, key_role: KeyRole) -> Self {
        let state_file = state_file.unwrap_or_else(|| settings.state_file.clone());
        Self {
            settings,
            state_file,
            key_role,
        }
    }

    /// `Some(failed result)` if the invoking key may not run `operation`.
    pub fn deny(&self, command: &'static str, operation: OperationType) -> Option<CommandResult> {
        let decision = authorize_operation(self.key_role, operation);
        (!decision.is_pending()).then(|| {
            CommandResult::from_decision(command, decision)
                .with("key_role", self.key_role)
                .with("operation", operation)
        })
    }
}

/// Range-check a round supplied on the command line.
pub fn parse_round(raw: i64) -> Result<u32, ValidationError> {
    if raw < 0 {
        return Err(ValidationError::Negative("round"));
    }
    u32::try_from(raw).map_err(|_| ValidationError::OutOfRange("round"))
}
