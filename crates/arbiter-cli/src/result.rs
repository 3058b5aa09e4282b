//! # Command Results
//!
//! Every subcommand reports a `{command, status, details}` record. With
//! `--json` the record is printed as canonical JSON on one line; otherwise
//! as a `command: status` header followed by pretty-printed details.
//!
//! The process exit code is `1` iff the status is `failed`.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use arbiter_core::CanonicalBytes;
use arbiter_ruling::{Decision, Rejection};
use arbiter_state::CommandStatus;

/// Outcome of one CLI command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub command: &'static str,
    pub status: CommandStatus,
    pub details: Map<String, Value>,
}

impl CommandResult {
    pub fn new(command: &'static str, status: CommandStatus) -> Self {
        Self {
            command,
            status,
            details: Map::new(),
        }
    }

    /// A failed result carrying `error`.
    pub fn failed(command: &'static str, error: impl Into<String>) -> Self {
        let error: String = error.into();
        Self::new(command, CommandStatus::Failed).with("error", error)
    }

    /// A result from a refusal: its status plus `reason` and `kind`.
    pub fn rejected(command: &'static str, rejection: Rejection) -> Self {
        Self::new(command, rejection.kind.status())
            .with("reason", rejection.message)
            .with("kind", rejection.kind)
    }

    /// A result from a decision that may or may not be a refusal.
    pub fn from_decision(command: &'static str, decision: Decision) -> Self {
        match decision.rejection {
            Some(rejection) => Self::rejected(command, rejection),
            None => Self::new(command, decision.status),
        }
    }

    /// Add a detail. Values that fail to serialize are recorded as `null`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.details.insert(key.to_string(), value);
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == CommandStatus::Failed
    }

    pub fn exit_code(&self) -> u8 {
        u8::from(self.is_failed())
    }

    /// Render for stdout.
    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(CanonicalBytes::new(self)?.into_string());
        }
        let mut out = format!("{}: {}", self.command, self.status);
        if !self.details.is_empty() {
            out.push('\n');
            out.push_str(&serde_json::to_string_pretty(&self.details)?);
        }
        Ok(out)
    }
}
