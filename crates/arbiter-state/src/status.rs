//! # Command Status
//!
//! The closed set of outcomes a ruling command can report. `Pending` is the
//! only non-terminal status; once a round reaches `Executed`,
//! `AlreadyRuled`, or `Failed` it stays there.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a ruling command or decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// Accepted so far; a later step decides the final outcome.
    Pending,
    /// The ruling was recorded (terminal).
    Executed,
    /// The round already carries a ruling (terminal).
    AlreadyRuled,
    /// The command was rejected (terminal).
    Failed,
}

/// Statuses that reconciliation never overwrites.
pub const TERMINAL_STATUSES: [CommandStatus; 3] = [
    CommandStatus::Executed,
    CommandStatus::AlreadyRuled,
    CommandStatus::Failed,
];

impl CommandStatus {
    /// All statuses, in declaration order.
    pub fn all() -> &'static [CommandStatus] {
        &[
            Self::Pending,
            Self::Executed,
            Self::AlreadyRuled,
            Self::Failed,
        ]
    }

    /// The stable wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executed => "executed",
            Self::AlreadyRuled => "already_ruled",
            Self::Failed => "failed",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether this status means the round carries a recorded ruling.
    ///
    /// `Failed` is terminal for a command but does not occupy the round.
    pub fn is_ruled(&self) -> bool {
        matches!(self, Self::Executed | Self::AlreadyRuled)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the closed set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status {0:?}: must be one of pending, executed, already_ruled, failed")]
pub struct StatusParseError(pub String);

impl FromStr for CommandStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_set_excludes_only_pending() {
        for status in CommandStatus::all() {
            assert_eq!(status.is_terminal(), TERMINAL_STATUSES.contains(status));
        }
        assert!(!CommandStatus::Pending.is_terminal());
    }

    #[test]
    fn failed_is_terminal_but_not_ruled() {
        assert!(CommandStatus::Failed.is_terminal());
        assert!(!CommandStatus::Failed.is_ruled());
        assert!(CommandStatus::Executed.is_ruled());
        assert!(CommandStatus::AlreadyRuled.is_ruled());
    }

    #[test]
    fn wire_names_parse_back() {
        for status in CommandStatus::all() {
            assert_eq!(status.as_str().parse::<CommandStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&CommandStatus::AlreadyRuled).unwrap();
        assert_eq!(json, "\"already_ruled\"");
        let back: CommandStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(back, CommandStatus::Failed);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "EXECUTED".parse::<CommandStatus>().unwrap_err();
        assert!(err.to_string().contains("EXECUTED"));
    }
}
