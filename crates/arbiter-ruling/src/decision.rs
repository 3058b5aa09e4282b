//! # Decisions and Rejections
//!
//! Every decision point in the engine returns a [`Decision`]: a
//! [`CommandStatus`] plus, when the answer is no, a [`Rejection`] with a
//! stable kind and a human-readable message. Rejections are recoverable by
//! the caller and are never raised as errors or panics.

use std::fmt;

use serde::{Deserialize, Serialize};

use arbiter_state::CommandStatus;

/// Why a ruling write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// The target dispute id or round is malformed.
    InvalidTarget,
    /// No proof was supplied.
    ProofMissing,
    /// The proof object failed structural parsing.
    ProofMalformed,
    /// The proof is not an executed-governance-proposal proof.
    ProofTypeMismatch,
    /// The submitted proof itself does not claim execution.
    ProofNotExecuted,
    /// The ledger's authoritative record is not executed.
    LedgerNotExecuted,
    /// The ledger has no record of the proposal.
    ProposalNotFound,
    /// The proof lacks its dispute or round binding.
    ReplayBindingMissing,
    /// The proof is bound to a different dispute or round.
    ReplayBindingMismatch,
    /// The round already carries a ruling.
    DuplicateRoundWrite,
    /// The proof names a different proposal than the command.
    ProofMismatch,
    /// The ruling outcome is missing, malformed, or contradicts the proposal.
    InvalidOutcome,
    /// The signing key's role may not perform the operation.
    OperationNotPermitted,
    /// The resolver is not bound to the governance address.
    ResolverMismatch,
}

impl RejectionKind {
    /// The status reported for this kind of rejection.
    pub fn status(&self) -> CommandStatus {
        match self {
            Self::DuplicateRoundWrite => CommandStatus::AlreadyRuled,
            _ => CommandStatus::Failed,
        }
    }
}

/// A refused decision with its stable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Rejection category.
    pub kind: RejectionKind,
    /// Human-readable message with a stable prefix.
    pub message: String,
}

impl Rejection {
    /// Build a rejection.
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The result of a decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Reported status.
    pub status: CommandStatus,
    /// Present whenever the decision is a refusal.
    pub rejection: Option<Rejection>,
}

impl Decision {
    /// A non-refusal with the given status.
    pub fn proceed() -> Self {
        Self {
            status: CommandStatus::Pending,
            rejection: None,
        }
    }

    /// A refusal; the status follows from the kind.
    pub fn reject(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            status: kind.status(),
            rejection: Some(Rejection::new(kind, message)),
        }
    }

    /// Whether the decision allows the flow to continue.
    pub fn is_pending(&self) -> bool {
        self.status == CommandStatus::Pending
    }

    /// The rejection message, if any.
    pub fn message(&self) -> Option<&str> {
        self.rejection.as_ref().map(|r| r.message.as_str())
    }

    /// The rejection kind, if any.
    pub fn kind(&self) -> Option<RejectionKind> {
        self.rejection.as_ref().map(|r| r.kind)
    }

    /// Split into the `(status, message)` pair reported to callers.
    pub fn into_parts(self) -> (CommandStatus, Option<String>) {
        (self.status, self.rejection.map(|r| r.message))
    }
}
