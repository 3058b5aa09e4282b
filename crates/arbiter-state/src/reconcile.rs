//! # Status Reconciliation
//!
//! The only state-transition rule in the engine. A reconciliation request
//! carries a target status observed elsewhere (a verifier, an agent
//! runtime, a ledger watcher). Terminal statuses are sticky: once a round
//! is `Executed`, a late `Pending` observation cannot move it back.

use serde::{Deserialize, Serialize};

use crate::status::CommandStatus;

/// Fold `target` into `current`.
///
/// Total over all pairs: returns `current` when it is terminal, `target`
/// otherwise.
pub fn reconcile(current: CommandStatus, target: CommandStatus) -> CommandStatus {
    if current.is_terminal() {
        current
    } else {
        target
    }
}

/// Record of one reconciliation, suitable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Status before reconciliation.
    pub current: CommandStatus,
    /// Status the caller asked for.
    pub target: CommandStatus,
    /// Status after reconciliation.
    pub reconciled: CommandStatus,
}

impl Reconciliation {
    /// Reconcile and keep both inputs for the report.
    pub fn apply(current: CommandStatus, target: CommandStatus) -> Self {
        Self {
            current,
            target,
            reconciled: reconcile(current, target),
        }
    }

    /// Whether the target was ignored because `current` is terminal.
    pub fn was_sticky(&self) -> bool {
        self.current.is_terminal() && self.target != self.current
    }
}
