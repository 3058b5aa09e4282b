//! # arbiter-state: Command Status Machine
//!
//! Every decision point in the ruling engine reports a [`CommandStatus`].
//! This crate owns the status vocabulary and the single state-transition
//! rule in the system.
//!
//! ## States
//!
//! ```text
//! Pending ──reconcile(target)──▶ Executed | AlreadyRuled | Failed | Pending
//!
//! Executed, AlreadyRuled, Failed: terminal, reconcile() returns them unchanged
//! ```
//!
//! - **Status** (`status.rs`): the closed status enum, its terminal set,
//!   and stable wire names.
//!
//! - **Reconcile** (`reconcile.rs`): folds an externally observed status
//!   into the current one, honoring terminal stickiness.

pub mod reconcile;
pub mod status;

pub use reconcile::{reconcile, Reconciliation};
pub use status::{CommandStatus, StatusParseError, TERMINAL_STATUSES};
