//! # arbiter-ruling: Ruling Authorization and Replay Protection
//!
//! Records arbitration rulings for `(dispute_id, round)` pairs with three
//! guarantees: a ruling is committed at most once per round, only when
//! backed by an executed governance proposal bound to that exact round, and
//! every committed ruling carries a reproducible payload hash.
//!
//! ## Pipeline
//!
//! ```text
//! DisputeSnapshot ─compile─▶ RulingPayload ─▶ proposal (ledger, not executed)
//!                                                  │ governance executes
//! proof (JSON) ─parse─▶ ProposalProof ─authorize─▶ round safety ─▶ AuditArtifact
//! ```
//!
//! - **Snapshot** (`snapshot.rs`): validated dispute view and [`Outcome`].
//! - **Payload** (`payload.rs`): canonical JSON and SHA-256 hash.
//! - **Proof** (`proof.rs`): strict parser for untyped proof objects.
//! - **Ledger** (`ledger.rs`): proposal fact store behind a trait.
//! - **Authorization** (`authorization.rs`): ordered binding checks.
//! - **Round safety** (`round_safety.rs`): atomic at-most-once writes.
//! - **Audit** (`audit.rs`): the terminal success record.
//! - **Session** (`session.rs`): create, execute, verify, reconcile.
//!
//! Governance, treasury, and operator-key modules are deterministic stubs
//! for the external programs the engine talks to.
//!
//! ## Error Model
//!
//! Refusals are [`Decision`] values with a stable [`RejectionKind`] and
//! message. [`RulingError`] is reserved for invalid snapshots and internal
//! invariant violations.

pub mod audit;
pub mod authorization;
pub mod decision;
pub mod error;
pub mod governance;
pub mod ledger;
pub mod operator;
pub mod payload;
pub mod proof;
pub mod round_safety;
pub mod session;
pub mod snapshot;
pub mod treasury;

pub use audit::{stub_tx_signature, AuditArtifact};
pub use authorization::authorize;
pub use decision::{Decision, Rejection, RejectionKind};
pub use error::RulingError;
pub use governance::{prepare_vote, GovernanceAdapter, ProposalIntent, ResolverBinding, Vote, VoteChoice};
pub use ledger::{InMemoryProposalLedger, ProposalLedger};
pub use operator::{authorize_operation, KeyRole, OperationType};
pub use payload::{compile, RulingPayload};
pub use proof::{ProposalProof, EXECUTED_GOVERNANCE_PROOF_TYPE};
pub use round_safety::{
    check_round_safety, InMemoryRoundSafetyLedger, RoundRecord, RoundSafetyLedger, RoundState,
};
pub use session::{ExecuteRequest, ExecutionOutcome, ProposalDraft, RoundReport, RulingSession};
pub use snapshot::{DisputeSnapshot, Outcome, RawDisputeSnapshot};
pub use treasury::{RecordRulingPayload, SafeTreasuryAdapter};
