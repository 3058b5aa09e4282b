//! # Ruling Error Types
//!
//! Errors that abort an operation outright. Authorization and round-safety
//! rejections are not errors: they are reported as a
//! [`Decision`](crate::decision::Decision) carrying a status and a stable
//! message, because every one of them is recoverable by the caller.

use arbiter_core::{CanonicalizationError, ValidationError};
use thiserror::Error;

/// Errors arising from ruling-engine operations.
#[derive(Error, Debug)]
pub enum RulingError {
    /// A dispute snapshot violated an invariant. `field` names the first
    /// violated field in the fixed check order
    /// `safe → payout_id → dispute_id → round`.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot {
        /// The violated field.
        field: &'static str,
        /// Human-readable reason, e.g. "round must be non-negative".
        reason: String,
    },

    /// An input field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The payload could not be canonicalized. Indicates a programming error:
    /// validated snapshots contain no values the canonicalizer rejects.
    #[error("internal invariant violated: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A record-ruling instruction could not be encoded.
    #[error("instruction encoding failed: {0}")]
    Encoding(String),
}

impl RulingError {
    /// Whether this error is a programming-error class rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Canonicalization(_))
    }
}
