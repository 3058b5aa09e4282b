//! # Ruling Payload Compiler
//!
//! Turns a validated [`DisputeSnapshot`] into the deterministic serialized
//! payload that a governance proposal carries, plus its SHA-256 hash.
//!
//! The hash is computed over the exact `serialized` bytes, so anyone holding
//! the payload can recompute it without re-deriving the structure. Compiling
//! is pure: no I/O, no clock, no randomness.

use serde::{Deserialize, Serialize};

use arbiter_core::{sha256_digest, sha256_raw_hex, CanonicalBytes, PayloadHash};

use crate::error::RulingError;
use crate::snapshot::{DisputeSnapshot, Outcome};

/// Number of payload-hash hex characters used for a proposal id.
pub const PROPOSAL_ID_HEX_LEN: usize = 24;

/// A compiled ruling payload. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulingPayload {
    /// Canonical JSON: sorted keys, no insignificant whitespace.
    pub serialized: String,
    /// SHA-256 of `serialized`, hex-encoded.
    pub payload_hash: PayloadHash,
    /// Whether this ruling closes the dispute.
    pub is_final: bool,
}

impl RulingPayload {
    /// Recompute the hash from `serialized` and compare.
    pub fn verify(&self) -> bool {
        sha256_raw_hex(self.serialized.as_bytes()) == self.payload_hash
    }

    /// Derive the proposal id for this payload: the first
    /// [`PROPOSAL_ID_HEX_LEN`] hex characters of the payload hash.
    pub fn proposal_id(&self) -> String {
        self.payload_hash.prefix(PROPOSAL_ID_HEX_LEN).to_string()
    }
}

#[derive(Serialize)]
struct CanonicalRuling<'a> {
    safe: &'a str,
    payout_id: u64,
    dispute_id: &'a str,
    round: u32,
    outcome: Outcome,
    is_final: bool,
}

/// Compile a snapshot into its canonical payload.
///
/// # Errors
///
/// Returns [`RulingError::Canonicalization`] only on an internal invariant
/// violation; a validated snapshot always canonicalizes.
pub fn compile(snapshot: &DisputeSnapshot, is_final: bool) -> Result<RulingPayload, RulingError> {
    let record = CanonicalRuling {
        safe: snapshot.safe().as_str(),
        payout_id: snapshot.payout_id(),
        dispute_id: snapshot.dispute_id().as_str(),
        round: snapshot.round(),
        outcome: snapshot.outcome(),
        is_final,
    };
    let canonical = CanonicalBytes::new(&record)?;
    let payload_hash = sha256_digest(&canonical);
    Ok(RulingPayload {
        serialized: canonical.into_string(),
        payload_hash,
        is_final,
    })
}
