//! # Safe-Treasury Record-Ruling Instruction
//!
//! Binary encoding of the `record_ruling` instruction understood by the
//! safe-treasury program, and a side-effect-free adapter that builds it from
//! a dispute snapshot.
//!
//! Layout (11 bytes, little-endian):
//!
//! ```text
//! offset  size  field
//! 0       8     payout_id  (u64)
//! 8       1     round      (u8)
//! 9       1     outcome    (0 = Allow, 1 = Deny)
//! 10      1     is_final   (0 | 1)
//! ```

use serde::{Deserialize, Serialize};

use arbiter_core::{sha256_raw_hex, PayloadHash};

use crate::error::RulingError;
use crate::snapshot::{DisputeSnapshot, Outcome};

/// Encoded instruction length in bytes.
pub const RECORD_RULING_LEN: usize = 11;

/// Arguments of the `record_ruling` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRulingPayload {
    pub payout_id: u64,
    pub round: u8,
    pub outcome: Outcome,
    pub is_final: bool,
}

impl RecordRulingPayload {
    /// Instruction data bytes.
    pub fn to_bytes(&self) -> [u8; RECORD_RULING_LEN] {
        let mut out = [0u8; RECORD_RULING_LEN];
        out[..8].copy_from_slice(&self.payout_id.to_le_bytes());
        out[8] = self.round;
        out[9] = self.outcome.discriminant();
        out[10] = u8::from(self.is_final);
        out
    }

    /// SHA-256 of the instruction bytes.
    pub fn payload_hash(&self) -> PayloadHash {
        sha256_raw_hex(&self.to_bytes())
    }
}

/// Builds record-ruling instructions for one safe-treasury program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTreasuryAdapter {
    program_id: String,
}

impl SafeTreasuryAdapter {
    pub fn new(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
        }
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    /// Build the instruction for a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RulingError::Encoding`] if the round does not fit the
    /// single instruction byte.
    pub fn record_ruling(
        &self,
        snapshot: &DisputeSnapshot,
        is_final: bool,
    ) -> Result<RecordRulingPayload, RulingError> {
        let round = u8::try_from(snapshot.round()).map_err(|_| {
            RulingError::Encoding(format!(
                "round {} exceeds the record_ruling instruction range (0..=255)",
                snapshot.round()
            ))
        })?;
        Ok(RecordRulingPayload {
            payout_id: snapshot.payout_id(),
            round,
            outcome: snapshot.outcome(),
            is_final,
        })
    }
}
