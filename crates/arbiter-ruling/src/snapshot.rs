//! # Dispute Snapshot
//!
//! The validated, immutable view of a disputed payout that a ruling
//! proposal is compiled from. Invariants are checked at construction in a
//! fixed order, and the first violation is reported by field name:
//!
//! 1. `safe` non-empty
//! 2. `payout_id` non-negative
//! 3. `dispute_id` non-empty
//! 4. `round` non-negative
//!
//! Raw input (CLI flags, JSON documents) goes through [`RawDisputeSnapshot`]
//! so that signed integers from the outside world are range-checked here
//! instead of being silently wrapped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use arbiter_core::{DisputeId, SafeAddress, ValidationError};

use crate::error::RulingError;

/// The ruling outcome for a disputed payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Release the payout.
    Allow,
    /// Block the payout.
    Deny,
}

impl Outcome {
    /// The exact wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }

    /// Instruction discriminant used by the safe-treasury program.
    pub fn discriminant(&self) -> u8 {
        match self {
            Self::Allow => 0,
            Self::Deny => 1,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ValidationError;

    /// Parse `Allow` or `Deny`. Surrounding whitespace is ignored; case is not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Allow" => Ok(Self::Allow),
            "Deny" => Ok(Self::Deny),
            _ => Err(ValidationError::InvalidOutcome(s.to_string())),
        }
    }
}

/// Unvalidated snapshot fields as they arrive from an external layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDisputeSnapshot {
    /// Safe (treasury vault) address.
    pub safe: String,
    /// Payout identifier within the safe.
    pub payout_id: i128,
    /// Dispute identifier.
    pub dispute_id: String,
    /// Dispute round.
    pub round: i64,
    /// Ruling outcome.
    pub outcome: Outcome,
}

/// A validated dispute snapshot. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDisputeSnapshot")]
pub struct DisputeSnapshot {
    safe: SafeAddress,
    payout_id: u64,
    dispute_id: DisputeId,
    round: u32,
    outcome: Outcome,
}

impl DisputeSnapshot {
    /// Validate raw fields into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RulingError::InvalidSnapshot`] naming the first violated
    /// field in the order `safe → payout_id → dispute_id → round`.
    pub fn new(
        safe: &str,
        payout_id: i128,
        dispute_id: &str,
        round: i64,
        outcome: Outcome,
    ) -> Result<Self, RulingError> {
        let safe = SafeAddress::new(safe).map_err(|_| invalid("safe", "safe is required"))?;

        if payout_id < 0 {
            return Err(invalid("payout_id", "payout_id must be non-negative"));
        }
        let payout_id = u64::try_from(payout_id)
            .map_err(|_| invalid("payout_id", "payout_id exceeds the 64-bit range"))?;

        let dispute_id = DisputeId::new(dispute_id)
            .map_err(|_| invalid("dispute_id", "dispute_id is required"))?;

        if round < 0 {
            return Err(invalid("round", "round must be non-negative"));
        }
        let round =
            u32::try_from(round).map_err(|_| invalid("round", "round exceeds the 32-bit range"))?;

        Ok(Self {
            safe,
            payout_id,
            dispute_id,
            round,
            outcome,
        })
    }

    /// The safe the payout belongs to.
    pub fn safe(&self) -> &SafeAddress {
        &self.safe
    }

    /// The disputed payout.
    pub fn payout_id(&self) -> u64 {
        self.payout_id
    }

    /// The dispute.
    pub fn dispute_id(&self) -> &DisputeId {
        &self.dispute_id
    }

    /// The round this ruling applies to.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// The ruling outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl TryFrom<RawDisputeSnapshot> for DisputeSnapshot {
    type Error = RulingError;

    fn try_from(raw: RawDisputeSnapshot) -> Result<Self, Self::Error> {
        Self::new(
            &raw.safe,
            raw.payout_id,
            &raw.dispute_id,
            raw.round,
            raw.outcome,
        )
    }
}

fn invalid(field: &'static str, reason: &str) -> RulingError {
    RulingError::InvalidSnapshot {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: RulingError) -> &'static str {
        match err {
            RulingError::InvalidSnapshot { field, .. } => field,
            other => panic!("expected InvalidSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn valid_snapshot_trims_identifiers() {
        let s = DisputeSnapshot::new(" safe1 ", 1, " d-1 ", 0, Outcome::Allow).unwrap();
        assert_eq!(s.safe().as_str(), "safe1");
        assert_eq!(s.dispute_id().as_str(), "d-1");
        assert_eq!(s.payout_id(), 1);
        assert_eq!(s.round(), 0);
    }

    #[test]
    fn first_violation_wins_in_fixed_order() {
        // Everything invalid: safe is reported first.
        let err = DisputeSnapshot::new("", -1, "", -1, Outcome::Deny).unwrap_err();
        assert_eq!(field_of(err), "safe");

        let err = DisputeSnapshot::new("s", -1, "", -1, Outcome::Deny).unwrap_err();
        assert_eq!(field_of(err), "payout_id");

        let err = DisputeSnapshot::new("s", 0, "  ", -1, Outcome::Deny).unwrap_err();
        assert_eq!(field_of(err), "dispute_id");

        let err = DisputeSnapshot::new("s", 0, "d", -1, Outcome::Deny).unwrap_err();
        assert_eq!(field_of(err), "round");
    }

    #[test]
    fn messages_are_stable() {
        let err = DisputeSnapshot::new("s", 0, "d", -3, Outcome::Allow).unwrap_err();
        assert_eq!(err.to_string(), "invalid snapshot: round must be non-negative");
    }

    #[test]
    fn out_of_range_values_are_rejected_not_wrapped() {
        let err = DisputeSnapshot::new("s", i128::from(u64::MAX) + 1, "d", 0, Outcome::Allow)
            .unwrap_err();
        assert_eq!(field_of(err), "payout_id");
        let err =
            DisputeSnapshot::new("s", 0, "d", i64::from(u32::MAX) + 1, Outcome::Allow).unwrap_err();
        assert_eq!(field_of(err), "round");
    }

    #[test]
    fn outcome_parse_is_exact() {
        assert_eq!(" Allow ".parse::<Outcome>().unwrap(), Outcome::Allow);
        assert_eq!("Deny".parse::<Outcome>().unwrap(), Outcome::Deny);
        assert!("allow".parse::<Outcome>().is_err());
        assert!("Maybe".parse::<Outcome>().is_err());
    }

    #[test]
    fn outcome_serializes_as_exact_strings() {
        assert_eq!(serde_json::to_string(&Outcome::Allow).unwrap(), "\"Allow\"");
        assert_eq!(serde_json::to_string(&Outcome::Deny).unwrap(), "\"Deny\"");
    }

    #[test]
    fn deserialization_validates() {
        let ok: DisputeSnapshot = serde_json::from_value(serde_json::json!({
            "safe": "safe1", "payout_id": 1, "dispute_id": "d-1", "round": 0, "outcome": "Allow"
        }))
        .unwrap();
        assert_eq!(ok.round(), 0);

        let bad: Result<DisputeSnapshot, _> = serde_json::from_value(serde_json::json!({
            "safe": "", "payout_id": 1, "dispute_id": "d-1", "round": 0, "outcome": "Allow"
        }));
        assert!(bad.is_err());

        let boolean_round: Result<DisputeSnapshot, _> = serde_json::from_value(serde_json::json!({
            "safe": "s", "payout_id": 1, "dispute_id": "d-1", "round": true, "outcome": "Allow"
        }));
        assert!(boolean_round.is_err());
    }
}
