//! # Round Safety Ledger
//!
//! Tracks, per `(dispute_id, round)`, whether a ruling has been recorded,
//! and rejects every later write to the same key.
//!
//! ## Concurrency
//!
//! [`InMemoryRoundSafetyLedger::record_ruling`] holds the DashMap shard lock
//! for the key across the "already ruled?" check and the insert, so two
//! concurrent writers racing on one key cannot both succeed. Unrelated keys
//! proceed in parallel and no ordering is implied between them.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use arbiter_core::{DisputeId, PayloadHash};
use arbiter_state::CommandStatus;

use crate::decision::{Decision, RejectionKind};

/// The stored state of one dispute round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Current status of the round.
    pub status: CommandStatus,
    /// Hash of the recorded ruling payload, once one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruling_hash: Option<PayloadHash>,
}

impl RoundState {
    fn executed(hash: PayloadHash) -> Self {
        Self {
            status: CommandStatus::Executed,
            ruling_hash: Some(hash),
        }
    }
}

/// A flattened round entry, used to persist and reload a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub dispute_id: DisputeId,
    pub round: u32,
    #[serde(flatten)]
    pub state: RoundState,
}

/// Storage contract for per-round ruling state.
pub trait RoundSafetyLedger: Send + Sync {
    /// Whether the round already carries a ruling (`Executed` or `AlreadyRuled`).
    fn has_ruling(&self, dispute_id: &DisputeId, round: u32) -> bool;

    /// Record a ruling. Returns `false` and changes nothing if the round is
    /// already ruled. Implementations must make the check and the write a
    /// single atomic step per key.
    fn record_ruling(&self, dispute_id: &DisputeId, round: u32, hash: PayloadHash) -> bool;

    /// The stored state for a round, if any.
    fn get_state(&self, dispute_id: &DisputeId, round: u32) -> Option<RoundState>;

    /// All stored rounds, ordered by `(dispute_id, round)`.
    fn records(&self) -> Vec<RoundRecord>;

    /// The round's status; `Pending` if unknown.
    fn get_status(&self, dispute_id: &DisputeId, round: u32) -> CommandStatus {
        self.get_state(dispute_id, round)
            .map(|s| s.status)
            .unwrap_or(CommandStatus::Pending)
    }
}

/// In-memory round safety ledger backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct InMemoryRoundSafetyLedger {
    rounds: DashMap<(DisputeId, u32), RoundState>,
}

impl InMemoryRoundSafetyLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted records. Later duplicates of a key
    /// replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = RoundRecord>) -> Self {
        let rounds = DashMap::new();
        for record in records {
            rounds.insert((record.dispute_id, record.round), record.state);
        }
        Self { rounds }
    }

    /// Number of tracked rounds.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Whether no round is tracked.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

impl RoundSafetyLedger for InMemoryRoundSafetyLedger {
    fn has_ruling(&self, dispute_id: &DisputeId, round: u32) -> bool {
        self.rounds
            .get(&(dispute_id.clone(), round))
            .is_some_and(|state| state.status.is_ruled())
    }

    fn record_ruling(&self, dispute_id: &DisputeId, round: u32, hash: PayloadHash) -> bool {
        let recorded = match self.rounds.entry((dispute_id.clone(), round)) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().status.is_ruled() {
                    false
                } else {
                    occupied.insert(RoundState::executed(hash));
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(RoundState::executed(hash));
                true
            }
        };
        if recorded {
            tracing::debug!(dispute_id = %dispute_id, round, "round ruling recorded");
        } else {
            tracing::debug!(dispute_id = %dispute_id, round, "round already ruled, write refused");
        }
        recorded
    }

    fn get_state(&self, dispute_id: &DisputeId, round: u32) -> Option<RoundState> {
        self.rounds
            .get(&(dispute_id.clone(), round))
            .map(|state| state.value().clone())
    }

    fn records(&self) -> Vec<RoundRecord> {
        let mut records: Vec<RoundRecord> = self
            .rounds
            .iter()
            .map(|entry| RoundRecord {
                dispute_id: entry.key().0.clone(),
                round: entry.key().1,
                state: entry.value().clone(),
            })
            .collect();
        records.sort_by(|a, b| (&a.dispute_id, a.round).cmp(&(&b.dispute_id, b.round)));
        records
    }
}

/// Pre-write round check.
///
/// An already-ruled round wins over a payload-round mismatch.
pub fn check_round_safety<R>(
    ledger: &R,
    dispute_id: &DisputeId,
    round: u32,
    payload_round: Option<u32>,
) -> Decision
where
    R: RoundSafetyLedger + ?Sized,
{
    if ledger.has_ruling(dispute_id, round) {
        return Decision::reject(
            RejectionKind::DuplicateRoundWrite,
            "duplicate round write rejected",
        );
    }
    match payload_round {
        Some(payload_round) if payload_round != round => Decision::reject(
            RejectionKind::ReplayBindingMismatch,
            format!("round mismatch: payload round {payload_round} != active round {round}"),
        ),
        _ => Decision::proceed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::sha256_raw_hex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn d(s: &str) -> DisputeId {
        DisputeId::new(s).unwrap()
    }

    #[test]
    fn second_write_is_refused_and_first_hash_kept() {
        let ledger = InMemoryRoundSafetyLedger::new();
        let h1 = sha256_raw_hex(b"h1");
        let h2 = sha256_raw_hex(b"h2");
        assert!(ledger.record_ruling(&d("d-1"), 0, h1.clone()));
        assert!(!ledger.record_ruling(&d("d-1"), 0, h2));
        assert_eq!(ledger.get_status(&d("d-1"), 0), CommandStatus::Executed);
        assert_eq!(ledger.get_state(&d("d-1"), 0).unwrap().ruling_hash, Some(h1));
    }

    #[test]
    fn unknown_round_is_pending() {
        let ledger = InMemoryRoundSafetyLedger::new();
        assert_eq!(ledger.get_status(&d("d-1"), 7), CommandStatus::Pending);
        assert!(!ledger.has_ruling(&d("d-1"), 7));
    }

    #[test]
    fn rounds_are_independent() {
        let ledger = InMemoryRoundSafetyLedger::new();
        assert!(ledger.record_ruling(&d("d-1"), 0, sha256_raw_hex(b"a")));
        assert!(ledger.record_ruling(&d("d-1"), 1, sha256_raw_hex(b"b")));
        assert!(ledger.record_ruling(&d("d-2"), 0, sha256_raw_hex(b"c")));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn failed_round_state_may_be_overwritten() {
        let ledger = InMemoryRoundSafetyLedger::from_records([RoundRecord {
            dispute_id: d("d-1"),
            round: 0,
            state: RoundState {
                status: CommandStatus::Failed,
                ruling_hash: None,
            },
        }]);
        assert!(!ledger.has_ruling(&d("d-1"), 0));
        assert!(ledger.record_ruling(&d("d-1"), 0, sha256_raw_hex(b"h1")));
        assert_eq!(ledger.get_status(&d("d-1"), 0), CommandStatus::Executed);
    }

    #[test]
    fn already_ruled_state_blocks_writes() {
        let ledger = InMemoryRoundSafetyLedger::from_records([RoundRecord {
            dispute_id: d("d-1"),
            round: 0,
            state: RoundState {
                status: CommandStatus::AlreadyRuled,
                ruling_hash: None,
            },
        }]);
        assert!(ledger.has_ruling(&d("d-1"), 0));
        assert!(!ledger.record_ruling(&d("d-1"), 0, sha256_raw_hex(b"h1")));
    }

    #[test]
    fn check_reports_duplicate_before_mismatch() {
        let ledger = InMemoryRoundSafetyLedger::new();
        ledger.record_ruling(&d("d-1"), 0, sha256_raw_hex(b"h1"));
        let decision = check_round_safety(&ledger, &d("d-1"), 0, Some(5));
        assert_eq!(decision.status, CommandStatus::AlreadyRuled);
        assert_eq!(decision.message(), Some("duplicate round write rejected"));
    }

    #[test]
    fn check_reports_payload_round_mismatch() {
        let ledger = InMemoryRoundSafetyLedger::new();
        let decision = check_round_safety(&ledger, &d("d-1"), 0, Some(1));
        assert_eq!(decision.status, CommandStatus::Failed);
        assert!(decision.message().unwrap().starts_with("round mismatch"));
        assert!(check_round_safety(&ledger, &d("d-1"), 0, Some(0)).is_pending());
        assert!(check_round_safety(&ledger, &d("d-1"), 0, None).is_pending());
    }

    #[test]
    fn records_are_sorted_and_reload() {
        let ledger = InMemoryRoundSafetyLedger::new();
        ledger.record_ruling(&d("d-2"), 0, sha256_raw_hex(b"x"));
        ledger.record_ruling(&d("d-1"), 3, sha256_raw_hex(b"y"));
        ledger.record_ruling(&d("d-1"), 1, sha256_raw_hex(b"z"));
        let records = ledger.records();
        let keys: Vec<(String, u32)> = records
            .iter()
            .map(|r| (r.dispute_id.to_string(), r.round))
            .collect();
        assert_eq!(
            keys,
            vec![("d-1".into(), 1), ("d-1".into(), 3), ("d-2".into(), 0)]
        );
        let reloaded = InMemoryRoundSafetyLedger::from_records(records.clone());
        assert_eq!(reloaded.records(), records);
    }

    #[test]
    fn concurrent_writers_on_one_key_succeed_once() {
        let ledger = Arc::new(InMemoryRoundSafetyLedger::new());
        let wins = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                let wins = Arc::clone(&wins);
                std::thread::spawn(move || {
                    let hash = sha256_raw_hex(format!("h{i}").as_bytes());
                    if ledger.record_ruling(&d("d-1"), 0, hash) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.get_status(&d("d-1"), 0), CommandStatus::Executed);
    }
}
