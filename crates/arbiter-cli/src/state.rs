//! # State File
//!
//! The CLI is one process per command, so the ledgers are persisted between
//! invocations in a single JSON document:
//!
//! ```json
//! {
//!   "proposals": [ { "proposal_id": "...", "executed": false, ... } ],
//!   "rounds":    [ { "dispute_id": "d-1", "round": 0, "status": "executed", "ruling_hash": "..." } ],
//!   "drafts":    [ { "proposal_id": "...", "snapshot": { ... }, "payload": { ... } } ],
//!   "updated_at": "2026-01-01T00:00:00Z"
//! }
//! ```
//!
//! A missing file is an empty state. Writes go to a uniquely named sibling
//! temp file that is renamed into place, so readers never see a partial
//! document.
//!
//! Every command that changes state runs through [`with_locked_session`],
//! which holds an exclusive advisory lock on `<state file>.lock` from load
//! to save. Two processes executing the same round serialize on that lock,
//! and the second one loads the first one's ruling.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};

use arbiter_ruling::{
    InMemoryProposalLedger, InMemoryRoundSafetyLedger, ProposalDraft, ProposalLedger,
    ProposalProof, RoundRecord, RoundSafetyLedger, RulingSession,
};

/// The session type the CLI runs against.
pub type CliSession = RulingSession<InMemoryProposalLedger, InMemoryRoundSafetyLedger>;

/// On-disk form of a [`CliSession`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    pub proposals: Vec<ProposalProof>,
    pub rounds: Vec<RoundRecord>,
    pub drafts: Vec<ProposalDraft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StateFile {
    /// Read the state file, or an empty state if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no state file, starting empty");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state file {}", path.display()))
    }

    /// Snapshot a session.
    pub fn capture(session: &CliSession) -> Self {
        Self {
            proposals: session.proposal_ledger().proposals(),
            rounds: session.round_ledger().records(),
            drafts: session.drafts(),
            updated_at: Some(Utc::now()),
        }
    }

    /// Rebuild the session this state describes.
    pub fn into_session(self) -> CliSession {
        RulingSession::with_drafts(
            InMemoryProposalLedger::from_proposals(self.proposals),
            InMemoryRoundSafetyLedger::from_records(self.rounds),
            self.drafts,
        )
    }

    /// Write the state atomically (unique temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = state_dir(path)?;
        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .with_context(|| format!("failed to write temp file {}", tmp.path().display()))?;
        tmp.persist(path)
            .with_context(|| format!("failed to replace state file {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            proposals = self.proposals.len(),
            rounds = self.rounds.len(),
            "state saved"
        );
        Ok(())
    }
}

/// Run `f` against the session stored at `path` while holding the exclusive
/// state lock. `f` saves the state itself when it changed anything; the lock
/// is released only after `f` returns.
pub fn with_locked_session<T>(path: &Path, f: impl FnOnce(&CliSession) -> Result<T>) -> Result<T> {
    let lock_path = lock_path(path);
    state_dir(path)?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("failed to open lock file {}", lock_path.display()))?;
    let mut lock = RwLock::new(file);
    let _guard = lock
        .write()
        .with_context(|| format!("failed to lock {}", lock_path.display()))?;
    tracing::debug!(lock = %lock_path.display(), "state lock acquired");

    let session = StateFile::load(path)?.into_session();
    f(&session)
}

/// `<state file>.lock`, next to the state file.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// The directory holding the state file, created if missing.
fn state_dir(path: &Path) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create state directory {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::{sha256_raw_hex, DisputeId};
    use arbiter_ruling::{DisputeSnapshot, Outcome};
    use arbiter_state::CommandStatus;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(state, StateFile::default());
    }

    #[test]
    fn session_survives_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let session = StateFile::default().into_session();
        let snapshot = DisputeSnapshot::new("safe1", 1, "d-1", 0, Outcome::Allow).unwrap();
        let draft = session.create_proposal(snapshot, false).unwrap();
        session.mark_executed(&draft.proposal_id);
        let d1 = DisputeId::new("d-1").unwrap();
        session.round_ledger().record_ruling(&d1, 0, sha256_raw_hex(b"h1"));
        StateFile::capture(&session).save(&path).unwrap();

        let reloaded = StateFile::load(&path).unwrap().into_session();
        assert!(reloaded.proposal_ledger().get_proposal(&draft.proposal_id).unwrap().executed);
        assert_eq!(reloaded.round_ledger().get_status(&d1, 0), CommandStatus::Executed);
        assert_eq!(reloaded.draft(&draft.proposal_id), Some(draft));
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn lock_file_sits_next_to_state_file() {
        assert_eq!(
            lock_path(Path::new(".arbiter/state.json")),
            PathBuf::from(".arbiter/state.json.lock")
        );
        assert_eq!(lock_path(Path::new("state")), PathBuf::from("state.lock"));
    }

    #[test]
    fn locked_updates_from_many_threads_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let handles: Vec<_> = (0..8u32)
            .map(|round| {
                let path = path.clone();
                std::thread::spawn(move || {
                    with_locked_session(&path, |session| {
                        let d1 = DisputeId::new("d-1").unwrap();
                        session
                            .round_ledger()
                            .record_ruling(&d1, round, sha256_raw_hex(&round.to_le_bytes()));
                        StateFile::capture(session).save(&path)
                    })
                    .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(StateFile::load(&path).unwrap().rounds.len(), 8);
        assert!(lock_path(&path).exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"not json").unwrap();
        let err = StateFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse state file"));
    }
}
