//! # Configuration
//!
//! `Settings` is constructed once at process start and passed by reference
//! to every component that needs it. Sources, lowest precedence first:
//!
//! 1. Built-in defaults.
//! 2. An optional YAML file.
//! 3. `ARBITER_<FIELD>` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ARBITER_";

/// Placeholder written over sensitive values by [`redact_sensitive`].
pub const REDACTED: &str = "***REDACTED***";

const SENSITIVE_KEYS: &[&str] = &["secret", "token", "private_key", "api_key", "password", "mnemonic"];

/// Immutable process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Deployment environment label (`dev`, `staging`, `prod`).
    pub app_env: String,
    /// Default log level when neither `-v` nor `RUST_LOG` is given.
    pub log_level: String,
    /// Human-readable DAO name, echoed in command results.
    pub dao_name: String,
    /// Ledger RPC endpoint handed to adapters.
    pub rpc_url: String,
    /// Governance program the resolver must be bound to.
    pub governance_program_id: String,
    /// Safe-treasury program that receives record-ruling instructions.
    pub safe_treasury_program_id: String,
    /// JSON file holding the proposal and round ledgers between invocations.
    pub state_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_env: "dev".to_string(),
            log_level: "info".to_string(),
            dao_name: "ai-arbitration-dao".to_string(),
            rpc_url: "http://127.0.0.1:8899".to_string(),
            governance_program_id: "GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw".to_string(),
            safe_treasury_program_id: "SafeTreasury1111111111111111111111111111111".to_string(),
            state_file: PathBuf::from(".arbiter/state.json"),
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file, then apply environment
    /// overrides from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a YAML file. Missing fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply `ARBITER_<FIELD>` overrides using the given lookup.
    ///
    /// The lookup is injected so tests do not touch the process environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_fields: [(&str, &mut String); 6] = [
            ("APP_ENV", &mut self.app_env),
            ("LOG_LEVEL", &mut self.log_level),
            ("DAO_NAME", &mut self.dao_name),
            ("RPC_URL", &mut self.rpc_url),
            ("GOVERNANCE_PROGRAM_ID", &mut self.governance_program_id),
            ("SAFE_TREASURY_PROGRAM_ID", &mut self.safe_treasury_program_id),
        ];
        for (suffix, slot) in string_fields {
            let var = format!("{ENV_PREFIX}{suffix}");
            if let Some(value) = lookup(&var) {
                let value = value.trim();
                if value.is_empty() {
                    return Err(ConfigError::InvalidEnv {
                        var,
                        reason: "value must not be empty".to_string(),
                    });
                }
                *slot = value.to_string();
            }
        }
        let var = format!("{ENV_PREFIX}STATE_FILE");
        if let Some(value) = lookup(&var) {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var,
                    reason: "value must not be empty".to_string(),
                });
            }
            self.state_file = PathBuf::from(value.trim());
        }
        Ok(self)
    }

    /// The settings as a JSON value with sensitive keys redacted.
    pub fn redacted(&self) -> Value {
        redact_sensitive(serde_json::to_value(self).unwrap_or(Value::Null))
    }
}

/// Replace the values of sensitive-looking keys with [`REDACTED`],
/// recursively.
pub fn redact_sensitive(data: Value) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if is_sensitive_key(&key) {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, redact_sensitive(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_sensitive).collect()),
        other => other,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|s| normalized.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_stable() {
        let s = Settings::default();
        assert_eq!(s.app_env, "dev");
        assert_eq!(s.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(s.state_file, PathBuf::from(".arbiter/state.json"));
    }

    #[test]
    fn yaml_file_overrides_defaults_and_keeps_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbiter.yaml");
        std::fs::write(&path, "app_env: prod\ndao_name: test-dao\n").unwrap();
        let s = Settings::from_yaml_file(&path).unwrap();
        assert_eq!(s.app_env, "prod");
        assert_eq!(s.dao_name, "test-dao");
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn unknown_yaml_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbiter.yaml");
        std::fs::write(&path, "solana_rpc: x\n").unwrap();
        assert!(matches!(
            Settings::from_yaml_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::from_yaml_file(Path::new("/nonexistent/arbiter.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("ARBITER_RPC_URL", "http://rpc.example:8899"),
            ("ARBITER_STATE_FILE", "/tmp/arbiter.json"),
        ]
        .into_iter()
        .collect();
        let s = Settings::default()
            .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(s.rpc_url, "http://rpc.example:8899");
        assert_eq!(s.state_file, PathBuf::from("/tmp/arbiter.json"));
        assert_eq!(s.app_env, "dev");
    }

    #[test]
    fn empty_env_override_is_rejected() {
        let err = Settings::default()
            .with_env_overrides(|k| (k == "ARBITER_DAO_NAME").then(|| "  ".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("ARBITER_DAO_NAME"));
    }

    #[test]
    fn redaction_is_recursive_and_case_insensitive() {
        let data = serde_json::json!({
            "API_KEY": "abc",
            "nested": {"db_password": "pw", "safe": "ok"},
            "list": [{"session_token": "t"}]
        });
        let redacted = redact_sensitive(data);
        assert_eq!(redacted["API_KEY"], REDACTED);
        assert_eq!(redacted["nested"]["db_password"], REDACTED);
        assert_eq!(redacted["nested"]["safe"], "ok");
        assert_eq!(redacted["list"][0]["session_token"], REDACTED);
    }
}
