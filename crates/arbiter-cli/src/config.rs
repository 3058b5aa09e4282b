//! `arbiter config`: print the effective configuration with secrets redacted.

use anyhow::Result;
use serde_json::Value;

use arbiter_core::Settings;
use arbiter_state::CommandStatus;

use crate::result::CommandResult;

const CONFIG: &str = "config";

/// Execute `config`.
pub fn run_config(settings: &Settings) -> Result<CommandResult> {
    let mut result = CommandResult::new(CONFIG, CommandStatus::Executed);
    if let Value::Object(fields) = settings.redacted() {
        result.details = fields;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_every_setting() {
        let result = run_config(&Settings::default()).unwrap();
        assert_eq!(result.details["dao_name"], "ai-arbitration-dao");
        assert_eq!(result.details["state_file"], ".arbiter/state.json");
        assert_eq!(result.exit_code(), 0);
    }
}
