//! # Outcome of running one custom command in one cycle.
//!
//! Every outcome becomes exactly one [`StatusBlock`]:
//!
//! ```text
//! stdout parses as a block object ─► Block(block)                ─► block as-is
//! any other stdout                 ─► Text(text)                 ─► customCmd/<program>: text
//! deadline exceeded                ─► TimedOut                   ─► customCmd/<program>: "Timed out."
//! spawn / exit / i/o failure       ─► Failed(CommandError)       ─► customCmd/<program>: "Error: ..." (urgent)
//! ```

use crate::commands::CommandSpec;
use crate::error::CommandError;
use crate::protocol::StatusBlock;

/// Text shown in place of a command that missed its deadline.
pub const TIMED_OUT_TEXT: &str = "Timed out.";

/// Result of one command execution.
#[derive(Debug)]
pub enum CommandResult {
    /// The command printed an i3bar block object.
    Block(StatusBlock),
    /// The command printed plain text (already trimmed).
    Text(String),
    /// The command did not finish before its deadline.
    TimedOut,
    /// The command could not run or exited unsuccessfully.
    Failed(CommandError),
}

impl CommandResult {
    /// Classifies trimmed standard output.
    pub fn from_output(stdout: String) -> Self {
        match serde_json::from_str::<StatusBlock>(&stdout) {
            Ok(block) => CommandResult::Block(block),
            Err(_) => CommandResult::Text(stdout),
        }
    }

    /// Classifies a runner error, keeping timeouts out of the failure path.
    pub fn from_error(err: CommandError) -> Self {
        if err.is_timeout() {
            CommandResult::TimedOut
        } else {
            CommandResult::Failed(err)
        }
    }

    /// Returns the error, if this result is a failure.
    pub fn error(&self) -> Option<&CommandError> {
        match self {
            CommandResult::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Converts the result into the block displayed for `spec`.
    pub fn into_block(self, spec: &CommandSpec) -> StatusBlock {
        match self {
            CommandResult::Block(block) => block,
            CommandResult::Text(text) => StatusBlock::custom(spec.program(), text),
            CommandResult::TimedOut => StatusBlock::custom(spec.program(), TIMED_OUT_TEXT),
            CommandResult::Failed(err) => {
                StatusBlock::custom(spec.program(), format!("Error: {err}")).with_urgent(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn spec() -> CommandSpec {
        CommandSpec::parse(0, "weather --short", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn json_output_is_used_verbatim() {
        let out = r##"{"name":"weather","full_text":"12°C","color":"#8888FF"}"##.to_string();
        let block = CommandResult::from_output(out).into_block(&spec());
        assert_eq!(block.name.as_deref(), Some("weather"));
        assert_eq!(block.color.as_deref(), Some("#8888FF"));
        assert_eq!(block.instance, None);
    }

    #[test]
    fn plain_output_becomes_custom_block() {
        for out in ["sunny", "42", "[1,2]", "\"quoted\"", ""] {
            let block = CommandResult::from_output(out.to_string()).into_block(&spec());
            assert_eq!(block, StatusBlock::custom("weather", out), "output {out:?}");
        }
    }

    #[test]
    fn timeout_shows_placeholder() {
        let result = CommandResult::from_error(CommandError::Timeout {
            timeout: Duration::from_millis(200),
        });
        assert!(result.error().is_none());
        let block = result.into_block(&spec());
        assert_eq!(block.full_text, TIMED_OUT_TEXT);
        assert_eq!(block.instance.as_deref(), Some("weather"));
    }

    #[test]
    fn failure_shows_error_text() {
        let result = CommandResult::from_error(CommandError::Spawn {
            command: "weather".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(result.error().map(CommandError::as_label), Some("command_spawn"));
        let block = result.into_block(&spec());
        assert!(block.full_text.starts_with("Error: cannot start \"weather\""));
        assert_eq!(block.urgent, Some(true));
    }
}
