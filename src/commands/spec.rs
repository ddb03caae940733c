//! # Custom command definition.
//!
//! Defines [`CommandSpec`], one external command whose output becomes a
//! status block every cycle.
//!
//! A spec can be created:
//! - **Explicitly** with [`CommandSpec::new`] (full control)
//! - **From the command line** with [`CommandSpec::parse`] / [`CommandSpec::parse_all`]
//!
//! ## Rules
//! - The program name is never empty.
//! - `position` is the index among configured commands and decides where the
//!   result is placed in the merged output.
//! - Specs are immutable for the process lifetime.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;

/// One configured custom command.
///
/// Cheap to clone: each cycle hands a clone to the worker task running it.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use i3status_wrapper::CommandSpec;
///
/// let spec = CommandSpec::parse(0, "date +%H:%M", Duration::from_secs(1)).unwrap();
/// assert_eq!(spec.program(), "date");
/// assert_eq!(spec.args(), ["+%H:%M"]);
/// assert_eq!(spec.position(), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    program: Arc<str>,
    args: Arc<[String]>,
    timeout: Duration,
    position: usize,
}

impl CommandSpec {
    /// Creates a spec with explicit parameters.
    ///
    /// ### Parameters
    /// - `position`: Output slot among configured commands
    /// - `program`: Program name or path (looked up in `PATH`)
    /// - `args`: Arguments passed verbatim, no shell involved
    /// - `timeout`: Per-cycle deadline
    pub fn new(
        position: usize,
        program: impl Into<Arc<str>>,
        args: impl IntoIterator<Item = String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(ConfigError::EmptyCommand { position });
        }
        Ok(Self {
            program,
            args: args.into_iter().collect(),
            timeout,
            position,
        })
    }

    /// Parses one command-line argument of the form `"program arg1 arg2"`.
    ///
    /// Words are separated by runs of whitespace. Quoting is not interpreted:
    /// wrap the command in a script if an argument needs embedded spaces.
    pub fn parse(position: usize, line: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let mut words = line.split_whitespace();
        let program = words.next().ok_or(ConfigError::EmptyCommand { position })?;
        Self::new(position, program, words.map(str::to_owned), timeout)
    }

    /// Parses every positional argument, assigning positions in order.
    pub fn parse_all<I, S>(lines: I, timeout: Duration) -> Result<Vec<Self>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .enumerate()
            .map(|(position, line)| Self::parse(position, line.as_ref(), timeout))
            .collect()
    }

    /// Returns the program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the per-cycle deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the output slot.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the spec to another output slot.
    pub(crate) fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_secs(1);

    #[test]
    fn splits_program_and_arguments() {
        let spec = CommandSpec::parse(3, "  notify-count   --unread  inbox ", T).unwrap();
        assert_eq!(spec.program(), "notify-count");
        assert_eq!(spec.args(), ["--unread", "inbox"]);
        assert_eq!(spec.position(), 3);
        assert_eq!(spec.timeout(), T);
    }

    #[test]
    fn program_without_arguments() {
        let spec = CommandSpec::parse(0, "uptime", T).unwrap();
        assert!(spec.args().is_empty());
    }

    #[test]
    fn empty_commands_are_rejected() {
        assert_eq!(
            CommandSpec::parse(1, "   ", T),
            Err(ConfigError::EmptyCommand { position: 1 })
        );
        assert_eq!(
            CommandSpec::new(0, "", Vec::new(), T),
            Err(ConfigError::EmptyCommand { position: 0 })
        );
    }

    #[test]
    fn parse_all_assigns_declaration_order() {
        let specs = CommandSpec::parse_all(["a", "b x", "c"], T).unwrap();
        let positions: Vec<_> = specs.iter().map(|s| (s.position(), s.program())).collect();
        assert_eq!(positions, [(0, "a"), (1, "b"), (2, "c")]);
    }

    #[test]
    fn parse_all_reports_first_bad_position() {
        assert_eq!(
            CommandSpec::parse_all(["a", "", "c"], T),
            Err(ConfigError::EmptyCommand { position: 1 })
        );
    }
}
