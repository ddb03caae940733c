//! Error types used by the wrapper runtime, the protocol codec and commands.
//!
//! This module defines one enum per layer:
//!
//! - [`FramingError`] - the i3bar stream could not be decoded; fatal.
//! - [`CommandError`] - a custom command failed for one cycle.
//! - [`BusError`] - the media title lookup failed for one cycle.
//! - [`ConfigError`] - invalid command line or settings at startup.
//! - [`WrapperError`] - errors that terminate [`Wrapper::run`](crate::Wrapper::run).
//!
//! All types provide an `as_label` helper returning a stable snake_case label for logs.

use std::time::Duration;
use thiserror::Error;

/// # Errors raised while decoding the upstream stream.
///
/// The wire contract with the consumer is broken once any of these happen,
/// so they are never recovered locally.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FramingError {
    /// Input closed before the header object was read.
    #[error("input closed before the protocol header")]
    MissingHeader,

    /// The header object is not valid JSON or misses `version`.
    #[error("malformed header: {0}")]
    Header(#[source] serde_json::Error),

    /// The header announces a protocol version other than 1.
    #[error("unsupported protocol version {version}")]
    UnsupportedVersion {
        /// Version found in the header.
        version: u32,
    },

    /// Something other than `[` follows the header.
    #[error("expected '[' after the header, found {found:?}")]
    ArrayStart {
        /// First non-whitespace character found instead.
        found: char,
    },

    /// Input closed before the array start token.
    #[error("input closed before the array start token")]
    MissingArrayStart,

    /// A block set is not a JSON array of status blocks.
    #[error("malformed block set: {0}")]
    BlockSet(#[source] serde_json::Error),

    /// Input closed in the middle of a JSON value.
    #[error("input closed in the middle of a value")]
    Truncated,

    /// Reading from the input failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl FramingError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FramingError::MissingHeader => "framing_missing_header",
            FramingError::Header(_) => "framing_header",
            FramingError::UnsupportedVersion { .. } => "framing_unsupported_version",
            FramingError::ArrayStart { .. } => "framing_array_start",
            FramingError::MissingArrayStart => "framing_missing_array_start",
            FramingError::BlockSet(_) => "framing_block_set",
            FramingError::Truncated => "framing_truncated",
            FramingError::Io(_) => "framing_io",
        }
    }
}

/// # Errors produced by running one custom command.
///
/// `Timeout` is expected and always replaced by a placeholder block.
/// The others are handled according to [`ErrorPolicy`](crate::ErrorPolicy).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command did not exit before its deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The process could not be started (usually not found or not executable).
    #[error("cannot start {command:?}: {source}")]
    Spawn {
        /// Program name.
        command: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("{command:?} exited with {status}{}", stderr_suffix(.stderr))]
    Exit {
        /// Program name.
        command: String,
        /// Exit status as reported by the OS.
        status: std::process::ExitStatus,
        /// Trimmed standard error output (possibly empty).
        stderr: String,
    },

    /// Waiting for the process or reading its output failed.
    #[error("i/o error while running {command:?}: {source}")]
    Io {
        /// Program name.
        command: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The worker running the command died without reporting a result.
    #[error("worker for {command:?} aborted: {reason}")]
    Aborted {
        /// Program name.
        command: String,
        /// Join error description.
        reason: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

impl CommandError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use i3status_wrapper::CommandError;
    /// use std::time::Duration;
    ///
    /// let err = CommandError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "command_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::Timeout { .. } => "command_timeout",
            CommandError::Spawn { .. } => "command_spawn",
            CommandError::Exit { .. } => "command_exit",
            CommandError::Io { .. } => "command_io",
            CommandError::Aborted { .. } => "command_aborted",
        }
    }

    /// Indicates whether the error is the expected deadline case.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Timeout { .. })
    }
}

/// # Errors produced by the media title lookup.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// The session bus could not be reached.
    #[error("cannot connect to the session bus: {0}")]
    Connect(String),

    /// A bus call or property read failed.
    #[error("{0}")]
    Call(String),

    /// No answer arrived before the per-cycle deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// Deadline that was exceeded.
        timeout: Duration,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Connect(_) => "bus_connect",
            BusError::Call(_) => "bus_call",
            BusError::Timeout { .. } => "bus_timeout",
        }
    }
}

#[cfg(feature = "mpris")]
impl From<zbus::Error> for BusError {
    fn from(err: zbus::Error) -> Self {
        BusError::Call(err.to_string())
    }
}

#[cfg(feature = "mpris")]
impl From<zbus::fdo::Error> for BusError {
    fn from(err: zbus::fdo::Error) -> Self {
        BusError::Call(err.to_string())
    }
}

/// # Errors found while validating the configuration.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A positional command argument is empty or only whitespace.
    #[error("command #{position} is empty")]
    EmptyCommand {
        /// Zero-based position among the configured commands.
        position: usize,
    },

    /// The command timeout must be positive.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// `--media` was requested but the binary was built without D-Bus support.
    #[error("media title support is not compiled in (enable the `mpris` feature)")]
    MediaUnsupported,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::EmptyCommand { .. } => "config_empty_command",
            ConfigError::ZeroTimeout => "config_zero_timeout",
            ConfigError::MediaUnsupported => "config_media_unsupported",
        }
    }
}

/// # Errors that terminate the wrapper.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WrapperError {
    /// The upstream stream could not be decoded.
    #[error(transparent)]
    Framing(#[from] FramingError),

    /// Writing to the downstream consumer failed.
    #[error("write failed: {0}")]
    Output(#[source] std::io::Error),

    /// A custom command failed while running under [`ErrorPolicy::Fatal`](crate::ErrorPolicy::Fatal).
    #[error("custom command failed: {0}")]
    Command(#[source] CommandError),
}

impl WrapperError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WrapperError::Framing(e) => e.as_label(),
            WrapperError::Output(_) => "output_io",
            WrapperError::Command(e) => e.as_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn exit_error_includes_stderr_only_when_present() {
        use std::os::unix::process::ExitStatusExt;

        let quiet = CommandError::Exit {
            command: "false".into(),
            status: std::process::ExitStatus::from_raw(256),
            stderr: String::new(),
        };
        assert_eq!(quiet.to_string(), "\"false\" exited with exit status: 1");

        let loud = CommandError::Exit {
            command: "ls".into(),
            status: std::process::ExitStatus::from_raw(512),
            stderr: "no such file".into(),
        };
        assert_eq!(
            loud.to_string(),
            "\"ls\" exited with exit status: 2: no such file"
        );
    }

    #[test]
    fn wrapper_labels_delegate_to_inner_error() {
        let err = WrapperError::Framing(FramingError::UnsupportedVersion { version: 2 });
        assert_eq!(err.as_label(), "framing_unsupported_version");

        let err = WrapperError::Command(CommandError::Timeout {
            timeout: Duration::from_millis(5),
        });
        assert_eq!(err.as_label(), "command_timeout");
    }
}
