//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for the wrapper.
//!
//! Config is used in two ways:
//! 1. **Wrapper creation**: `Wrapper::builder(config)`
//! 2. **CommandSpec defaults**: `CommandSpec::parse_all(args, config.timeout)`
//!
//! The command line is turned into a `Config` by [`Args`](crate::cli::Args).

use std::time::Duration;

use crate::error::ConfigError;

/// What to do when a custom command fails for a reason other than its timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Show the error in the command's own block and keep the bar running.
    #[default]
    Inline,
    /// Stop the wrapper with a non-zero exit code.
    Fatal,
}

/// Settings for the currently-playing block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaConfig {
    /// Text placed before the title, separated by a space (`""` = none).
    pub prefix: String,
    /// Titles containing any of these substrings are not shown.
    pub ignore: Vec<String>,
}

/// Global configuration for the wrapper runtime.
///
/// ## Field semantics
/// - `timeout`: per-command deadline applied to every custom command (must be `> 0`)
/// - `error_policy`: failure handling for spawn/exit errors ([`ErrorPolicy`])
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `media`: `Some` enables the currently-playing block
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time a custom command may run in one cycle.
    ///
    /// On expiry the command's block shows `Timed out.` and the process is killed.
    pub timeout: Duration,

    /// Failure handling for custom commands.
    pub error_policy: ErrorPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// skip older events.
    pub bus_capacity: usize,

    /// Currently-playing block settings, `None` when disabled.
    pub media: Option<MediaConfig>,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks invariants that clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `timeout = 5s`
    /// - `error_policy = ErrorPolicy::Inline`
    /// - `bus_capacity = 256`
    /// - `media = None`
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            error_policy: ErrorPolicy::default(),
            bus_capacity: 256,
            media: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.error_policy, ErrorPolicy::Inline);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = Config {
            timeout: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
