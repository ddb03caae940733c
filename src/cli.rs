//! # Command line.
//!
//! [`Args`] is the clap surface of the binary; [`Args::into_parts`] turns it
//! into a validated [`Config`] and the command list.

use std::time::Duration;

use clap::Parser;

use crate::{
    commands::CommandSpec,
    config::{Config, ErrorPolicy, MediaConfig},
    error::ConfigError,
};

/// Wraps i3status output and inserts the output of custom commands.
///
/// Pipe i3status into it: `i3status | i3status-wrapper "weather -s" "uptime -p"`.
#[derive(Parser, Debug)]
#[command(name = "i3status-wrapper", version, about)]
pub struct Args {
    /// Custom commands, one per argument ("prog arg1 arg2"). Run without a shell.
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// Per-command timeout (e.g. "500ms", "5s").
    #[arg(long, value_name = "DURATION", default_value = "5s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Abort when a custom command cannot be run or exits with an error.
    #[arg(long)]
    pub strict: bool,

    /// Add the title of the currently playing MPRIS player.
    #[arg(long)]
    pub media: bool,

    /// Text placed before the media title.
    #[arg(long, value_name = "TEXT", default_value = "", requires = "media")]
    pub media_prefix: String,

    /// Hide media titles containing TEXT.
    #[arg(long, value_name = "TEXT", requires = "media")]
    pub media_ignore: Vec<String>,

    /// More log output on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Validates the arguments and splits them into runtime config and commands.
    pub fn into_parts(self) -> Result<(Config, Vec<CommandSpec>), ConfigError> {
        if self.media && !cfg!(feature = "mpris") {
            return Err(ConfigError::MediaUnsupported);
        }

        let cfg = Config {
            timeout: self.timeout,
            error_policy: if self.strict {
                ErrorPolicy::Fatal
            } else {
                ErrorPolicy::Inline
            },
            media: self.media.then(|| MediaConfig {
                prefix: self.media_prefix,
                ignore: self.media_ignore,
            }),
            ..Config::default()
        };
        cfg.validate()?;

        let commands = CommandSpec::parse_all(&self.commands, cfg.timeout)?;
        Ok((cfg, commands))
    }
}
