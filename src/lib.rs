//! # i3status-wrapper
//!
//! **i3status-wrapper** sits between `i3status` and `i3bar` and inserts the output
//! of user-configured commands into every status line.
//!
//! It speaks the i3bar JSON protocol on both sides: the header is forwarded
//! unchanged, and every upstream block set is re-emitted with the custom blocks
//! (and, optionally, the currently playing media title) in front of it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   i3status stdout
//!         │  {"version":1} [ [..], [..], ...
//!         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Wrapper (stream loop)                                            │
//! │  - BlockReader  (header, '[', one block set per cycle)            │
//! │  - Scheduler    (per-cycle fan-out, order-preserving merge)       │
//! │  - BlockWriter  (header, '[', block set + ",")                    │
//! │  - Bus + SubscriberSet (runtime events)                           │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐   ┌────────────┐
//!   │ command  │       │ command  │       │ command  │   │ MediaTitle │
//!   │ (timeout)│       │ (timeout)│       │ (timeout)│   │  (MPRIS)   │
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘   └─────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!      slot 0             slot 1            slot N-1        playing?
//!        └──────────────────┴────────┬─────────┴───────────────┘
//!                                    ▼
//!                  [custom..., playing?, upstream...]  ──► i3bar stdin
//! ```
//!
//! ### Cycle
//! ```text
//! upstream block set arrives
//!   ├─► cycle += 1
//!   ├─► spawn every CommandSpec (each with its own deadline)
//!   │       ├─ exit 0, JSON object  ──► block exactly as printed
//!   │       ├─ exit 0, plain text   ──► {"name":"customCmd","instance":prog,"full_text":text}
//!   │       ├─ deadline exceeded    ──► "Timed out." (process killed)
//!   │       └─ spawn/exit failure   ──► "Error: ..." urgent block, or abort with --strict
//!   ├─► wait for all N results
//!   └─► write merged set, publish CycleEmitted
//! ```
//!
//! ## Features
//! | Area              | Description                                         | Key types / traits                      |
//! |-------------------|-----------------------------------------------------|-----------------------------------------|
//! | **Protocol**      | i3bar header and block model, streaming codec.      | [`StatusBlock`], [`StreamHeader`]       |
//! | **Commands**      | External commands with per-command timeouts.        | [`CommandSpec`], [`CommandResult`]      |
//! | **Runtime**       | Stream loop, fan-out and cancellation.              | [`Wrapper`], [`Scheduler`]              |
//! | **Media**         | Currently playing title block.                      | [`TitleSource`], [`MediaTitle`]         |
//! | **Subscriber API**| Hook into runtime events (logging, custom sinks).   | [`Subscribe`], [`LogWriter`]            |
//! | **Errors**        | Typed errors per layer.                             | [`FramingError`], [`WrapperError`]      |
//! | **Configuration** | Centralize runtime settings.                        | [`Config`], [`cli::Args`]               |
//!
//! ## Optional features
//! - `mpris` _(default)_: MPRIS title lookup over the session D-Bus ([`MprisTitleSource`]).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use i3status_wrapper::{CommandSpec, Config, LogWriter, Subscribe, Wrapper};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.timeout = Duration::from_secs(1);
//!
//!     let commands = CommandSpec::parse_all(["echo hi"], cfg.timeout)?;
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!
//!     let wrapper = Wrapper::builder(cfg)
//!         .with_commands(commands)
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let input: &[u8] = b"{\"version\":1}\n[\n[{\"full_text\":\"100%\"}]\n";
//!     let mut output = Vec::new();
//!     wrapper.run(input, &mut output, CancellationToken::new()).await?;
//!     wrapper.shutdown().await;
//!
//!     assert_eq!(
//!         String::from_utf8(output)?,
//!         "{\"version\":1}\n[\n\
//!          [{\"name\":\"customCmd\",\"instance\":\"echo\",\"full_text\":\"hi\"},{\"full_text\":\"100%\"}]\n,"
//!     );
//!     Ok(())
//! }
//! ```

pub mod cli;
mod commands;
mod config;
mod core;
mod error;
mod events;
pub mod logging;
mod media;
mod protocol;
mod subscribers;

// ---- Public re-exports ----

pub use commands::{CommandResult, CommandSpec, TIMED_OUT_TEXT};
pub use config::{Config, ErrorPolicy, MediaConfig};
pub use crate::core::{Scheduler, Wrapper, WrapperBuilder, run_command, shutdown_token};
pub use error::{BusError, CommandError, ConfigError, FramingError, WrapperError};
pub use events::{Bus, Event, EventKind};
pub use media::{MediaTitle, PLAYING_BLOCK_NAME, TitleSource, TitleSourceRef};
pub use protocol::{
    BlockReader, BlockWriter, CUSTOM_BLOCK_NAME, MinWidth, PROTOCOL_VERSION, StatusBlock,
    StreamHeader,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};

#[cfg(feature = "mpris")]
pub use media::MprisTitleSource;
