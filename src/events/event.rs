//! # Runtime events emitted by the wrapper, scheduler and command runner.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Stream events**: header forwarded, cycle emitted, stream ended, shutdown
//! - **Command events**: one custom command's execution flow
//! - **Title events**: media title lookup failures
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! command name, cycle number and durations.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Command events of one cycle are published from parallel tasks; use `seq` to restore
//! the exact order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use i3status_wrapper::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::CommandTimedOut)
//!     .with_command("sleep")
//!     .with_cycle(3)
//!     .with_timeout(Duration::from_millis(200));
//!
//! assert_eq!(ev.kind, EventKind::CommandTimedOut);
//! assert_eq!(ev.command.as_deref(), Some("sleep"));
//! assert_eq!(ev.timeout_ms, Some(200));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Stream events ===
    /// Header read from upstream and written downstream.
    ///
    /// Sets:
    /// - `reason`: header JSON as forwarded
    HeaderForwarded,

    /// One merged block set was written downstream.
    ///
    /// Sets:
    /// - `cycle`: cycle number (1-based)
    /// - `blocks`: number of blocks written
    /// - `elapsed_ms`: time spent merging the cycle
    CycleEmitted,

    /// Upstream input ended (EOF or closed array) or downstream closed.
    ///
    /// Sets:
    /// - `cycle`: last emitted cycle
    /// - `reason`: what ended the stream
    StreamEnded,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    // === Command events ===
    /// A custom command is being started for a cycle.
    ///
    /// Sets:
    /// - `command`: program name
    /// - `cycle`: cycle number
    CommandStarting,

    /// A custom command exited successfully.
    ///
    /// Sets:
    /// - `command`: program name
    /// - `cycle`: cycle number
    /// - `elapsed_ms`: run time
    CommandFinished,

    /// A custom command exceeded its deadline and was killed.
    ///
    /// Sets:
    /// - `command`: program name
    /// - `cycle`: cycle number
    /// - `timeout_ms`: configured deadline
    CommandTimedOut,

    /// A custom command could not run or exited unsuccessfully.
    ///
    /// Sets:
    /// - `command`: program name
    /// - `cycle`: cycle number
    /// - `reason`: error message
    CommandFailed,

    // === Title events ===
    /// The media title could not be read from the session bus.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    /// - `reason`: error message
    TitleFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Program name of the custom command, if applicable.
    pub command: Option<Arc<str>>,
    /// Cycle number (starting from 1).
    pub cycle: Option<u64>,
    /// Command deadline in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Measured duration in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Number of blocks written in a cycle.
    pub blocks: Option<usize>,
    /// Human-readable reason (errors, header, end cause).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            command: None,
            cycle: None,
            timeout_ms: None,
            elapsed_ms: None,
            blocks: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a command name.
    #[inline]
    pub fn with_command(mut self, command: impl Into<Arc<str>>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attaches a cycle number.
    #[inline]
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a measured duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a block count.
    #[inline]
    pub fn with_blocks(mut self, n: usize) -> Self {
        self.blocks = Some(n);
        self
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
