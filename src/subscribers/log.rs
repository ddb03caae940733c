//! # LogWriter - renders events through `tracing`
//!
//! Routine events go to `debug`/`trace`, problems to `warn`. With the default
//! `info` level only failures, timeouts and stream end are visible.
//!
//! ## Example output (`-vv`)
//! ```text
//! DEBUG header forwarded header={"version":1,"click_events":true}
//! TRACE command starting command="weather" cycle=1
//! DEBUG command finished command="weather" cycle=1 elapsed_ms=41
//!  WARN command timed out command="slow-thing" cycle=1 timeout_ms=5000
//! DEBUG cycle emitted cycle=1 blocks=9 elapsed_ms=5002
//!  INFO stream ended cycle=1 reason="end of input"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, trace, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let command = e.command.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::HeaderForwarded => {
                debug!(header = reason, "header forwarded");
            }
            EventKind::CycleEmitted => {
                debug!(cycle = e.cycle, blocks = e.blocks, elapsed_ms = e.elapsed_ms, "cycle emitted");
            }
            EventKind::StreamEnded => {
                info!(cycle = e.cycle, reason, "stream ended");
            }
            EventKind::ShutdownRequested => {
                info!("shutdown requested");
            }
            EventKind::CommandStarting => {
                trace!(command, cycle = e.cycle, "command starting");
            }
            EventKind::CommandFinished => {
                debug!(command, cycle = e.cycle, elapsed_ms = e.elapsed_ms, "command finished");
            }
            EventKind::CommandTimedOut => {
                warn!(command, cycle = e.cycle, timeout_ms = e.timeout_ms, "command timed out");
            }
            EventKind::CommandFailed => {
                warn!(command, cycle = e.cycle, error = reason, "command failed");
            }
            EventKind::TitleFailed => {
                warn!(cycle = e.cycle, error = reason, "media title lookup failed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
