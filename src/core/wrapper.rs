//! # Wrapper: owns the stream loop, event delivery and shutdown.
//!
//! The [`Wrapper`] reads the upstream status stream, merges every block set with
//! custom command output via the [`Scheduler`], and writes the result downstream.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   input (i3status stdout) ──► Wrapper::run(input, output, token) ──► output (i3bar)
//!
//! Preparation (build):
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(Event)    (fire-and-forget)
//!
//! Session:
//!   read_header ─► write_header ─► publish(HeaderForwarded)
//!   read '['    ─► write '['
//!   loop:
//!     next_block_set()
//!       ├─ Some(upstream) ─► Scheduler::merge_cycle(cycle, upstream)
//!       │                      └─► write_block_set ─► publish(CycleEmitted)
//!       └─ None (']' or EOF) ─► publish(StreamEnded) ─► Ok(())
//!
//! Shutdown path:
//!   token.cancelled()  ─► publish(ShutdownRequested) ─► Ok(())
//!                         (in-flight commands are dropped and their processes killed)
//! ```
//!
//! ## Rules
//! - The header is written exactly once, before the first block set.
//! - A closed downstream pipe ends the session cleanly.
//! - Framing errors and fatal command failures end the session with [`WrapperError`].
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use i3status_wrapper::{CommandSpec, Config, Wrapper};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let commands = CommandSpec::parse_all(["echo hi"], Duration::from_secs(1))?;
//!     let wrapper = Wrapper::builder(cfg).with_commands(commands).build();
//!
//!     let input: &[u8] = b"{\"version\":1}\n[\n[{\"full_text\":\"100%\"}]\n";
//!     let mut output = Vec::new();
//!     wrapper.run(input, &mut output, CancellationToken::new()).await?;
//!     wrapper.shutdown().await;
//!
//!     assert!(String::from_utf8(output)?.contains("\"full_text\":\"hi\""));
//!     Ok(())
//! }
//! ```

use std::io;
use std::sync::Arc;
use std::time::Instant;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::broadcast::error::RecvError,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::{builder::WrapperBuilder, scheduler::Scheduler},
    error::WrapperError,
    events::{Bus, Event, EventKind},
    protocol::{BlockReader, BlockWriter},
    subscribers::SubscriberSet,
};

/// Streams block sets from input to output, inserting custom blocks on every cycle.
pub struct Wrapper {
    /// Global runtime configuration.
    pub cfg: Config,
    /// Event bus shared with the scheduler and its workers.
    pub bus: Bus,
    subs: Arc<SubscriberSet>,
    scheduler: Scheduler,
    listener: JoinHandle<()>,
}

impl Wrapper {
    /// Returns a builder for configuring the wrapper.
    pub fn builder(cfg: Config) -> WrapperBuilder {
        WrapperBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        scheduler: Scheduler,
    ) -> Self {
        let listener = Self::subscriber_listener(&bus, Arc::clone(&subs));
        Self {
            cfg,
            bus,
            subs,
            scheduler,
            listener,
        }
    }

    /// Runs one session until the input ends, the output closes, or `token` is cancelled.
    pub async fn run<R, W>(
        &self,
        input: R,
        output: W,
        token: CancellationToken,
    ) -> Result<(), WrapperError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                Ok(())
            }
            res = self.session(input, output) => res,
        }
    }

    /// Stops event delivery and waits until every subscriber has drained its queue.
    pub async fn shutdown(self) {
        let Self {
            bus,
            subs,
            scheduler,
            listener,
            ..
        } = self;
        // The listener exits once every bus sender is gone.
        drop(scheduler);
        drop(bus);
        let _ = listener.await;

        if let Ok(set) = Arc::try_unwrap(subs) {
            set.shutdown().await;
        }
    }

    async fn session<R, W>(&self, input: R, output: W) -> Result<(), WrapperError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BlockReader::new(input);
        let mut writer = BlockWriter::new(output);

        let header = reader.read_header().await?;
        if !delivered(writer.write_header(&header).await)? {
            self.publish_ended(0, "output closed");
            return Ok(());
        }
        self.bus.publish(
            Event::new(EventKind::HeaderForwarded)
                .with_reason(serde_json::to_string(&header).unwrap_or_default()),
        );

        reader.read_array_start().await?;
        if !delivered(writer.write_array_start().await)? {
            self.publish_ended(0, "output closed");
            return Ok(());
        }

        let mut cycle = 0u64;
        while let Some(upstream) = reader.next_block_set().await? {
            cycle += 1;
            let started = Instant::now();
            let merged = self.scheduler.merge_cycle(cycle, upstream).await?;

            if !delivered(writer.write_block_set(&merged).await)? {
                self.publish_ended(cycle, "output closed");
                return Ok(());
            }
            self.bus.publish(
                Event::new(EventKind::CycleEmitted)
                    .with_cycle(cycle)
                    .with_blocks(merged.len())
                    .with_elapsed(started.elapsed()),
            );
        }

        self.publish_ended(cycle, "end of input");
        Ok(())
    }

    fn publish_ended(&self, cycle: u64, reason: &'static str) {
        self.bus.publish(
            Event::new(EventKind::StreamEnded)
                .with_cycle(cycle)
                .with_reason(reason),
        );
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Maps a write result: `Ok(false)` when the consumer has gone away.
fn delivered(res: io::Result<()>) -> Result<bool, WrapperError> {
    match res {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(err) => Err(WrapperError::Output(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandSpec;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn broken_pipe_is_not_an_error() {
        assert!(!delivered(Err(io::ErrorKind::BrokenPipe.into())).unwrap());
        assert!(delivered(Ok(())).unwrap());
        let err = delivered(Err(io::ErrorKind::PermissionDenied.into())).unwrap_err();
        assert_eq!(err.as_label(), "output_io");
    }

    #[tokio::test]
    async fn publishes_lifecycle_events() {
        let wrapper = Wrapper::builder(Config::default()).build();
        let mut rx = wrapper.bus.subscribe();

        let input: &[u8] = b"{\"version\":1}\n[\n[]\n,[]\n";
        let mut output = Vec::new();
        wrapper
            .run(input, &mut output, CancellationToken::new())
            .await
            .unwrap();

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                EventKind::HeaderForwarded,
                EventKind::CycleEmitted,
                EventKind::CycleEmitted,
                EventKind::StreamEnded,
            ]
        );
    }

    #[tokio::test]
    async fn cancellation_stops_a_waiting_session() {
        let wrapper = Wrapper::builder(Config::default()).build();
        let mut rx = wrapper.bus.subscribe();
        let (mut upstream, input) = tokio::io::duplex(64);
        upstream.write_all(b"{\"version\":1}\n[\n").await.unwrap();

        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let mut output = Vec::new();
        wrapper.run(input, &mut output, token).await.unwrap();
        assert_eq!(output, b"{\"version\":1}\n[\n");

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds.last(), Some(&EventKind::ShutdownRequested));
        drop(upstream);
    }

    #[tokio::test]
    async fn cancellation_kills_in_flight_commands() {
        let cfg = Config::default();
        let commands = CommandSpec::parse_all(["sleep 10"], Duration::from_secs(30)).unwrap();
        let wrapper = Wrapper::builder(cfg).with_commands(commands).build();

        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });

        let started = Instant::now();
        let input: &[u8] = b"{\"version\":1}\n[\n[]\n";
        let mut output = Vec::new();
        wrapper.run(input, &mut output, token).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn shutdown_drains_subscribers() {
        let wrapper = Wrapper::builder(Config::default()).build();
        let input: &[u8] = b"{\"version\":1}\n[\n";
        let mut output = Vec::new();
        wrapper
            .run(input, &mut output, CancellationToken::new())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(2), wrapper.shutdown())
            .await
            .unwrap();
    }
}
