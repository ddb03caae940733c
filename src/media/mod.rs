//! # Currently-playing media title.
//!
//! - [`TitleSource`] - where titles come from (MPRIS over D-Bus in production)
//! - [`MediaTitle`] - turns a source into the optional `playing` block
//!
//! ## Block rules
//! ```text
//! Ok(None) / empty title / ignored title ─► no block
//! Ok(Some(title))                        ─► playing: "<prefix> <title>"
//! Err(bus error) / no answer in time     ─► playing: "Error: <message>"
//! ```
//!
//! The lookup shares the command deadline, so a player that never answers
//! cannot hold back a cycle.

#[cfg(feature = "mpris")]
mod mpris;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

#[cfg(feature = "mpris")]
pub use mpris::MprisTitleSource;

use crate::{
    config::MediaConfig,
    error::BusError,
    events::{Bus, Event, EventKind},
    protocol::StatusBlock,
};

/// Block name of the currently-playing block.
pub const PLAYING_BLOCK_NAME: &str = "playing";

/// Source of the currently playing media title.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use i3status_wrapper::{BusError, TitleSource};
///
/// struct Fixed(&'static str);
///
/// #[async_trait]
/// impl TitleSource for Fixed {
///     async fn current_title(&self) -> Result<Option<String>, BusError> {
///         Ok(Some(self.0.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait TitleSource: Send + Sync + 'static {
    /// Returns the title of the first active player, `None` if nothing is playing.
    async fn current_title(&self) -> Result<Option<String>, BusError>;
}

/// Shared handle to a title source.
pub type TitleSourceRef = Arc<dyn TitleSource>;

/// Builds the currently-playing block from a [`TitleSource`].
#[derive(Clone)]
pub struct MediaTitle {
    source: TitleSourceRef,
    config: MediaConfig,
    timeout: Duration,
}

impl MediaTitle {
    /// `timeout` bounds each lookup, like a command deadline.
    pub fn new(source: TitleSourceRef, config: MediaConfig, timeout: Duration) -> Self {
        Self {
            source,
            config,
            timeout,
        }
    }

    /// Looks up the title once and returns the block to show, if any.
    ///
    /// Bus failures and lookups exceeding the deadline are shown in the block
    /// and published as [`EventKind::TitleFailed`].
    pub async fn block(&self, cycle: u64, bus: &Bus) -> Option<StatusBlock> {
        let lookup = time::timeout(self.timeout, self.source.current_title())
            .await
            .unwrap_or(Err(BusError::Timeout {
                timeout: self.timeout,
            }));
        let text = match lookup {
            Ok(Some(title)) => self.format(&title)?,
            Ok(None) => return None,
            Err(err) => {
                bus.publish(
                    Event::new(EventKind::TitleFailed)
                        .with_cycle(cycle)
                        .with_reason(err.to_string()),
                );
                format!("Error: {err}")
            }
        };
        Some(StatusBlock::new(text).with_name(PLAYING_BLOCK_NAME))
    }

    /// Applies the suppression rules and prefix; `None` hides the block.
    fn format(&self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() || self.is_ignored(title) {
            return None;
        }
        if self.config.prefix.is_empty() {
            Some(title.to_owned())
        } else {
            Some(format!("{} {title}", self.config.prefix))
        }
    }

    fn is_ignored(&self, title: &str) -> bool {
        self.config
            .ignore
            .iter()
            .any(|needle| !needle.is_empty() && title.contains(needle.as_str()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Title source returning a fixed answer.
    pub(crate) struct FixedTitle(pub Result<Option<&'static str>, &'static str>);

    #[async_trait]
    impl TitleSource for FixedTitle {
        async fn current_title(&self) -> Result<Option<String>, BusError> {
            match self.0 {
                Ok(title) => Ok(title.map(str::to_owned)),
                Err(msg) => Err(BusError::Call(msg.to_owned())),
            }
        }
    }

    /// Title source that answers only after the given delay.
    pub(crate) struct StalledTitle(pub Duration);

    #[async_trait]
    impl TitleSource for StalledTitle {
        async fn current_title(&self) -> Result<Option<String>, BusError> {
            time::sleep(self.0).await;
            Ok(Some("late".to_owned()))
        }
    }

    fn media(answer: Result<Option<&'static str>, &'static str>, config: MediaConfig) -> MediaTitle {
        MediaTitle::new(Arc::new(FixedTitle(answer)), config, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn plain_title() {
        let bus = Bus::new(4);
        let block = media(Ok(Some("Song")), MediaConfig::default())
            .block(1, &bus)
            .await
            .unwrap();
        assert_eq!(block.name.as_deref(), Some(PLAYING_BLOCK_NAME));
        assert_eq!(block.full_text, "Song");
    }

    #[tokio::test]
    async fn prefixed_title() {
        let bus = Bus::new(4);
        let config = MediaConfig {
            prefix: "♫".into(),
            ignore: Vec::new(),
        };
        let block = media(Ok(Some("Song")), config).block(1, &bus).await.unwrap();
        assert_eq!(block.full_text, "♫ Song");
    }

    #[tokio::test]
    async fn nothing_playing_or_suppressed_hides_block() {
        let bus = Bus::new(4);
        let config = MediaConfig {
            prefix: String::new(),
            ignore: vec!["Yandex Music".into()],
        };
        assert!(media(Ok(None), config.clone()).block(1, &bus).await.is_none());
        assert!(media(Ok(Some("  ")), config.clone()).block(1, &bus).await.is_none());
        assert!(
            media(Ok(Some("Home - Yandex Music")), config)
                .block(1, &bus)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn bus_error_is_shown_inline() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        let block = media(Err("no reply"), MediaConfig::default())
            .block(9, &bus)
            .await
            .unwrap();
        assert_eq!(block.full_text, "Error: no reply");

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TitleFailed);
        assert_eq!(ev.cycle, Some(9));
    }

    #[tokio::test]
    async fn unanswered_lookup_is_cut_at_the_deadline() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        let media = MediaTitle::new(
            Arc::new(StalledTitle(Duration::from_secs(3))),
            MediaConfig::default(),
            Duration::from_millis(100),
        );

        let started = std::time::Instant::now();
        let block = media.block(2, &bus).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(block.full_text, "Error: timed out after 100ms");
        assert_eq!(block.name.as_deref(), Some(PLAYING_BLOCK_NAME));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TitleFailed);
    }
}
