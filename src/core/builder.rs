use std::sync::Arc;

use crate::{
    commands::CommandSpec,
    config::Config,
    events::Bus,
    media::{MediaTitle, TitleSourceRef},
    subscribers::{Subscribe, SubscriberSet},
};
use super::{scheduler::Scheduler, wrapper::Wrapper};

/// Builder for constructing a [`Wrapper`] with optional features.
pub struct WrapperBuilder {
    cfg: Config,
    commands: Vec<CommandSpec>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    title_source: Option<TitleSourceRef>,
}

impl WrapperBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            commands: Vec::new(),
            subscribers: Vec::new(),
            title_source: None,
        }
    }

    /// Sets the custom commands, in output order.
    pub fn with_commands(mut self, commands: Vec<CommandSpec>) -> Self {
        self.commands = commands;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (commands, cycles, stream end)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets where the currently-playing title comes from.
    ///
    /// Only used when [`Config::media`] is set. Without it, the `mpris`
    /// feature falls back to the session bus.
    pub fn with_title_source(mut self, source: TitleSourceRef) -> Self {
        self.title_source = Some(source);
        self
    }

    /// Builds the wrapper and starts event delivery.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Wrapper {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers));

        let media = match (self.cfg.media.clone(), resolve_source(self.title_source)) {
            (Some(media_cfg), Some(source)) => {
                Some(MediaTitle::new(source, media_cfg, self.cfg.timeout))
            }
            (Some(_), None) => {
                tracing::warn!("media block requested without a title source");
                None
            }
            (None, _) => None,
        };

        let scheduler = Scheduler::new(self.commands, self.cfg.error_policy, media, bus.clone());
        Wrapper::new_internal(self.cfg, bus, subs, scheduler)
    }
}

#[cfg(feature = "mpris")]
fn resolve_source(source: Option<TitleSourceRef>) -> Option<TitleSourceRef> {
    Some(source.unwrap_or_else(|| Arc::new(crate::media::MprisTitleSource::new())))
}

#[cfg(not(feature = "mpris"))]
fn resolve_source(source: Option<TitleSourceRef>) -> Option<TitleSourceRef> {
    source
}
