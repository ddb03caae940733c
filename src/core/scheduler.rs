//! # Scheduler: per-cycle fan-out and order-preserving merge.
//!
//! ## Flow
//! ```text
//! merge_cycle(cycle, upstream):
//!   CommandSpec[0]  CommandSpec[1]  ...  CommandSpec[N-1]
//!        │               │                    │
//!        └──► JoinSet::spawn(run_command(spec, cycle))   (one task per spec)
//!                        │
//!   MediaTitle::block() ─┤   (concurrently with the fan-out)
//!                        ▼
//!   slots: [Option<StatusBlock>; N]  ◄── result written at spec.position()
//!                        │
//!   output = slots[0..N] ++ [playing]? ++ upstream
//! ```
//!
//! ## Rules
//! - Specs are renumbered to `0..N` at construction; slot indexing cannot go out of range.
//! - Exactly N results are collected before the cycle is emitted.
//! - Output order is a function of configuration, never of completion order.
//! - A worker that dies without a result (panic) fills its slot with an error block.
//! - The media lookup is bounded by the same deadline as the commands.
//! - Under [`ErrorPolicy::Fatal`] the first failure aborts the remaining workers
//!   and is returned as [`WrapperError::Command`].

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
    commands::{CommandResult, CommandSpec},
    config::ErrorPolicy,
    core::runner::run_command,
    error::{CommandError, WrapperError},
    events::Bus,
    media::MediaTitle,
    protocol::StatusBlock,
};

/// Merges custom command output, the media title and upstream blocks, once per cycle.
#[derive(Clone)]
pub struct Scheduler {
    commands: Arc<[CommandSpec]>,
    policy: ErrorPolicy,
    media: Option<MediaTitle>,
    bus: Bus,
}

impl Scheduler {
    /// Creates a scheduler for `commands`.
    ///
    /// Specs are ordered by [`CommandSpec::position`] (ties keep their list order)
    /// and renumbered to `0..commands.len()`, so every spec owns exactly one slot.
    pub fn new(
        mut commands: Vec<CommandSpec>,
        policy: ErrorPolicy,
        media: Option<MediaTitle>,
        bus: Bus,
    ) -> Self {
        commands.sort_by_key(CommandSpec::position);
        let commands = commands
            .into_iter()
            .enumerate()
            .map(|(slot, spec)| spec.at_position(slot))
            .collect();
        Self {
            commands,
            policy,
            media,
            bus,
        }
    }

    /// Runs every command for `cycle` and returns the merged block set.
    pub async fn merge_cycle(
        &self,
        cycle: u64,
        upstream: Vec<StatusBlock>,
    ) -> Result<Vec<StatusBlock>, WrapperError> {
        let title = async {
            match &self.media {
                Some(media) => media.block(cycle, &self.bus).await,
                None => None,
            }
        };
        let (custom, title) = tokio::join!(self.fan_out(cycle), title);
        let custom = custom?;

        let mut merged = Vec::with_capacity(custom.len() + 1 + upstream.len());
        merged.extend(custom);
        merged.extend(title);
        merged.extend(upstream);
        Ok(merged)
    }

    /// Runs all commands in parallel and collects their blocks by position.
    async fn fan_out(&self, cycle: u64) -> Result<Vec<StatusBlock>, WrapperError> {
        let bus = &self.bus;
        self.collect(cycle, |spec| {
            let bus = bus.clone();
            async move { run_command(&spec, cycle, &bus).await }
        })
        .await
    }

    /// Spawns `run` once per spec and fills one slot per spec.
    async fn collect<F, Fut>(&self, cycle: u64, run: F) -> Result<Vec<StatusBlock>, WrapperError>
    where
        F: Fn(CommandSpec) -> Fut,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        let mut set = JoinSet::new();
        for spec in self.commands.iter().cloned() {
            let position = spec.position();
            let work = run(spec);
            set.spawn(async move { (position, work.await) });
        }

        let mut slots: Vec<Option<StatusBlock>> = vec![None; self.commands.len()];
        while let Some(joined) = set.join_next().await {
            let (position, result) = match joined {
                Ok(done) => done,
                Err(err) => {
                    tracing::error!(cycle, error = %err, "command worker died");
                    continue;
                }
            };
            if self.policy == ErrorPolicy::Fatal {
                if let CommandResult::Failed(err) = result {
                    set.abort_all();
                    return Err(WrapperError::Command(err));
                }
            }
            slots[position] = Some(result.into_block(&self.commands[position]));
        }

        Ok(slots
            .into_iter()
            .zip(self.commands.iter())
            .map(|(slot, spec)| slot.unwrap_or_else(|| aborted_block(spec)))
            .collect())
    }
}

fn aborted_block(spec: &CommandSpec) -> StatusBlock {
    CommandResult::Failed(CommandError::Aborted {
        command: spec.program().to_owned(),
        reason: "no result".to_owned(),
    })
    .into_block(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::TIMED_OUT_TEXT;
    use crate::config::MediaConfig;
    use crate::media::tests::{FixedTitle, StalledTitle};
    use std::time::{Duration, Instant};

    fn scheduler(lines: &[&str], timeout: Duration, policy: ErrorPolicy) -> Scheduler {
        let specs = CommandSpec::parse_all(lines, timeout).unwrap();
        Scheduler::new(specs, policy, None, Bus::new(64))
    }

    fn texts(blocks: &[StatusBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.full_text.as_str()).collect()
    }

    #[tokio::test]
    async fn no_commands_is_identity() {
        let s = scheduler(&[], Duration::from_secs(1), ErrorPolicy::Inline);
        let upstream = vec![StatusBlock::new("a"), StatusBlock::new("b").with_name("x")];
        let merged = s.merge_cycle(1, upstream.clone()).await.unwrap();
        assert_eq!(merged, upstream);
    }

    #[tokio::test]
    async fn order_follows_configuration_not_completion() {
        let s = scheduler(
            &["sleep 0.3", "echo fast", "echo second"],
            Duration::from_secs(5),
            ErrorPolicy::Inline,
        );
        let merged = s.merge_cycle(1, vec![StatusBlock::new("up")]).await.unwrap();
        let instances: Vec<_> = merged.iter().map(|b| b.instance.as_deref()).collect();
        assert_eq!(instances, [Some("sleep"), Some("echo"), Some("echo"), None]);
        assert_eq!(texts(&merged), ["", "fast", "second", "up"]);
    }

    #[tokio::test]
    async fn slow_command_only_costs_its_own_deadline() {
        let s = scheduler(
            &["echo a", "sleep 10", "echo c"],
            Duration::from_millis(200),
            ErrorPolicy::Inline,
        );
        let started = Instant::now();
        let merged = s.merge_cycle(1, Vec::new()).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(texts(&merged), ["a", TIMED_OUT_TEXT, "c"]);
    }

    #[tokio::test]
    async fn failures_stay_in_their_slot_by_default() {
        let s = scheduler(
            &["echo ok", "definitely-not-a-real-command-4821"],
            Duration::from_secs(5),
            ErrorPolicy::Inline,
        );
        let merged = s.merge_cycle(1, vec![StatusBlock::new("up")]).await.unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].full_text, "ok");
        assert!(merged[1].full_text.starts_with("Error: "));
        assert_eq!(merged[1].urgent, Some(true));
        assert_eq!(merged[2].full_text, "up");
    }

    #[tokio::test]
    async fn fatal_policy_aborts_the_cycle() {
        let s = scheduler(&["echo ok", "false"], Duration::from_secs(5), ErrorPolicy::Fatal);
        let err = s.merge_cycle(1, Vec::new()).await.unwrap_err();
        assert!(matches!(err, WrapperError::Command(CommandError::Exit { .. })));
    }

    #[tokio::test]
    async fn timeouts_are_not_fatal() {
        let s = scheduler(&["sleep 10"], Duration::from_millis(100), ErrorPolicy::Fatal);
        let merged = s.merge_cycle(1, Vec::new()).await.unwrap();
        assert_eq!(texts(&merged), [TIMED_OUT_TEXT]);
    }

    #[tokio::test]
    async fn media_block_sits_between_commands_and_upstream() {
        let specs = CommandSpec::parse_all(["echo cmd"], Duration::from_secs(5)).unwrap();
        let media = MediaTitle::new(
            Arc::new(FixedTitle(Ok(Some("Song")))),
            MediaConfig::default(),
            Duration::from_secs(5),
        );
        let s = Scheduler::new(specs, ErrorPolicy::Inline, Some(media), Bus::new(64));

        let merged = s
            .merge_cycle(1, vec![StatusBlock::new("up1"), StatusBlock::new("up2")])
            .await
            .unwrap();
        assert_eq!(texts(&merged), ["cmd", "Song", "up1", "up2"]);
        assert_eq!(merged[1].name.as_deref(), Some("playing"));
    }

    #[tokio::test]
    async fn stalled_title_lookup_does_not_hold_the_cycle() {
        let specs = CommandSpec::parse_all(["echo a"], Duration::from_millis(200)).unwrap();
        let media = MediaTitle::new(
            Arc::new(StalledTitle(Duration::from_secs(3))),
            MediaConfig::default(),
            Duration::from_millis(200),
        );
        let s = Scheduler::new(specs, ErrorPolicy::Inline, Some(media), Bus::new(64));

        let started = Instant::now();
        let merged = s.merge_cycle(1, vec![StatusBlock::new("up")]).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(merged.len(), 3);
        assert!(merged[1].full_text.starts_with("Error: timed out"));
    }

    #[tokio::test]
    async fn positions_are_normalised_to_slots() {
        let t = Duration::from_secs(5);
        let specs = vec![
            CommandSpec::new(7, "echo", ["late".to_owned()], t).unwrap(),
            CommandSpec::new(3, "echo", ["early".to_owned()], t).unwrap(),
            CommandSpec::new(3, "echo", ["tied".to_owned()], t).unwrap(),
        ];
        let s = Scheduler::new(specs, ErrorPolicy::Inline, None, Bus::new(64));

        let merged = s.merge_cycle(1, Vec::new()).await.unwrap();
        assert_eq!(texts(&merged), ["early", "tied", "late"]);
    }

    #[tokio::test]
    async fn panicked_worker_leaves_an_error_block() {
        let s = scheduler(&["echo a", "echo b"], Duration::from_secs(5), ErrorPolicy::Fatal);

        let merged = s
            .collect(1, |spec| async move {
                if spec.position() == 1 {
                    panic!("worker crashed");
                }
                CommandResult::Text("ok".to_owned())
            })
            .await
            .unwrap();

        assert_eq!(merged[0].full_text, "ok");
        assert!(merged[1].full_text.starts_with("Error: "));
        assert_eq!(merged[1].urgent, Some(true));
        assert_eq!(merged[1].instance.as_deref(), Some("echo"));
    }
}
