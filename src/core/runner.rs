//! # Run one custom command for one cycle.
//!
//! Executes the program of a [`CommandSpec`] with its deadline and publishes lifecycle events to [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   spawn → exit 0          → publish CommandFinished → Text/Block
//!
//! Timeout:
//!   deadline exceeded       → child killed → publish CommandTimedOut → TimedOut
//!
//! Failure:
//!   spawn error / exit != 0 → publish CommandFailed → Failed(err)
//! ```
//!
//! ## Rules
//! - Always publishes `CommandStarting` and **exactly one** terminal event
//! - No shell: arguments are passed verbatim
//! - stdin is closed, stdout is trimmed, stderr only feeds error messages
//! - The child is killed when its wait is abandoned (`kill_on_drop`)

use std::process::Stdio;
use std::time::Instant;

use tokio::{process::Command, time};

use crate::{
    commands::{CommandResult, CommandSpec},
    error::CommandError,
    events::{Bus, Event, EventKind},
};

/// Runs `spec` once and classifies the outcome.
///
/// Never returns an error: timeouts and failures are part of [`CommandResult`] so
/// the caller decides, per [`ErrorPolicy`](crate::ErrorPolicy), what a failure means.
pub async fn run_command(spec: &CommandSpec, cycle: u64, bus: &Bus) -> CommandResult {
    bus.publish(
        Event::new(EventKind::CommandStarting)
            .with_command(spec.program())
            .with_cycle(cycle),
    );

    let started = Instant::now();
    match execute(spec).await {
        Ok(stdout) => {
            bus.publish(
                Event::new(EventKind::CommandFinished)
                    .with_command(spec.program())
                    .with_cycle(cycle)
                    .with_elapsed(started.elapsed()),
            );
            CommandResult::from_output(stdout)
        }
        Err(err) if err.is_timeout() => {
            bus.publish(
                Event::new(EventKind::CommandTimedOut)
                    .with_command(spec.program())
                    .with_cycle(cycle)
                    .with_timeout(spec.timeout()),
            );
            CommandResult::from_error(err)
        }
        Err(err) => {
            bus.publish(
                Event::new(EventKind::CommandFailed)
                    .with_command(spec.program())
                    .with_cycle(cycle)
                    .with_reason(err.to_string()),
            );
            CommandResult::from_error(err)
        }
    }
}

/// Spawns the process and waits for it within the deadline, returning trimmed stdout.
async fn execute(spec: &CommandSpec) -> Result<String, CommandError> {
    let child = Command::new(spec.program())
        .args(spec.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CommandError::Spawn {
            command: spec.program().to_owned(),
            source,
        })?;

    let output = match time::timeout(spec.timeout(), child.wait_with_output()).await {
        Ok(res) => res.map_err(|source| CommandError::Io {
            command: spec.program().to_owned(),
            source,
        })?,
        Err(_elapsed) => {
            return Err(CommandError::Timeout {
                timeout: spec.timeout(),
            });
        }
    };

    if !output.status.success() {
        return Err(CommandError::Exit {
            command: spec.program().to_owned(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::TIMED_OUT_TEXT;
    use std::time::Duration;

    fn spec(line: &str, timeout: Duration) -> CommandSpec {
        CommandSpec::parse(0, line, timeout).unwrap()
    }

    #[tokio::test]
    async fn captures_trimmed_stdout() {
        let bus = Bus::new(16);
        let result = run_command(&spec("echo   hi  ", Duration::from_secs(5)), 1, &bus).await;
        assert!(matches!(result, CommandResult::Text(ref t) if t == "hi"));
    }

    #[tokio::test]
    async fn json_output_becomes_block() {
        let bus = Bus::new(16);
        let result = run_command(
            &spec(r#"echo {"full_text":"ok","color":"red"}"#, Duration::from_secs(5)),
            1,
            &bus,
        )
        .await;
        match result {
            CommandResult::Block(block) => {
                assert_eq!(block.full_text, "ok");
                assert_eq!(block.color.as_deref(), Some("red"));
            }
            other => panic!("expected a block, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_yields_placeholder_without_waiting_for_the_process() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let s = spec("sleep 10", Duration::from_millis(200));

        let started = Instant::now();
        let result = run_command(&s, 4, &bus).await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(result, CommandResult::TimedOut));
        assert_eq!(result.into_block(&s).full_text, TIMED_OUT_TEXT);

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::CommandStarting);
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CommandTimedOut);
        assert_eq!(ev.cycle, Some(4));
        assert_eq!(ev.timeout_ms, Some(200));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let bus = Bus::new(16);
        let result = run_command(
            &spec("definitely-not-a-real-command-4821", Duration::from_secs(1)),
            1,
            &bus,
        )
        .await;
        assert_eq!(result.error().map(CommandError::as_label), Some("command_spawn"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let result = run_command(&spec("false", Duration::from_secs(5)), 2, &bus).await;
        assert_eq!(result.error().map(CommandError::as_label), Some("command_exit"));

        rx.recv().await.unwrap();
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CommandFailed);
        assert!(ev.reason.is_some());
    }
}
