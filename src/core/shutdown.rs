//! # Termination signal handling.
//!
//! [`shutdown_token`] returns a [`CancellationToken`] that is cancelled when the
//! process receives a termination signal; [`Wrapper::run`](crate::Wrapper::run)
//! stops at its next suspension point.
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`
//!
//! **Other platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! `SIGSTOP`/`SIGCONT` sent by i3bar to hide the bar stop the whole
//! process group and need no handling here.

use tokio_util::sync::CancellationToken;

/// Spawns a signal listener and returns the token it cancels.
///
/// Must be called from within a tokio runtime.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(()) => cancel.cancel(),
            Err(err) => tracing::warn!(error = %err, "cannot listen for termination signals"),
        }
    });
    token
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
