use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use i3status_wrapper::{
    CommandSpec, Config, LogWriter, Subscribe, Wrapper, WrapperBuilder, cli::Args, logging,
    shutdown_token,
};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let (cfg, commands) = args.into_parts().context("invalid configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let res = runtime.block_on(serve(cfg, commands));

    // A blocked stdin read would otherwise keep the process alive after a signal.
    runtime.shutdown_timeout(Duration::from_millis(100));
    res
}

async fn serve(cfg: Config, commands: Vec<CommandSpec>) -> Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let builder = Wrapper::builder(cfg.clone())
        .with_commands(commands)
        .with_subscribers(subs);
    let wrapper = with_media(builder, &cfg).await.build();

    let res = wrapper
        .run(tokio::io::stdin(), tokio::io::stdout(), shutdown_token())
        .await;
    wrapper.shutdown().await;

    if let Err(err) = &res {
        tracing::error!(label = err.as_label(), error = %err, "wrapper stopped");
    }
    Ok(res?)
}

/// Connects to the session bus up front so a missing bus is reported at startup.
#[cfg(feature = "mpris")]
async fn with_media(builder: WrapperBuilder, cfg: &Config) -> WrapperBuilder {
    use i3status_wrapper::MprisTitleSource;

    if cfg.media.is_none() {
        return builder;
    }
    let source = Arc::new(MprisTitleSource::new());
    if let Err(err) = source.connection().await {
        tracing::warn!(error = %err, "session bus unavailable, retrying every cycle");
    }
    builder.with_title_source(source)
}

#[cfg(not(feature = "mpris"))]
async fn with_media(builder: WrapperBuilder, _cfg: &Config) -> WrapperBuilder {
    builder
}
