pub mod cli;
pub mod config;
pub mod downloader;
pub mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use cli::{Cli, SourceKind};
use downloader::backends::YtDlpResolver;
use downloader::sources::StdinSource;
use downloader::{watch, Downloader, TriggerSource};

/// Load configuration, start logging, and watch the trigger source until it
/// ends or the process is interrupted.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let loaded = config::load(&cli.config);
    let config = cli.apply(loaded.config);

    let _log_guard = logging::init(&config.log_path).context("init logging")?;
    for note in &loaded.notes {
        info!("{}", note);
    }
    for warning in &loaded.warnings {
        warn!("{}", warning);
    }
    info!(
        "Configuration: {}",
        serde_json::to_string(&config).unwrap_or_else(|_| format!("{:?}", config))
    );

    let resolver = Arc::new(YtDlpResolver::new(&config).context("init provider")?);
    let downloader = Downloader::new(&config, resolver);

    let mut source: Box<dyn TriggerSource> = match cli.source {
        SourceKind::Clipboard => clipboard_source(Duration::from_millis(config.clipboard_poll_ms))?,
        SourceKind::Stdin => Box::new(StdinSource::new()),
    };

    info!("tubemp3 is running...");
    info!("start copying (CTRL + C) your youtube videos and playlists");

    tokio::select! {
        _ = watch(source.as_mut(), &downloader) => {
            info!(pending = downloader.pending(), "Waiting for running downloads");
            downloader.drain().await;
        }
        res = tokio::signal::ctrl_c() => {
            res.context("listen for ctrl-c")?;
            info!(pending = downloader.pending(), "Interrupted, stopping");
            downloader.shutdown();
        }
    }

    Ok(())
}

#[cfg(feature = "clipboard")]
fn clipboard_source(poll: Duration) -> anyhow::Result<Box<dyn TriggerSource>> {
    let source = downloader::sources::ClipboardSource::spawn(poll)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "clipboard"))]
fn clipboard_source(_poll: Duration) -> anyhow::Result<Box<dyn TriggerSource>> {
    anyhow::bail!("built without clipboard support; use --source stdin")
}
