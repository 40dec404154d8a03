// Trigger sources: desktop clipboard and stdin

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use super::traits::TriggerSource;

/// One trigger per non-empty stdin line
pub struct StdinSource {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TriggerSource for StdinSource {
    async fn next_text(&mut self) -> Option<String> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Some(line),
                Ok(None) => return None,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    return None;
                }
            }
        }
    }
}

#[cfg(feature = "clipboard")]
pub use clipboard::ClipboardSource;

#[cfg(feature = "clipboard")]
mod clipboard {
    use std::thread;
    use std::time::Duration;

    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tracing::{debug, warn};

    use crate::downloader::traits::TriggerSource;

    const CHANNEL_CAPACITY: usize = 64;

    /// Polls the desktop clipboard and yields its text whenever it changes.
    ///
    /// The text present at startup is not reported.
    pub struct ClipboardSource {
        rx: mpsc::Receiver<String>,
    }

    impl ClipboardSource {
        pub fn spawn(poll_interval: Duration) -> Result<Self> {
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<(), String>>(1);

            // The clipboard handle lives entirely on the poller thread
            thread::Builder::new()
                .name("clipboard-watch".to_string())
                .spawn(move || {
                    let mut clip = match arboard::Clipboard::new() {
                        Ok(clip) => {
                            let _ = ready_tx.send(Ok(()));
                            clip
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e.to_string()));
                            return;
                        }
                    };
                    poll(&mut clip, poll_interval, tx);
                })
                .context("spawn clipboard poller")?;

            ready_rx
                .recv()
                .context("clipboard poller exited during startup")?
                .map_err(anyhow::Error::msg)
                .context("init clipboard")?;

            Ok(Self { rx })
        }
    }

    fn poll(clip: &mut arboard::Clipboard, poll_interval: Duration, tx: mpsc::Sender<String>) {
        let mut last = clip.get_text().ok();
        loop {
            thread::sleep(poll_interval);
            if tx.is_closed() {
                debug!("Clipboard consumer gone, stopping poller");
                return;
            }

            let text = match clip.get_text() {
                Ok(text) => text,
                // Non-text content or a transient lock
                Err(_) => continue,
            };
            if last.as_deref() == Some(text.as_str()) || text.trim().is_empty() {
                continue;
            }
            last = Some(text.clone());

            if tx.blocking_send(text).is_err() {
                return;
            }
        }
    }

    #[async_trait]
    impl TriggerSource for ClipboardSource {
        async fn next_text(&mut self) -> Option<String> {
            let text = self.rx.recv().await;
            if text.is_none() {
                warn!("Clipboard poller stopped");
            }
            text
        }
    }
}
