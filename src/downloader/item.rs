// ItemFetcher - one video → one .mp3 file

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{error, info};

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::sanitize::file_stem;
use super::slots::SlotPool;
use super::traits::{MediaResolver, MediaStream};

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Finished item download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDownload {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Fetches single items under the shared slot pool
#[derive(Clone)]
pub struct ItemFetcher {
    resolver: Arc<dyn MediaResolver>,
    slots: SlotPool,
    item_timeout: Option<Duration>,
}

impl ItemFetcher {
    pub fn new(
        resolver: Arc<dyn MediaResolver>,
        slots: SlotPool,
        item_timeout: Option<Duration>,
    ) -> Self {
        Self {
            resolver,
            slots,
            item_timeout,
        }
    }

    pub fn slots(&self) -> &SlotPool {
        &self.slots
    }

    /// Download item `id` into `destination`.
    ///
    /// Holds one slot from the moment it is granted until this returns.
    /// Failures are logged here and returned; callers need not log again.
    pub async fn fetch_item(&self, id: &str, destination: &Path) -> Result<ItemDownload, DownloadError> {
        let result = match self.slots.acquire().await {
            Ok(_slot) => match self.item_timeout {
                Some(limit) => tokio::time::timeout(limit, self.transfer(id, destination))
                    .await
                    .unwrap_or(Err(DownloadError::Timeout {
                        secs: limit.as_secs(),
                    })),
                None => self.transfer(id, destination).await,
            },
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!(id, provider = self.resolver.name(), "Download failed: {}", e);
        }
        result
    }

    async fn transfer(&self, id: &str, destination: &Path) -> Result<ItemDownload, DownloadError> {
        let item = self.resolver.resolve_item(id).await?;

        let format = FormatSelector::select(&item.formats)
            .ok_or_else(|| DownloadError::Resolution(format!("{} has no formats", item.id)))?
            .clone();

        info!("Downloading {} by '{}'", item.title, item.author);

        let stream = self.resolver.open_stream(&item, &format).await?;

        let path = destination.join(format!("{}.mp3", file_stem(&item.title, &item.id)));
        let file = File::create(&path)
            .await
            .map_err(|e| DownloadError::storage(&path, e))?;
        let bytes = copy_stream(stream, file, &path).await?;

        info!(bytes, "Finished {} by '{}'", item.title, item.author);
        Ok(ItemDownload { path, bytes })
    }
}

/// Copy until EOF, telling read errors apart from write errors
async fn copy_stream(mut stream: MediaStream, mut file: File, path: &Path) -> Result<u64, DownloadError> {
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| DownloadError::Stream(e.to_string()))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .await
            .map_err(|e| DownloadError::storage(path, e))?;
        total += n as u64;
    }

    file.flush().await.map_err(|e| DownloadError::storage(path, e))?;
    Ok(total)
}
