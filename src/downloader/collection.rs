// CollectionFetcher - playlist fan-out into one folder

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use super::errors::DownloadError;
use super::item::ItemFetcher;
use super::models::CollectionReport;
use super::sanitize::file_stem;
use super::traits::MediaResolver;

#[derive(Clone)]
pub struct CollectionFetcher {
    resolver: Arc<dyn MediaResolver>,
    items: ItemFetcher,
    download_root: PathBuf,
}

impl CollectionFetcher {
    pub fn new(resolver: Arc<dyn MediaResolver>, items: ItemFetcher, download_root: PathBuf) -> Self {
        Self {
            resolver,
            items,
            download_root,
        }
    }

    /// Download every member of playlist `id`.
    ///
    /// Returns once all member tasks have finished, whatever their outcome.
    /// Members share the global slot pool with every other download.
    pub async fn fetch_collection(&self, id: &str) -> Result<CollectionReport, DownloadError> {
        let playlist = self.resolver.resolve_collection(id).await?;

        let folder = self.download_root.join(file_stem(&playlist.title, &playlist.id));
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| DownloadError::storage(&folder, e))?;

        let message = if playlist.author.is_empty() {
            playlist.title.clone()
        } else {
            format!("{} by {}", playlist.title, playlist.author)
        };
        info!(members = playlist.members.len(), "Downloading Playlist {}", message);

        let mut tasks = JoinSet::new();
        for member in playlist.members {
            let items = self.items.clone();
            let folder = folder.clone();
            tasks.spawn(async move { items.fetch_item(&member.id, &folder).await });
        }

        let mut report = CollectionReport {
            total: tasks.len(),
            ..CollectionReport::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(_)) => report.succeeded += 1,
                // Already logged by the item fetcher
                Ok(Err(_)) => report.failed += 1,
                Err(e) => {
                    error!("Playlist member task aborted: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "Playlist Finished {}",
            message
        );
        Ok(report)
    }
}
