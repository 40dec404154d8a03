// Orchestrator - dispatches detected links as detached download tasks

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::config::Config;

use super::collection::CollectionFetcher;
use super::item::ItemFetcher;
use super::models::{ResourceKind, ResourceRef};
use super::slots::SlotPool;
use super::traits::MediaResolver;

pub struct Downloader {
    items: ItemFetcher,
    collections: CollectionFetcher,
    download_root: PathBuf,
    tasks: TaskTracker,
}

impl Downloader {
    pub fn new(config: &Config, resolver: Arc<dyn MediaResolver>) -> Self {
        let slots = SlotPool::new(config.max_concurrent_downloads);
        let item_timeout = match config.item_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let items = ItemFetcher::new(Arc::clone(&resolver), slots, item_timeout);
        let collections =
            CollectionFetcher::new(resolver, items.clone(), config.download_root.clone());

        Self {
            items,
            collections,
            download_root: config.download_root.clone(),
            tasks: TaskTracker::new(),
        }
    }

    /// Start downloading `resource` in the background.
    ///
    /// Never waits on the download. Returns `false` for the "not a resource"
    /// value, which is ignored.
    pub fn on_resource(&self, resource: &ResourceRef) -> bool {
        if resource.is_none() {
            return false;
        }

        let id = resource.id.clone();
        match resource.kind {
            ResourceKind::Collection => {
                info!(id = %id, "Detected playlist");
                let collections = self.collections.clone();
                self.tasks.spawn(async move {
                    if let Err(e) = collections.fetch_collection(&id).await {
                        error!(id = %id, "Playlist failed: {}", e);
                    }
                });
            }
            ResourceKind::Item => {
                info!(id = %id, "Detected video");
                let items = self.items.clone();
                let root = self.download_root.clone();
                self.tasks.spawn(async move {
                    // Failure details are logged inside fetch_item
                    if let Ok(done) = items.fetch_item(&id, &root).await {
                        debug!(id = %id, bytes = done.bytes, "Video job done");
                    }
                });
            }
        }
        true
    }

    pub fn slots(&self) -> &SlotPool {
        self.items.slots()
    }

    /// Number of dispatched jobs that have not finished yet
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every dispatched job to finish
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Stop granting slots. Jobs still queued fail with a shutdown error.
    pub fn shutdown(&self) {
        self.slots().close();
    }
}
