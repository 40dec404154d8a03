// Provider and trigger-source trait definitions

use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;

use super::errors::DownloadError;
use super::models::{CollectionMetadata, FormatDescriptor, ItemMetadata};

/// Readable media bytes for one chosen format
pub type MediaStream = Pin<Box<dyn AsyncRead + Send>>;

/// Trait for metadata/stream provider implementations
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Name of the provider (for logging)
    fn name(&self) -> &'static str;

    /// Resolve a single video by id
    async fn resolve_item(&self, id: &str) -> Result<ItemMetadata, DownloadError>;

    /// Resolve a playlist by id
    async fn resolve_collection(&self, id: &str) -> Result<CollectionMetadata, DownloadError>;

    /// Open the byte stream of `format`
    async fn open_stream(
        &self,
        item: &ItemMetadata,
        format: &FormatDescriptor,
    ) -> Result<MediaStream, DownloadError>;
}

/// A sequence of text values, one per change of the watched buffer
#[async_trait]
pub trait TriggerSource: Send {
    /// Next value, or `None` once the source has ended
    async fn next_text(&mut self) -> Option<String>;
}

#[async_trait]
impl TriggerSource for mpsc::Receiver<String> {
    async fn next_text(&mut self) -> Option<String> {
        self.recv().await
    }
}
