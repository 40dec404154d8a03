// Downloader module - clipboard-triggered audio downloads

pub mod backends;
pub mod classifier;
pub mod collection;
pub mod errors;
pub mod format_selector;
pub mod item;
pub mod models;
pub mod orchestrator;
pub mod sanitize;
pub mod slots;
pub mod sources;
pub mod traits;
pub mod utils;
pub mod watcher;

pub use classifier::classify;
pub use collection::CollectionFetcher;
pub use errors::DownloadError;
pub use format_selector::FormatSelector;
pub use item::{ItemDownload, ItemFetcher};
pub use models::{
    CollectionMetadata, CollectionReport, FormatDescriptor, ItemMetadata, ItemRef, ResourceKind,
    ResourceRef,
};
pub use orchestrator::Downloader;
pub use sanitize::sanitize;
pub use slots::{Slot, SlotPool};
pub use traits::{MediaResolver, MediaStream, TriggerSource};
pub use watcher::{watch, WatchSummary};
