// Common data models for downloader

use serde::{Deserialize, Serialize};

/// What a detected link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A single video
    Item,
    /// A playlist
    Collection,
}

/// Result of classifying a piece of clipboard text.
///
/// An empty `id` means the text did not contain a recognized link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    pub kind: ResourceKind,
}

impl ResourceRef {
    /// The "not a resource" value
    pub fn none() -> Self {
        Self {
            id: String::new(),
            kind: ResourceKind::Item,
        }
    }

    pub fn item(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ResourceKind::Item,
        }
    }

    pub fn collection(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ResourceKind::Collection,
        }
    }

    pub fn is_none(&self) -> bool {
        self.id.is_empty()
    }
}

/// One selectable stream variant of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// e.g. `audio/mp4; codecs="mp4a.40.2"`
    pub mime_type: String,
    pub audio_channels: u32,
    /// Provider-side format id (e.g. "140")
    pub format_id: String,
    /// Direct media URL, when the provider exposes one
    pub url: Option<String>,
}

impl FormatDescriptor {
    pub fn new(mime_type: impl Into<String>, audio_channels: u32) -> Self {
        Self {
            mime_type: mime_type.into(),
            audio_channels,
            format_id: String::new(),
            url: None,
        }
    }
}

/// Resolved metadata of a single video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub id: String,
    pub title: String,
    pub author: String,
    pub formats: Vec<FormatDescriptor>,
}

/// Member of a playlist as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: String,
    pub title: String,
}

/// Resolved metadata of a playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub id: String,
    pub title: String,
    pub author: String,
    pub members: Vec<ItemRef>,
}

/// Outcome of a finished playlist fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}
