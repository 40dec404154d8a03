// Error types for the download pipeline

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Provider could not resolve an item or collection
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// Opening or reading the media stream failed
    #[error("Stream failed: {0}")]
    Stream(String),

    /// Creating a directory or file, or writing to it, failed
    #[error("Storage failed at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// yt-dlp not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Failed to parse provider output
    #[error("Parse error: {0}")]
    Parse(String),

    /// Work on a single item ran past its deadline
    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The slot pool was closed while the task was still queued
    #[error("Download pool is shutting down")]
    Shutdown,
}

impl DownloadError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Classify the stderr of a failed yt-dlp run.
    ///
    /// yt-dlp prefixes fatal messages with `ERROR:`; the last such line is
    /// kept, otherwise the whole trimmed text.
    pub fn from_stderr(stderr: &str) -> Self {
        let message = stderr
            .lines()
            .rev()
            .find(|l| l.starts_with("ERROR:"))
            .unwrap_or(stderr)
            .trim();

        if message.contains("Unable to extract") && message.contains("JSON") {
            return Self::Parse(message.to_string());
        }
        Self::Resolution(message.to_string())
    }
}
