// Process configuration loaded once from config.json

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::downloader::utils::expand_home;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Immutable settings shared by the orchestrator and fetchers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Concurrency cap for item downloads (slot pool size)
    pub max_concurrent_downloads: usize,
    pub log_path: PathBuf,
    /// Single items land here; playlists get a subfolder
    pub download_root: PathBuf,
    /// Per-item deadline while holding a slot; 0 disables
    pub item_timeout_secs: u64,
    /// Proxy for yt-dlp and the HTTP client (e.g. "socks5h://127.0.0.1:1080")
    pub proxy: Option<String>,
    pub clipboard_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 5,
            log_path: PathBuf::from("./log.log"),
            download_root: PathBuf::from("."),
            item_timeout_secs: 900,
            proxy: None,
            clipboard_poll_ms: 500,
        }
    }
}

/// Configuration plus the notes produced while loading it.
///
/// Notes are returned rather than logged because the log sink itself
/// depends on the loaded `log_path`.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

/// Load `path`, falling back to defaults file-wide or field by field
pub fn load(path: &Path) -> LoadedConfig {
    let mut notes = Vec::new();
    let mut warnings = Vec::new();

    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            notes.push(format!("{} not found, using default values...", path.display()));
            return LoadedConfig {
                config: Config::default(),
                notes,
                warnings,
            };
        }
        Err(e) => {
            warnings.push(format!("Cannot read {}: {}, using default values", path.display(), e));
            return LoadedConfig {
                config: Config::default(),
                notes,
                warnings,
            };
        }
    };

    notes.push(format!("Found {} file!", path.display()));
    let config = parse(&data, &mut warnings);
    LoadedConfig {
        config,
        notes,
        warnings,
    }
}

/// Parse JSON text; every problem is pushed to `warnings`
pub fn parse(data: &str, warnings: &mut Vec<String>) -> Config {
    let defaults = Config::default();

    let object = match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warnings.push("Configuration is not a JSON object, using default values".to_string());
            return defaults;
        }
        Err(e) => {
            warnings.push(format!("Malformed configuration ({}), using default values", e));
            return defaults;
        }
    };

    let max_concurrent_downloads = field(&object, &["maxConcurrentDownloads", "MaxDownloads"], warnings)
        .and_then(|n: usize| positive(n, "maxConcurrentDownloads", warnings))
        .unwrap_or(defaults.max_concurrent_downloads);

    let log_path = field(&object, &["logPath", "LogPath"], warnings)
        .and_then(|s: String| non_empty(s, "logPath", warnings))
        .map(|s| expand_home(&s))
        .unwrap_or(defaults.log_path);

    let download_root = field(&object, &["downloadRoot", "DownloadPath"], warnings)
        .and_then(|s: String| non_empty(s, "downloadRoot", warnings))
        .map(|s| expand_home(&s))
        .unwrap_or(defaults.download_root);

    let item_timeout_secs = field(&object, &["itemTimeoutSecs"], warnings)
        .unwrap_or(defaults.item_timeout_secs);

    let proxy = field::<Option<String>>(&object, &["proxy"], warnings)
        .unwrap_or(defaults.proxy)
        .filter(|p| !p.trim().is_empty());

    let clipboard_poll_ms = field(&object, &["clipboardPollMs"], warnings)
        .and_then(|n: u64| positive(n, "clipboardPollMs", warnings))
        .unwrap_or(defaults.clipboard_poll_ms);

    Config {
        max_concurrent_downloads,
        log_path,
        download_root,
        item_timeout_secs,
        proxy,
        clipboard_poll_ms,
    }
}

/// First present key among `keys`, decoded as `T`
fn field<T: DeserializeOwned>(object: &Map<String, Value>, keys: &[&str], warnings: &mut Vec<String>) -> Option<T> {
    let (key, value) = keys
        .iter()
        .find_map(|k| object.get(*k).map(|v| (*k, v)))?;

    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warnings.push(format!("Invalid value for {}: {} ({}), using default", key, value, e));
            None
        }
    }
}

fn positive<T: PartialEq + Default>(n: T, key: &str, warnings: &mut Vec<String>) -> Option<T> {
    if n == T::default() {
        warnings.push(format!("{} must be greater than 0, using default", key));
        None
    } else {
        Some(n)
    }
}

fn non_empty(s: String, key: &str, warnings: &mut Vec<String>) -> Option<String> {
    if s.trim().is_empty() {
        warnings.push(format!("{} is empty, using default", key));
        None
    } else {
        Some(s)
    }
}
