// yt-dlp provider - metadata from `yt-dlp --dump-single-json`, bytes over HTTP
//
// yt-dlp does the extraction work (signatures, player clients); the chosen
// format's direct URL is then streamed with reqwest so the copy loop owns the
// bytes and the slot accounting stays in this process.

use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value;
use tokio::process::Command;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::config::Config;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{CollectionMetadata, FormatDescriptor, ItemMetadata, ItemRef};
use crate::downloader::traits::{MediaResolver, MediaStream};
use crate::downloader::utils::find_ytdlp;

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=";
const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=";
const RESOLVE_TIMEOUT_SECS: u64 = 120;
const SOCKET_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

pub struct YtDlpResolver {
    ytdlp_path: String,
    proxy: Option<String>,
    http: reqwest::Client,
}

impl YtDlpResolver {
    pub fn new(config: &Config) -> Result<Self, DownloadError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(SOCKET_TIMEOUT_SECS));

        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| DownloadError::Stream(format!("Invalid proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| DownloadError::Stream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            ytdlp_path: find_ytdlp(),
            proxy: config.proxy.clone(),
            http,
        })
    }

    /// Build yt-dlp arguments for a metadata dump
    fn build_args(&self, url: &str, playlist: bool) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            if playlist { "--flat-playlist" } else { "--no-playlist" }.to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            SOCKET_TIMEOUT_SECS.to_string(),
        ];

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(url.to_string());
        args
    }

    async fn dump_json(&self, url: &str, playlist: bool) -> Result<Value, DownloadError> {
        let args = self.build_args(url, playlist);
        debug!("{} {}", self.ytdlp_path, args.join(" "));

        let out = run_tool(&self.ytdlp_path, &args, RESOLVE_TIMEOUT_SECS).await?;
        if !out.status.success() {
            return Err(DownloadError::from_stderr(&String::from_utf8_lossy(&out.stderr)));
        }

        serde_json::from_slice(&out.stdout)
            .map_err(|e| DownloadError::Parse(format!("Invalid JSON from yt-dlp: {}", e)))
    }
}

/// Run `program` to completion, collecting stdout and stderr.
///
/// The child is killed when the deadline passes (the output future is
/// dropped and `kill_on_drop` takes effect).
async fn run_tool(program: &str, args: &[String], timeout_secs: u64) -> Result<Output, DownloadError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DownloadError::ToolNotFound(format!("Failed to start {}: {}", program, e)))?;

    match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(out) => out.map_err(|e| DownloadError::Resolution(format!("{} did not finish: {}", program, e))),
        Err(_) => Err(DownloadError::Timeout { secs: timeout_secs }),
    }
}

/// Parse a single-video dump
pub fn parse_item(json: &Value) -> Result<ItemMetadata, DownloadError> {
    let id = json["id"]
        .as_str()
        .ok_or_else(|| DownloadError::Parse("No id in yt-dlp JSON".to_string()))?;

    let formats_array = json["formats"]
        .as_array()
        .ok_or_else(|| DownloadError::Parse("No formats array in JSON".to_string()))?;

    Ok(ItemMetadata {
        id: id.to_string(),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        author: author_of(json),
        formats: formats_array.iter().map(parse_format).collect(),
    })
}

/// Parse a `--flat-playlist` dump
pub fn parse_collection(json: &Value) -> Result<CollectionMetadata, DownloadError> {
    let id = json["id"]
        .as_str()
        .ok_or_else(|| DownloadError::Parse("No id in yt-dlp JSON".to_string()))?;

    let members = json["entries"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| {
                    let id = e["id"].as_str()?;
                    Some(ItemRef {
                        id: id.to_string(),
                        title: e["title"].as_str().unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(CollectionMetadata {
        id: id.to_string(),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        author: author_of(json),
        members,
    })
}

fn author_of(json: &Value) -> String {
    json["uploader"]
        .as_str()
        .or_else(|| json["channel"].as_str())
        .unwrap_or("")
        .to_string()
}

fn parse_format(f: &Value) -> FormatDescriptor {
    let vcodec = f["vcodec"].as_str().unwrap_or("none");
    let acodec = f["acodec"].as_str().unwrap_or("none");
    let ext = f["ext"].as_str().unwrap_or("");

    let container = match ext {
        "m4a" | "mp4" => "mp4",
        other => other,
    };
    let major = if vcodec == "none" { "audio" } else { "video" };
    let mime_type = if acodec != "none" && vcodec == "none" {
        format!("{}/{}; codecs=\"{}\"", major, container, acodec)
    } else if vcodec != "none" {
        format!("{}/{}; codecs=\"{}\"", major, container, vcodec)
    } else {
        format!("{}/{}", major, container)
    };

    let audio_channels = if acodec == "none" {
        0
    } else {
        f["audio_channels"].as_u64().unwrap_or(0) as u32
    };

    FormatDescriptor {
        mime_type,
        audio_channels,
        format_id: f["format_id"].as_str().unwrap_or("").to_string(),
        url: f["url"].as_str().map(|s| s.to_string()),
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn resolve_item(&self, id: &str) -> Result<ItemMetadata, DownloadError> {
        let json = self.dump_json(&format!("{}{}", VIDEO_URL, id), false).await?;
        parse_item(&json)
    }

    async fn resolve_collection(&self, id: &str) -> Result<CollectionMetadata, DownloadError> {
        let json = self.dump_json(&format!("{}{}", PLAYLIST_URL, id), true).await?;
        parse_collection(&json)
    }

    async fn open_stream(
        &self,
        item: &ItemMetadata,
        format: &FormatDescriptor,
    ) -> Result<MediaStream, DownloadError> {
        let url = format.url.as_deref().ok_or_else(|| {
            DownloadError::Stream(format!("Format {} of {} has no direct URL", format.format_id, item.id))
        })?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DownloadError::Stream(e.to_string()))?;

        let body = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        Ok(Box::pin(StreamReader::new(body)))
    }
}
