// In-process provider for exercising the download pipeline without network

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, Write};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::Sleep;
use tracing_subscriber::fmt::MakeWriter;

use tubemp3_lib::downloader::{
    CollectionMetadata, DownloadError, FormatDescriptor, ItemMetadata, ItemRef, MediaResolver,
    MediaStream,
};

/// How a fake item behaves when fetched
#[derive(Debug, Clone)]
pub enum Behavior {
    Ok { title: String, body: Vec<u8> },
    FailResolve,
    FailOpen,
    BrokenStream,
    NoFormats,
    Hang,
}

pub fn ok(title: &str, body: &[u8]) -> Behavior {
    Behavior::Ok {
        title: title.to_string(),
        body: body.to_vec(),
    }
}

/// Scripted provider.
///
/// An item counts as active from the start of its resolution until the
/// stream handed out for it is dropped (or until resolution fails), so
/// `peak` covers the whole time a download holds its slot.
#[derive(Default)]
pub struct FakeResolver {
    items: Mutex<HashMap<String, Behavior>>,
    collections: Mutex<HashMap<String, CollectionMetadata>>,
    resolve_delay: Mutex<HashMap<String, Duration>>,
    default_delay: Duration,
    stream_delay: Mutex<Duration>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    resolved: Mutex<HashMap<String, Vec<ActiveGuard>>>,
    resolve_calls: AtomicUsize,
    finished: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            default_delay: delay,
            ..Self::default()
        }
    }

    pub fn item(&self, id: &str, behavior: Behavior) -> &Self {
        self.items.lock().unwrap().insert(id.to_string(), behavior);
        self
    }

    pub fn delay(&self, id: &str, delay: Duration) -> &Self {
        self.resolve_delay.lock().unwrap().insert(id.to_string(), delay);
        self
    }

    /// Hold every stream back for `delay` before its first byte
    pub fn stream_delay(&self, delay: Duration) -> &Self {
        *self.stream_delay.lock().unwrap() = delay;
        self
    }

    pub fn collection(&self, id: &str, title: &str, members: &[&str]) -> &Self {
        let meta = CollectionMetadata {
            id: id.to_string(),
            title: title.to_string(),
            author: "Tester".to_string(),
            members: members
                .iter()
                .map(|m| ItemRef {
                    id: m.to_string(),
                    title: String::new(),
                })
                .collect(),
        };
        self.collections.lock().unwrap().insert(id.to_string(), meta);
        self
    }

    /// Highest number of items seen in flight at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Items currently between resolution start and stream drop
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Item ids in the order their resolution finished
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

#[derive(Debug)]
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn enter(active: &Arc<AtomicUsize>, peak: &AtomicUsize) -> Self {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(active))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaResolver for FakeResolver {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn resolve_item(&self, id: &str) -> Result<ItemMetadata, DownloadError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard::enter(&self.active, &self.peak);

        let behavior = self.items.lock().unwrap().get(id).cloned();
        let delay = self
            .resolve_delay
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(self.default_delay);

        if matches!(behavior, Some(Behavior::Hang)) {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(delay).await;
        self.finished.lock().unwrap().push(id.to_string());

        let no_formats = matches!(behavior, Some(Behavior::NoFormats));
        let title = match behavior {
            None | Some(Behavior::FailResolve) => {
                return Err(DownloadError::Resolution(format!("{id}: Video unavailable")))
            }
            Some(Behavior::Ok { title, .. }) => title,
            Some(_) => format!("title of {id}"),
        };
        let formats = if no_formats {
            // No stream will be opened; the guard ends here
            Vec::new()
        } else {
            self.resolved
                .lock()
                .unwrap()
                .entry(id.to_string())
                .or_default()
                .push(guard);
            vec![
                FormatDescriptor::new("video/mp4; codecs=\"avc1\"", 0),
                FormatDescriptor::new("audio/mp4; codecs=\"mp4a.40.2\"", 2),
            ]
        };

        Ok(ItemMetadata {
            id: id.to_string(),
            title,
            author: "Tester".to_string(),
            formats,
        })
    }

    async fn resolve_collection(&self, id: &str) -> Result<CollectionMetadata, DownloadError> {
        self.collections
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| DownloadError::Resolution(format!("{id}: playlist does not exist")))
    }

    async fn open_stream(
        &self,
        item: &ItemMetadata,
        format: &FormatDescriptor,
    ) -> Result<MediaStream, DownloadError> {
        assert!(format.mime_type.starts_with("audio/mp4"), "selector picked {format:?}");
        let guard = self
            .resolved
            .lock()
            .unwrap()
            .get_mut(&item.id)
            .and_then(Vec::pop);
        let delay = *self.stream_delay.lock().unwrap();

        let behavior = self.items.lock().unwrap().get(&item.id).cloned();
        match behavior {
            Some(Behavior::Ok { body, .. }) => Ok(Box::pin(Tracked::new(io::Cursor::new(body), delay, guard))),
            Some(Behavior::BrokenStream) => Ok(Box::pin(Tracked::new(BrokenStream, delay, guard))),
            _ => Err(DownloadError::Stream(format!("{}: 403 Forbidden", item.id))),
        }
    }
}

/// Stream that keeps its item active until dropped
struct Tracked<R> {
    inner: R,
    start: Option<Pin<Box<Sleep>>>,
    _guard: Option<ActiveGuard>,
}

impl<R> Tracked<R> {
    fn new(inner: R, delay: Duration, guard: Option<ActiveGuard>) -> Self {
        Self {
            inner,
            start: (!delay.is_zero()).then(|| Box::pin(tokio::time::sleep(delay))),
            _guard: guard,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for Tracked<R> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if let Some(start) = this.start.as_mut() {
            if start.as_mut().poll(cx).is_pending() {
                return Poll::Pending;
            }
            this.start = None;
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

/// Reader that fails on first read
struct BrokenStream;

impl AsyncRead for BrokenStream {
    fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")))
    }
}

/// In-memory log sink for asserting on emitted lines
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install as the thread's default subscriber until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
