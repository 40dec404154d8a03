// TriggerWatcher - feeds the trigger source through the classifier

use tracing::{debug, info};

use super::classifier::classify;
use super::orchestrator::Downloader;
use super::traits::TriggerSource;

/// Counters for one watch session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub seen: usize,
    pub dispatched: usize,
}

/// Consume `source` until it ends, dispatching every recognized link.
///
/// Values are handled strictly in delivery order. Dispatch is non-blocking,
/// so the loop only ever waits on the source itself.
pub async fn watch(source: &mut dyn TriggerSource, downloader: &Downloader) -> WatchSummary {
    let mut summary = WatchSummary::default();

    while let Some(text) = source.next_text().await {
        summary.seen += 1;
        let resource = classify(&text);
        if downloader.on_resource(&resource) {
            summary.dispatched += 1;
        } else {
            debug!(len = text.len(), "Ignoring clipboard text");
        }
    }

    info!(
        seen = summary.seen,
        dispatched = summary.dispatched,
        "Trigger source ended"
    );
    summary
}
