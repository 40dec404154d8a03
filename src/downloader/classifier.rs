// URL classification for clipboard text

use super::models::ResourceRef;

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=";
const SHORT_VIDEO_URL: &str = "https://youtu.be/";
const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=";

/// Classify free text into an item link, a playlist link, or nothing.
///
/// Matching is by containment, so a link surrounded by other text still
/// counts. Shapes are tried in order: long video link, short video link,
/// playlist link.
pub fn classify(text: &str) -> ResourceRef {
    if let Some(id) = id_after(text, VIDEO_URL) {
        ResourceRef::item(id)
    } else if let Some(id) = id_after(text, SHORT_VIDEO_URL) {
        ResourceRef::item(id)
    } else if let Some(id) = id_after(text, PLAYLIST_URL) {
        ResourceRef::collection(id)
    } else {
        ResourceRef::none()
    }
}

/// Everything after the first `marker`, unmodified.
fn id_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.split_once(marker).map(|(_, rest)| rest)
}
