// FormatSelector - picks the stream variant to save
//
// Prefers the first audio-only MP4 variant that actually carries audio.
// Falls back to the first variant the provider listed.

use super::models::FormatDescriptor;

const AUDIO_CONTAINER: &str = "audio/mp4";

/// Format selector with audio-only preference
pub struct FormatSelector;

impl FormatSelector {
    /// Choose a variant from `formats`, or `None` if the list is empty.
    pub fn select(formats: &[FormatDescriptor]) -> Option<&FormatDescriptor> {
        formats
            .iter()
            .find(|f| Self::is_audio(f))
            .or_else(|| formats.first())
    }

    /// Audio-capable container with at least one channel
    pub fn is_audio(format: &FormatDescriptor) -> bool {
        format.audio_channels > 0 && format.mime_type.contains(AUDIO_CONTAINER)
    }
}
