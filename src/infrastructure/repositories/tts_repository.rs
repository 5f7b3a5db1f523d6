use crate::domain::conversion::VoiceSettings;
use async_trait::async_trait;
use std::ops::RangeInclusive;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (OpenAI, AWS Polly, etc.)
///
/// One call synthesizes one chunk. Splitting text and merging audio is done
/// by the caller, which sizes chunks with [`max_chunk_chars`](Self::max_chunk_chars).
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize a single chunk of text
    ///
    /// Returns MP3 data for the chunk
    ///
    /// # Arguments
    /// * `text` - Optimized text, at most `max_chunk_chars` characters unless
    ///   a single sentence is longer
    /// * `settings` - Voice, style instructions, speed and detected script
    ///
    /// # Errors
    /// Returns the provider error message; callers match on it for hints
    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, String>;

    /// Largest request the provider accepts, in characters
    fn max_chunk_chars(&self) -> usize;

    /// Speed multipliers the provider can render
    fn speed_range(&self) -> RangeInclusive<f32> {
        0.25..=4.0
    }

    fn provider_name(&self) -> &'static str;
}

/// First characters of a text for log previews, never splitting a character
pub(crate) fn text_preview(text: &str) -> String {
    text.chars().take(200).collect()
}
