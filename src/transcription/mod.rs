//! Transcription service for audio-to-text conversion.
//!
//! The pipeline talks to a `Transcriber`; the OpenAI implementation posts the
//! recorded WAV to the transcription endpoint. The trait seam keeps the
//! pipeline testable without network access.

pub mod model;
pub mod openai;

pub use model::SttModel;
pub use openai::OpenAiTranscriber;

use async_trait::async_trait;

use crate::recording::RecordedAudio;

/// Converts a completed recording into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes the recording, returning the plain transcript text.
    ///
    /// # Errors
    /// - If the API request fails due to network issues (connection, timeout)
    /// - If the API returns an HTTP error (401 for invalid key, 429 for rate limit, etc.)
    /// - If the API response cannot be parsed
    async fn transcribe(&self, audio: &RecordedAudio) -> anyhow::Result<String>;
}
