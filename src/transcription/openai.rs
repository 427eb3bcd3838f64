//! OpenAI transcription API implementation.
//!
//! Sends the recorded WAV as multipart form data with bearer token
//! authentication and returns the plain transcript text.

use async_trait::async_trait;
use serde::Deserialize;

use super::{SttModel, Transcriber};
use crate::recording::RecordedAudio;

/// OpenAI API response wrapper
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    text: String,
}

/// Transcribes recordings through the OpenAI audio transcription endpoint.
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    api_key: String,
    model: SttModel,
    /// Script keywords passed as the transcription prompt to bias recognition
    /// toward the kiosk vocabulary
    keywords: Vec<String>,
}

impl OpenAiTranscriber {
    pub fn new(api_key: String, model: SttModel, keywords: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            keywords,
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, audio: &RecordedAudio) -> anyhow::Result<String> {
        let file_part = reqwest::multipart::Part::bytes(audio.wav.clone())
            .file_name("question.wav")
            .mime_str("audio/wav")
            .map_err(|e| anyhow::anyhow!("Failed to create file part for upload: {e}"))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.api_model_name().to_string());

        // Keywords guide transcription context so domain terms come through
        // intact; not every model accepts the parameter.
        if !self.keywords.is_empty() {
            if self.model.supports_prompt() {
                let prompt = self.keywords.join(", ");
                tracing::debug!("Keywords used as transcription prompt: {prompt}");
                form = form.text("prompt", prompt);
            } else {
                tracing::debug!(
                    "Model {} does not support the prompt parameter, keywords skipped",
                    self.model.api_model_name()
                );
            }
        }

        let endpoint = self.model.endpoint();
        let url = format!("{endpoint}?response_format=json");

        tracing::debug!(
            "Transcribing {:.2}s of audio with {} ({} bytes)",
            audio.duration_secs,
            self.model.api_model_name(),
            audio.wav.len()
        );

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    "Failed to connect to OpenAI API server. Check your internet connection."
                        .to_string()
                } else if e.is_timeout() {
                    "Request to OpenAI timed out. The API server is not responding.".to_string()
                } else {
                    format!("OpenAI network error: {e}")
                };
                return Err(anyhow::anyhow!(error_msg));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let human_readable = match status.as_u16() {
                400 => format!(
                    "OpenAI rejected the audio (status 400). The recording may be empty or malformed: {error_body}"
                ),
                401 => "OpenAI API key is invalid or expired. Set OPENAI_API_KEY or run 'voxkiosk auth set-key' to update it.".to_string(),
                403 => "You don't have permission to use OpenAI's API. Check your API key and account status.".to_string(),
                429 => "Too many requests to OpenAI. You've hit the API rate limit. Please wait and try again.".to_string(),
                500 | 502 | 503 | 504 => "OpenAI API server is experiencing issues. Please try again later.".to_string(),
                _ => format!("OpenAI API error (status {status}): {error_body}"),
            };

            return Err(anyhow::anyhow!(human_readable));
        }

        let transcription: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse OpenAI response: {e}"))?;

        tracing::debug!(
            "Transcription completed: {} characters",
            transcription.text.len()
        );

        Ok(transcription.text.trim().to_string())
    }
}
