//! OpenAI text-to-speech API implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::TtsEngine;

/// Supported OpenAI speech synthesis models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TtsModel {
    #[default]
    #[serde(rename = "tts-1")]
    Tts1,
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
    #[serde(rename = "gpt-4o-mini-tts")]
    Gpt4oMiniTts,
}

impl TtsModel {
    pub fn api_model_name(&self) -> &'static str {
        match self {
            TtsModel::Tts1 => "tts-1",
            TtsModel::Tts1Hd => "tts-1-hd",
            TtsModel::Gpt4oMiniTts => "gpt-4o-mini-tts",
        }
    }
}

/// Voices offered by the OpenAI speech endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsVoice {
    Alloy,
    Echo,
    Fable,
    #[default]
    Onyx,
    Nova,
    Shimmer,
}

impl TtsVoice {
    pub fn api_name(&self) -> &'static str {
        match self {
            TtsVoice::Alloy => "alloy",
            TtsVoice::Echo => "echo",
            TtsVoice::Fable => "fable",
            TtsVoice::Onyx => "onyx",
            TtsVoice::Nova => "nova",
            TtsVoice::Shimmer => "shimmer",
        }
    }
}

/// Synthesizes speech through the OpenAI speech endpoint. Responses are MP3.
pub struct OpenAiTts {
    client: reqwest::Client,
    api_key: String,
    model: TtsModel,
    voice: TtsVoice,
    speed: f32,
}

impl OpenAiTts {
    pub fn new(api_key: String, model: TtsModel, voice: TtsVoice, speed: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            voice,
            speed,
        }
    }
}

#[async_trait]
impl TtsEngine for OpenAiTts {
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>> {
        if text.is_empty() {
            return Err(anyhow::anyhow!("Text input is required for synthesis"));
        }

        #[derive(Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = SpeechRequest {
            model: self.model.api_model_name(),
            input: text,
            voice: self.voice.api_name(),
            speed: self.speed,
        };

        tracing::debug!(
            "Synthesizing {} characters with {} ({})",
            text.len(),
            self.model.api_model_name(),
            self.voice.api_name()
        );

        let response = match self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .bearer_auth(&self.api_key)
            .json(&request)
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
                401 => "OpenAI API key is invalid or expired. Set OPENAI_API_KEY or run 'voxkiosk auth set-key' to update it.".to_string(),
                429 => "Too many requests to OpenAI. You've hit the API rate limit. Please wait and try again.".to_string(),
                500 | 502 | 503 | 504 => "OpenAI API server is experiencing issues. Please try again later.".to_string(),
                _ => format!("OpenAI API error (status {status}): {error_body}"),
            };

            return Err(anyhow::anyhow!(human_readable));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(anyhow::anyhow!("OpenAI returned an empty audio payload"));
        }

        tracing::debug!("Synthesized {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }
}
