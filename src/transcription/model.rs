//! Transcription model definitions and metadata.

use serde::{Deserialize, Serialize};

/// Supported OpenAI transcription models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SttModel {
    /// Whisper (legacy, supports the prompt parameter)
    #[default]
    #[serde(rename = "whisper-1")]
    Whisper,
    /// GPT-4o Transcribe (latest, best accuracy)
    #[serde(rename = "gpt-4o-transcribe")]
    Gpt4oTranscribe,
    /// GPT-4o Mini Transcribe (faster, lighter)
    #[serde(rename = "gpt-4o-mini-transcribe")]
    Gpt4oMiniTranscribe,
}

impl SttModel {
    /// Returns the model name to send to the API
    pub fn api_model_name(&self) -> &'static str {
        match self {
            SttModel::Whisper => "whisper-1",
            SttModel::Gpt4oTranscribe => "gpt-4o-transcribe",
            SttModel::Gpt4oMiniTranscribe => "gpt-4o-mini-transcribe",
        }
    }

    /// Returns the API endpoint for this model
    pub fn endpoint(&self) -> &'static str {
        "https://api.openai.com/v1/audio/transcriptions"
    }

    /// Whether the model accepts a transcription prompt.
    ///
    /// gpt-4o-transcribe rejects the prompt parameter; whisper-1 and
    /// gpt-4o-mini-transcribe accept it.
    pub fn supports_prompt(&self) -> bool {
        !matches!(self, SttModel::Gpt4oTranscribe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Wrapper {
        model: SttModel,
    }

    #[test]
    fn test_config_names_round_trip() {
        for model in [
            SttModel::Whisper,
            SttModel::Gpt4oTranscribe,
            SttModel::Gpt4oMiniTranscribe,
        ] {
            // Config files spell models exactly as the API does
            let serialized = toml::to_string(&Wrapper { model }).unwrap();
            assert!(serialized.contains(model.api_model_name()));

            let parsed: Wrapper = toml::from_str(&serialized).unwrap();
            assert_eq!(parsed.model, model);
        }
    }
}
