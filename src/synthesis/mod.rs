//! Speech synthesis with a durable cache.
//!
//! Each answer script is synthesized at most once: the script's storage name
//! is the cache key, so a hit returns only the retrieval URL while a miss
//! synthesizes, persists and returns both the fresh payload and its URL.

pub mod openai;

pub use openai::{OpenAiTts, TtsModel, TtsVoice};

use async_trait::async_trait;
use thiserror::Error;

use crate::scripts::ScriptEntry;
use crate::storage::{ObjectStore, StorageError};

/// Content type of synthesized answers.
const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Errors surfaced by the synthesis cache.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The synthesis API call failed
    #[error("speech synthesis failed: {0}")]
    Engine(#[source] anyhow::Error),
    /// The cache lookup or store failed (NotFound is handled internally)
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of resolving a script to playable audio.
///
/// Exactly one shape per cache outcome: a hit carries only the URL, a miss
/// carries the freshly generated payload plus the URL it was just stored at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesizedAudio {
    /// A prior synthesis for this script already existed in storage
    Cached { url: String },
    /// Newly synthesized and persisted
    Fresh { payload: Vec<u8>, url: String },
}

impl SynthesizedAudio {
    /// Retrieval URL regardless of cache outcome.
    pub fn url(&self) -> &str {
        match self {
            SynthesizedAudio::Cached { url } => url,
            SynthesizedAudio::Fresh { url, .. } => url,
        }
    }

    /// The fresh payload, when one exists.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            SynthesizedAudio::Cached { .. } => None,
            SynthesizedAudio::Fresh { payload, .. } => Some(payload),
        }
    }
}

/// Raw text-to-speech backend.
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Synthesizes text into encoded audio bytes (MP3).
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>>;
}

/// Synthesis front-end that caches results in object storage.
pub struct CachingSynthesizer<E, S> {
    engine: E,
    store: S,
}

impl<E: TtsEngine, S: ObjectStore> CachingSynthesizer<E, S> {
    pub fn new(engine: E, store: S) -> Self {
        Self { engine, store }
    }

    /// Returns playable audio for a script, synthesizing only on cache miss.
    ///
    /// # Errors
    /// - `SynthesisError::Engine` if generation fails
    /// - `SynthesisError::Storage` for any storage failure other than a miss
    pub async fn speak(&self, entry: &ScriptEntry) -> Result<SynthesizedAudio, SynthesisError> {
        let key = format!("audio/{}", entry.script_name);

        match self.store.download_url(&key).await {
            Ok(url) => {
                tracing::info!("Serving '{}' from cache", entry.script_name);
                return Ok(SynthesizedAudio::Cached { url });
            }
            Err(StorageError::NotFound(_)) => {
                tracing::info!("No cached audio for '{}', synthesizing", entry.script_name);
            }
            Err(e) => return Err(e.into()),
        }

        let payload = self
            .engine
            .synthesize(&entry.script_text)
            .await
            .map_err(SynthesisError::Engine)?;

        let url = self
            .store
            .put(&key, payload.clone(), AUDIO_CONTENT_TYPE)
            .await?;

        Ok(SynthesizedAudio::Fresh { payload, url })
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine stub that counts invocations.
    struct CountingEngine {
        calls: AtomicUsize,
    }

    impl CountingEngine {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TtsEngine for CountingEngine {
        async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let synth = CachingSynthesizer::new(CountingEngine::new(), MemoryStore::new());
        let entry = ScriptEntry::new("Charging station", "Here's information...");

        // First call misses: fresh payload plus URL
        let first = synth.speak(&entry).await.unwrap();
        match &first {
            SynthesizedAudio::Fresh { payload, url } => {
                assert_eq!(payload, b"Here's information...");
                assert_eq!(url, "memory://audio/script-charging-station.mp3");
            }
            SynthesizedAudio::Cached { .. } => panic!("expected a cache miss"),
        }

        // Second call hits: URL only, no re-synthesis
        let second = synth.speak(&entry).await.unwrap();
        assert!(matches!(second, SynthesizedAudio::Cached { .. }));
        assert_eq!(second.url(), first.url());
        assert!(second.payload().is_none());
        assert_eq!(synth.engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_scripts_distinct_cache_keys() {
        let synth = CachingSynthesizer::new(CountingEngine::new(), MemoryStore::new());

        let a = ScriptEntry::new("Charging station", "a");
        let b = ScriptEntry::new("Tracking Software", "b");

        assert!(matches!(
            synth.speak(&a).await.unwrap(),
            SynthesizedAudio::Fresh { .. }
        ));
        assert!(matches!(
            synth.speak(&b).await.unwrap(),
            SynthesizedAudio::Fresh { .. }
        ));
        assert_eq!(synth.engine.calls.load(Ordering::SeqCst), 2);
        assert_eq!(synth.store().len(), 2);
    }
}
