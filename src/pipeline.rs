//! Question-answering pipeline: transcribe, resolve, synthesize.
//!
//! One sequential asynchronous run per completed recording. A busy flag
//! enforces that only a single run is in flight: starting another while one
//! is outstanding fails fast instead of queueing behind it. A transcript
//! with no keyword match is a normal outcome, not an error.

use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::recording::RecordedAudio;
use crate::scripts::{ScriptEntry, ScriptLibrary};
use crate::storage::ObjectStore;
use crate::synthesis::{CachingSynthesizer, SynthesisError, SynthesizedAudio, TtsEngine};
use crate::transcription::Transcriber;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A previous run is still resolving; the recording was rejected
    #[error("A previous question is still being processed")]
    Busy,
    /// Speech-to-text failed; synthesis was never attempted
    #[error("Transcription failed: {0}")]
    Transcription(#[source] anyhow::Error),
    /// Synthesis or its cache failed after a successful match
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Outcome of a completed pipeline run.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The transcript matched a script and audio is ready to play
    Answered {
        transcript: String,
        entry: ScriptEntry,
        audio: SynthesizedAudio,
    },
    /// No keyword matched; there is nothing to say
    NoMatch { transcript: String },
}

/// Ties the transcription, resolution and synthesis stages together.
pub struct Pipeline<T, E, S> {
    transcriber: T,
    scripts: ScriptLibrary,
    synthesizer: CachingSynthesizer<E, S>,
    busy: AtomicBool,
}

impl<T, E, S> Pipeline<T, E, S>
where
    T: Transcriber,
    E: TtsEngine,
    S: ObjectStore,
{
    pub fn new(transcriber: T, scripts: ScriptLibrary, synthesizer: CachingSynthesizer<E, S>) -> Self {
        Self {
            transcriber,
            scripts,
            synthesizer,
            busy: AtomicBool::new(false),
        }
    }

    /// Runs the pipeline for one completed recording.
    ///
    /// # Errors
    /// - `PipelineError::Busy` if another run is still in flight
    /// - `PipelineError::Transcription` aborts before any synthesis call
    /// - `PipelineError::Synthesis` after a successful keyword match
    pub async fn run(&self, audio: RecordedAudio) -> Result<PipelineOutcome, PipelineError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            tracing::warn!("Pipeline invoked while a previous run is still resolving");
            return Err(PipelineError::Busy);
        }

        let result = self.run_inner(audio).await;
        self.busy.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(&self, audio: RecordedAudio) -> Result<PipelineOutcome, PipelineError> {
        let transcript = self
            .transcriber
            .transcribe(&audio)
            .await
            .map_err(PipelineError::Transcription)?;

        tracing::info!("Transcript: {transcript}");

        let entry = match self.scripts.resolve(&transcript) {
            Some(entry) => entry.clone(),
            None => {
                tracing::info!("No keyword matched the transcript");
                return Ok(PipelineOutcome::NoMatch { transcript });
            }
        };

        tracing::info!("Matched keyword '{}' -> {}", entry.keyword, entry.script_name);

        let audio = self.synthesizer.speak(&entry).await?;

        Ok(PipelineOutcome::Answered {
            transcript,
            entry,
            audio,
        })
    }
}
