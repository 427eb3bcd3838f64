// Integration tests for the question-answering pipeline.
//
// These exercise the full transcribe -> resolve -> synthesize flow with
// stubbed speech backends and an in-memory object store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use voxkiosk::pipeline::{Pipeline, PipelineError, PipelineOutcome};
use voxkiosk::recording::RecordedAudio;
use voxkiosk::scripts::ScriptLibrary;
use voxkiosk::storage::MemoryStore;
use voxkiosk::synthesis::{CachingSynthesizer, SynthesizedAudio, TtsEngine};
use voxkiosk::transcription::Transcriber;

/// Transcriber stub that always returns the same transcript.
struct FixedTranscriber {
    transcript: String,
}

impl FixedTranscriber {
    fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio: &RecordedAudio) -> anyhow::Result<String> {
        Ok(self.transcript.clone())
    }
}

/// Transcriber stub that blocks until released, for overlap tests.
struct GatedTranscriber {
    transcript: String,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Transcriber for GatedTranscriber {
    async fn transcribe(&self, _audio: &RecordedAudio) -> anyhow::Result<String> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.transcript.clone())
    }
}

/// TTS engine stub that encodes the text itself and counts calls.
struct EchoEngine {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TtsEngine for EchoEngine {
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.as_bytes().to_vec())
    }
}

fn recording() -> RecordedAudio {
    let samples: Vec<i16> = (0..1600).map(|i| ((i % 100) * 300) as i16).collect();
    RecordedAudio::from_samples(&samples, 16000).expect("wav encoding")
}

fn pipeline_with(
    transcript: &str,
) -> (Pipeline<FixedTranscriber, EchoEngine, MemoryStore>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = EchoEngine {
        calls: calls.clone(),
    };
    let pipeline = Pipeline::new(
        FixedTranscriber::new(transcript),
        ScriptLibrary::builtin(),
        CachingSynthesizer::new(engine, MemoryStore::new()),
    );
    (pipeline, calls)
}

#[tokio::test]
async fn test_matched_question_is_answered_with_fresh_audio() {
    let (pipeline, calls) = pipeline_with("Where can I find the charging station?");

    let outcome = pipeline.run(recording()).await.expect("pipeline run");

    match outcome {
        PipelineOutcome::Answered {
            transcript,
            entry,
            audio,
        } => {
            assert_eq!(transcript, "Where can I find the charging station?");
            assert_eq!(entry.keyword, "Charging station");
            assert_eq!(entry.script_name, "script-charging-station.mp3");
            match audio {
                SynthesizedAudio::Fresh { url, payload } => {
                    assert_eq!(url, "memory://audio/script-charging-station.mp3");
                    assert_eq!(payload, entry.script_text.as_bytes());
                }
                SynthesizedAudio::Cached { .. } => panic!("first answer must be fresh"),
            }
        }
        PipelineOutcome::NoMatch { .. } => panic!("expected a keyword match"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeat_question_is_served_from_cache() {
    let (pipeline, calls) = pipeline_with("tell me about the tracking software please");

    let first = pipeline.run(recording()).await.expect("first run");
    let second = pipeline.run(recording()).await.expect("second run");

    let first_audio = match first {
        PipelineOutcome::Answered { audio, .. } => audio,
        _ => panic!("expected an answer"),
    };
    let second_audio = match second {
        PipelineOutcome::Answered { audio, .. } => audio,
        _ => panic!("expected an answer"),
    };

    assert!(matches!(first_audio, SynthesizedAudio::Fresh { .. }));
    assert!(matches!(second_audio, SynthesizedAudio::Cached { .. }));
    assert_eq!(first_audio.url(), second_audio.url());
    // One synthesis total, the repeat was a cache hit
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unmatched_question_synthesizes_nothing() {
    let (pipeline, calls) = pipeline_with("what time does the cafeteria open");

    let outcome = pipeline.run(recording()).await.expect("pipeline run");

    match outcome {
        PipelineOutcome::NoMatch { transcript } => {
            assert_eq!(transcript, "what time does the cafeteria open");
        }
        PipelineOutcome::Answered { .. } => panic!("nothing should match"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_keyword_match_is_case_insensitive() {
    let (pipeline, _) = pipeline_with("CHARGING STATION?");

    let outcome = pipeline.run(recording()).await.expect("pipeline run");
    assert!(matches!(outcome, PipelineOutcome::Answered { .. }));
}

#[tokio::test]
async fn test_overlapping_run_is_rejected_as_busy() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let transcriber = GatedTranscriber {
        transcript: "charging station".to_string(),
        started: started.clone(),
        release: release.clone(),
    };
    let engine = EchoEngine {
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let pipeline = Arc::new(Pipeline::new(
        transcriber,
        ScriptLibrary::builtin(),
        CachingSynthesizer::new(engine, MemoryStore::new()),
    ));

    let background = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.run(recording()).await })
    };

    // Wait until the first run is inside transcription, then start a second
    started.notified().await;
    let overlap = pipeline.run(recording()).await;
    assert!(matches!(overlap, Err(PipelineError::Busy)));

    // Release the first run; it must still complete normally
    release.notify_one();
    let first = background.await.expect("task join").expect("first run");
    assert!(matches!(first, PipelineOutcome::Answered { .. }));

    // With the first run finished the pipeline accepts work again
    let retry = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.run(recording()).await })
    };
    started.notified().await;
    release.notify_one();
    let retry = retry.await.expect("task join").expect("retry run");
    assert!(matches!(retry, PipelineOutcome::Answered { .. }));
}
