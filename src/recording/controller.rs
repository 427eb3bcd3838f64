//! Recording loop: capture until silence (or Enter), then assemble audio.
//!
//! Runs the silence check on an explicit tokio interval rather than any
//! render callback, so the poll cadence is configurable and testable. The
//! stop countdown lives in the detector; this loop only feeds it windows.

use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::recorder::Recorder;
use super::silence::SilenceDetector;
use super::RecordedAudio;

/// Number of recent samples inspected per silence check.
const ANALYSIS_WINDOW: usize = 2048;

/// Tunables for one recording session.
#[derive(Debug, Clone)]
pub struct RecordingOptions {
    /// Input device: "default", an index or a device name
    pub device: String,
    /// Requested sample rate in Hz
    pub sample_rate: u32,
    /// Maximum normalized deviation still counted as silence
    pub silence_threshold: f32,
    /// How long silence must persist before auto-stop
    pub silence_duration: Duration,
    /// Interval between silence checks
    pub poll_interval: Duration,
}

impl RecordingOptions {
    pub fn from_config(audio: &crate::config::AudioConfig) -> Self {
        Self {
            device: audio.device.clone(),
            sample_rate: audio.sample_rate,
            silence_threshold: audio.silence_threshold,
            silence_duration: Duration::from_millis(audio.silence_duration_ms),
            poll_interval: Duration::from_millis(audio.poll_interval_ms),
        }
    }
}

/// Spawns the single stdin reader that signals Enter presses.
///
/// One listener serves every recording in the process: spawning a reader per
/// recording would leak a task blocked in `read_line` each time a recording
/// ends by silence, and a stale reader could swallow a later Enter press.
/// The task exits once the receiver is dropped.
pub fn spawn_enter_listener() -> mpsc::Receiver<()> {
    let (enter_tx, enter_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin());
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if enter_tx.send(()).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
    enter_rx
}

/// Discards Enter presses that arrived before a recording started.
fn drain_pending(enter: &mut mpsc::Receiver<()>) {
    while enter.try_recv().is_ok() {}
}

/// Records from the microphone until the speaker falls silent.
///
/// The user can also finish early by pressing Enter, signalled through the
/// receiver from [`spawn_enter_listener`]. Presses from before this call are
/// ignored. Exactly one `RecordedAudio` is produced per call; the capture
/// device is released before this function returns, on success and on error.
///
/// # Errors
/// - If the microphone cannot be opened (treated as denied access, no retry)
/// - If WAV assembly fails
pub async fn record_until_silence(
    options: &RecordingOptions,
    enter: &mut mpsc::Receiver<()>,
) -> Result<RecordedAudio> {
    let mut recorder = Recorder::new(options.sample_rate, options.device.clone());
    recorder.start()?;

    let mut detector = SilenceDetector::new(options.silence_threshold, options.silence_duration);
    let mut interval = tokio::time::interval(options.poll_interval);

    drain_pending(enter);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let window = recorder.tail(ANALYSIS_WINDOW);
                if detector.observe(&window, Instant::now()) {
                    tracing::info!(
                        "Silence held for {:?}, stopping recording",
                        options.silence_duration
                    );
                    break;
                }
            }
            _ = enter.recv() => {
                tracing::info!("Enter pressed, stopping recording");
                break;
            }
        }
    }

    let samples = recorder
        .stop()
        .ok_or_else(|| anyhow!("Recording was not active"))?;
    let sample_rate = recorder.sample_rate();

    if samples.is_empty() {
        tracing::warn!("Recording stopped with no samples captured");
    }

    RecordedAudio::from_samples(&samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stale_enter_presses_are_drained() {
        let (tx, mut rx) = mpsc::channel::<()>(1);

        // An Enter press from before the recording started is queued
        tx.send(()).await.unwrap();

        drain_pending(&mut rx);
        assert!(rx.try_recv().is_err());

        // Presses after the drain still come through
        tx.send(()).await.unwrap();
        assert!(rx.try_recv().is_ok());
    }
}
