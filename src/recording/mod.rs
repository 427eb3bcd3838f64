//! Microphone capture with automatic silence-based stop.
//!
//! The recorder owns the capture device for the duration of one recording and
//! accumulates i16 mono PCM samples. The controller polls the live sample
//! buffer on a fixed interval and feeds a silence detector that arms a single
//! stop countdown once the input goes quiet.

pub mod controller;
pub mod recorder;
pub mod silence;

pub use controller::{record_until_silence, spawn_enter_listener, RecordingOptions};
pub use recorder::Recorder;
pub use silence::SilenceDetector;

use anyhow::Result;
use hound::WavWriter;
use std::io::Cursor;

/// A completed recording, assembled exactly once per start/stop cycle.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    /// WAV container (16-bit mono PCM) ready for upload
    pub wav: Vec<u8>,
    /// Sample rate the audio was captured at
    pub sample_rate: u32,
    /// Recording length in seconds
    pub duration_secs: f32,
}

impl RecordedAudio {
    /// Assembles samples into an in-memory WAV container.
    ///
    /// A recording with zero samples still produces a well-formed (empty)
    /// WAV file; downstream services decide what to do with it.
    ///
    /// # Errors
    /// - If WAV encoding fails
    pub fn from_samples(samples: &[i16], sample_rate: u32) -> Result<Self> {
        let wav_spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut wav = Vec::new();
        {
            let cursor = Cursor::new(&mut wav);
            let mut writer = WavWriter::new(cursor, wav_spec)?;
            for &sample in samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }

        Ok(Self {
            wav,
            sample_rate,
            duration_secs: samples.len() as f32 / sample_rate as f32,
        })
    }

    /// True when no samples were captured.
    pub fn is_empty(&self) -> bool {
        self.duration_secs == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_assembly() {
        let samples: Vec<i16> = vec![0, 1000, -1000, 32767, -32768];
        let audio = RecordedAudio::from_samples(&samples, 16000).unwrap();

        assert!(!audio.is_empty());
        // RIFF header + fmt chunk + data chunk with 2 bytes per sample
        assert_eq!(&audio.wav[0..4], b"RIFF");
        assert_eq!(&audio.wav[8..12], b"WAVE");
        assert_eq!(audio.wav.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn test_empty_recording_is_well_formed() {
        let audio = RecordedAudio::from_samples(&[], 16000).unwrap();

        assert!(audio.is_empty());
        assert_eq!(audio.duration_secs, 0.0);
        // Still a valid RIFF/WAVE container, just with an empty data chunk
        assert_eq!(&audio.wav[0..4], b"RIFF");
        assert_eq!(audio.wav.len(), 44);
    }
}
