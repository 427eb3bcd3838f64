//! Level-triggered silence detection over polled amplitude windows.
//!
//! The detector is a pure state machine: each poll tick it receives the most
//! recent sample window and the current time, and reports whether recording
//! should stop. The first silent tick arms a single countdown; the countdown
//! is not re-armed on later silent ticks, and any loud tick cancels it. Sound
//! therefore has to stay continuously below the threshold for the full
//! configured duration before a stop fires. Taking `now` as an argument keeps
//! the detector clock-free so tests can drive it deterministically.

use std::time::{Duration, Instant};

/// Amplitude midpoint of signed 16-bit PCM, used to normalize deviations.
const I16_FULL_SCALE: f32 = 32768.0;

/// Decides when a recording has been silent long enough to stop.
#[derive(Debug)]
pub struct SilenceDetector {
    /// Maximum normalized deviation still counted as silence
    threshold: f32,
    /// How long silence must persist before a stop fires
    silence_duration: Duration,
    /// Armed stop countdown; None while sound is present
    deadline: Option<Instant>,
}

impl SilenceDetector {
    pub fn new(threshold: f32, silence_duration: Duration) -> Self {
        Self {
            threshold,
            silence_duration,
            deadline: None,
        }
    }

    /// Feeds one amplitude window to the detector.
    ///
    /// Returns true when an armed countdown has expired and recording should
    /// stop. A window at exactly the threshold counts as silent.
    pub fn observe(&mut self, window: &[i16], now: Instant) -> bool {
        let deviation = max_deviation(window);

        if deviation > self.threshold {
            // Sound resumed: cancel any pending countdown
            if self.deadline.take().is_some() {
                tracing::trace!("Sound resumed (deviation {:.4}), stop countdown cancelled", deviation);
            }
            return false;
        }

        match self.deadline {
            None => {
                // First silent tick arms a single countdown
                self.deadline = Some(now + self.silence_duration);
                tracing::trace!(
                    "Silence detected (deviation {:.4}), stopping in {:?}",
                    deviation,
                    self.silence_duration
                );
                false
            }
            Some(deadline) => now >= deadline,
        }
    }

    /// True while a stop countdown is armed.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Maximum normalized amplitude deviation from the zero-level center.
///
/// An empty window has no deviation and counts as silent.
pub fn max_deviation(window: &[i16]) -> f32 {
    window
        .iter()
        .map(|&s| (s as f32).abs() / I16_FULL_SCALE)
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 0.05;
    const DURATION: Duration = Duration::from_millis(5000);

    fn loud() -> Vec<i16> {
        vec![0, 8000, -8000] // deviation ~0.24
    }

    fn quiet() -> Vec<i16> {
        vec![0, 100, -100] // deviation ~0.003
    }

    /// Threshold and window chosen so the deviation equals the threshold exactly.
    const EXACT_THRESHOLD: f32 = 8000.0 / I16_FULL_SCALE;

    fn exactly_threshold() -> Vec<i16> {
        vec![0, 8000, -8000]
    }

    #[test]
    fn test_max_deviation() {
        assert_eq!(max_deviation(&[]), 0.0);
        assert_eq!(max_deviation(&[0, 0]), 0.0);
        assert!((max_deviation(&[16384]) - 0.5).abs() < 1e-6);
        assert!((max_deviation(&[-32768]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_arms_countdown_once() {
        let mut detector = SilenceDetector::new(THRESHOLD, DURATION);
        let start = Instant::now();

        assert!(!detector.observe(&quiet(), start));
        assert!(detector.is_armed());

        // Further silent ticks before the deadline don't fire and don't re-arm
        assert!(!detector.observe(&quiet(), start + Duration::from_millis(1000)));
        assert!(!detector.observe(&quiet(), start + Duration::from_millis(4999)));

        // The countdown runs from the FIRST silent tick
        assert!(detector.observe(&quiet(), start + Duration::from_millis(5000)));
    }

    #[test]
    fn test_sound_cancels_countdown() {
        let mut detector = SilenceDetector::new(THRESHOLD, DURATION);
        let start = Instant::now();

        assert!(!detector.observe(&quiet(), start));
        assert!(detector.is_armed());

        // Sound resumes right before the deadline
        assert!(!detector.observe(&loud(), start + Duration::from_millis(4900)));
        assert!(!detector.is_armed());

        // Silence restarts the full countdown from scratch
        let restart = start + Duration::from_millis(5000);
        assert!(!detector.observe(&quiet(), restart));
        assert!(!detector.observe(&quiet(), restart + Duration::from_millis(4999)));
        assert!(detector.observe(&quiet(), restart + Duration::from_millis(5000)));
    }

    #[test]
    fn test_loud_ticks_never_arm() {
        let mut detector = SilenceDetector::new(THRESHOLD, DURATION);
        let start = Instant::now();

        for i in 0..200 {
            assert!(!detector.observe(&loud(), start + Duration::from_millis(i * 100)));
            assert!(!detector.is_armed());
        }
    }

    #[test]
    fn test_exact_threshold_counts_as_silent() {
        let mut detector = SilenceDetector::new(EXACT_THRESHOLD, DURATION);
        let start = Instant::now();

        // Held at exactly the threshold for the full duration: fires exactly once
        let mut fired = 0;
        for i in 0..=100 {
            if detector.observe(&exactly_threshold(), start + Duration::from_millis(i * 50)) {
                fired += 1;
                break; // the controller stops polling after the first fire
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_empty_window_is_silent() {
        let mut detector = SilenceDetector::new(THRESHOLD, DURATION);
        let start = Instant::now();

        assert!(!detector.observe(&[], start));
        assert!(detector.is_armed());
    }
}
