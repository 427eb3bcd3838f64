//! Answer playback through the system audio player.
//!
//! Fresh synthesis results carry the MP3 payload, which is written to a temp
//! file and played directly; cache hits carry only a URL, which is fetched
//! first. Playback problems are the caller's to log; a completed answer is
//! not invalidated by a broken speaker.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::synthesis::SynthesizedAudio;

/// Plays a synthesized answer, preferring the in-memory payload over the URL.
///
/// # Errors
/// - If the cached audio cannot be downloaded or is empty
/// - If no system audio player can be found
pub async fn play(audio: &SynthesizedAudio) -> Result<()> {
    let path = match audio.payload() {
        Some(payload) => write_temp_audio(payload)?,
        None => {
            let payload = download(audio.url()).await?;
            write_temp_audio(&payload)?
        }
    };

    play_file(&path)
}

/// Fetches cached answer audio from its retrieval URL.
async fn download(url: &str) -> Result<Vec<u8>> {
    tracing::debug!("Downloading cached answer from {url}");

    let response = reqwest::get(url)
        .await
        .map_err(|e| anyhow!("Failed to download cached audio: {e}"))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Cached audio download failed with status {}",
            response.status()
        ));
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(anyhow!("Cached audio payload is empty"));
    }

    Ok(bytes.to_vec())
}

/// Monotonic counter so consecutive answers never share a temp file. A
/// spawned player may still be reading the previous answer when the next
/// one is written.
static ANSWER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Writes the answer to a fresh temp file the system player can open.
fn write_temp_audio(payload: &[u8]) -> Result<PathBuf> {
    let seq = ANSWER_SEQ.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "voxkiosk-answer-{}-{seq}.mp3",
        std::process::id()
    ));
    std::fs::write(&path, payload)
        .map_err(|e| anyhow!("Failed to write answer audio to {}: {e}", path.display()))?;
    Ok(path)
}

/// Plays an audio file using the system's default audio player.
///
/// On macOS: uses the `open` command.
/// On Linux: tries xdg-open first, then falls back to common audio players
/// (mpv, vlc, ffplay, paplay).
fn play_file(audio_path: &Path) -> Result<()> {
    tracing::info!("Playing answer: {}", audio_path.display());

    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg(audio_path)
            .spawn()
            .map_err(|e| anyhow!("Failed to open audio player: {e}"))?
            .wait()
            .map_err(|e| anyhow!("Audio player error: {e}"))?;
    }

    #[cfg(target_os = "linux")]
    {
        let result = Command::new("xdg-open").arg(audio_path).spawn();

        match result {
            Ok(mut child) => {
                child
                    .wait()
                    .map_err(|e| anyhow!("Audio player error: {e}"))?;
            }
            Err(_) => {
                // Fallback to common audio players if xdg-open fails
                let players = vec!["mpv", "vlc", "ffplay", "paplay"];
                let mut played = false;

                for player in players {
                    if let Ok(mut child) = Command::new(player).arg(audio_path).spawn() {
                        let _ = child.wait();
                        played = true;
                        break;
                    }
                }

                if !played {
                    return Err(anyhow!(
                        "No audio player found. Install mpv, vlc, ffplay, or paplay"
                    ));
                }
            }
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        return Err(anyhow!("Audio playback is not supported on this platform"));
    }

    tracing::info!("Playback finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_answers_get_distinct_temp_files() {
        let first = write_temp_audio(b"first answer").unwrap();
        let second = write_temp_audio(b"second answer").unwrap();

        // Writing the second answer must not clobber one still being played
        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"first answer");
        assert_eq!(std::fs::read(&second).unwrap(), b"second answer");

        let _ = std::fs::remove_file(first);
        let _ = std::fs::remove_file(second);
    }
}
