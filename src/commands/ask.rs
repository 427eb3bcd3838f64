//! Record a spoken question and answer it.
//!
//! The kiosk loop: record until silence, transcribe, match the keyword
//! table, synthesize (or fetch from cache) and play back. Requires a
//! signed-in session and an OpenAI API key.

use anyhow::{anyhow, Result};
use console::style;

use crate::config::{self, KioskConfig};
use crate::history::HistoryManager;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::playback;
use crate::recording::{record_until_silence, spawn_enter_listener, RecordingOptions};
use crate::scripts::ScriptLibrary;
use crate::storage::FirebaseStorage;
use crate::synthesis::{CachingSynthesizer, OpenAiTts};
use crate::transcription::OpenAiTranscriber;

/// Handles the kiosk question/answer flow.
///
/// With `keep_listening` the kiosk loops back to recording after each
/// answer; otherwise it exits after one question.
pub async fn handle_ask(keep_listening: bool) -> Result<()> {
    tracing::info!("=== voxkiosk Ask Started ===");

    let config_data = match KioskConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            eprintln!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/voxkiosk/voxkiosk.toml file and try again."
            );
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    // Session presence gates the kiosk
    let session = match config::load_session()? {
        Some(session) if !session.is_expired() => session,
        Some(_) => {
            return Err(anyhow!(
                "Your session has expired. Please run 'voxkiosk auth sign-in' again."
            ));
        }
        None => {
            return Err(anyhow!(
                "Not signed in. Please run 'voxkiosk auth sign-in' first."
            ));
        }
    };

    let api_key = config::get_api_key("openai")?.ok_or_else(|| {
        anyhow!("No OpenAI API key found. Set OPENAI_API_KEY or run 'voxkiosk auth set-key'.")
    })?;

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, silence_threshold={}, silence_duration={}ms",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.audio.silence_threshold,
        config_data.audio.silence_duration_ms
    );

    let scripts = ScriptLibrary::load(&super::config_dir()?)?;

    let transcriber = OpenAiTranscriber::new(
        api_key.clone(),
        config_data.speech.stt_model,
        scripts.keywords(),
    );
    let engine = OpenAiTts::new(
        api_key,
        config_data.speech.tts_model,
        config_data.speech.voice,
        config_data.speech.speed,
    );
    let store = FirebaseStorage::new(
        config_data.firebase.storage_bucket.clone(),
        Some(session.id_token.clone()),
    );
    let pipeline = Pipeline::new(transcriber, scripts, CachingSynthesizer::new(engine, store));

    let mut history = HistoryManager::new(&super::data_dir()?)?;
    let recording_options = RecordingOptions::from_config(&config_data.audio);

    // One stdin listener for the whole session, shared by every recording
    let mut enter_rx = spawn_enter_listener();

    loop {
        println!();
        println!(
            "{} Ask your question. Recording stops after {}s of silence (or press Enter).",
            style("listening").green().bold(),
            config_data.audio.silence_duration_ms / 1000
        );

        let audio = record_until_silence(&recording_options, &mut enter_rx).await?;
        println!("{} Processing...", style("thinking").yellow());

        match pipeline.run(audio).await {
            Ok(PipelineOutcome::Answered {
                transcript,
                entry,
                audio,
            }) => {
                println!("You asked: {transcript}");
                println!(
                    "{} {}",
                    style("answering").cyan().bold(),
                    entry.keyword
                );

                if let Err(e) = history.save_interaction(
                    &transcript,
                    Some(&entry.script_name),
                    Some(audio.url()),
                ) {
                    tracing::warn!("Failed to save interaction to history: {}", e);
                }

                // Playback problems don't invalidate the answer
                if let Err(e) = playback::play(&audio).await {
                    tracing::warn!("Playback failed: {}", e);
                    eprintln!("Warning: could not play the answer audio: {e}");
                    println!("Answer audio: {}", audio.url());
                }
            }
            Ok(PipelineOutcome::NoMatch { transcript }) => {
                println!("You asked: {transcript}");
                println!(
                    "{} No relevant information available for that question.",
                    style("no match").magenta()
                );

                if let Err(e) = history.save_interaction(&transcript, None, None) {
                    tracing::warn!("Failed to save interaction to history: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Pipeline failed: {}", e);
                eprintln!("Error: Processing failed - {e}");
                if !keep_listening {
                    return Err(e.into());
                }
            }
        }

        if !keep_listening {
            break;
        }
    }

    tracing::info!("=== voxkiosk Ask Exited Successfully ===");
    Ok(())
}
