//! voxkiosk — a terminal voice kiosk.
//!
//! A signed-in user asks a spoken question. The kiosk records the microphone
//! until the speaker falls silent, transcribes the recording, matches the
//! transcript against a keyword table and plays back a synthesized canned
//! answer. Synthesized audio is cached in cloud object storage so each script
//! is only generated once.

pub mod app;
pub mod auth;
pub mod commands;
pub mod config;
pub mod history;
pub mod logging;
pub mod pipeline;
pub mod playback;
pub mod recording;
pub mod scripts;
pub mod setup;
pub mod storage;
pub mod synthesis;
pub mod transcription;
