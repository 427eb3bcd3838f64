//! Configuration management for voxkiosk.
//!
//! This module handles loading and saving application configuration from TOML files,
//! as well as secure storage of API credentials and the signed-in session.
//! Configuration is stored in the user's config directory, while credentials are
//! stored with restricted permissions in the user's local data directory.

pub mod file;
pub mod secrets;

pub use file::{get_config_path, AudioConfig, FirebaseConfig, KioskConfig, SpeechConfig};
pub use secrets::{clear_session, get_api_key, load_session, save_api_key, save_session};
