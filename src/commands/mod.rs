//! Application command handlers for voxkiosk.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command.
//!
//! # Commands
//! - `ask`: Record a spoken question and play back the matched answer
//! - `auth`: Sign in, sign up or sign out of the kiosk account
//! - `scripts`: Show the keyword table the kiosk answers from
//! - `history`: List recent kiosk interactions
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod ask;
pub mod auth;
pub mod config;
pub mod history;
pub mod list_devices;
pub mod logs;
pub mod scripts;

pub use ask::handle_ask;
pub use auth::{handle_set_key, handle_sign_in, handle_sign_out, handle_sign_up};
pub use config::handle_config;
pub use history::handle_history;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use scripts::handle_scripts;

use anyhow::anyhow;
use std::path::PathBuf;

/// Data directory where history and secrets live.
pub(crate) fn data_dir() -> Result<PathBuf, anyhow::Error> {
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("voxkiosk");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Config directory holding voxkiosk.toml and the optional scripts.toml.
pub(crate) fn config_dir() -> Result<PathBuf, anyhow::Error> {
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("voxkiosk");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
