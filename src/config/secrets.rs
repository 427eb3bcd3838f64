//! Secret storage for API keys and the signed-in session.
//!
//! Secrets are stored outside the editable config file, in the user's local
//! data directory with owner-only permissions. The OpenAI API key can also be
//! supplied through the OPENAI_API_KEY environment variable, which takes
//! precedence over the stored value.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::auth::Session;

/// On-disk shape of the secrets file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SecretsFile {
    /// API keys by provider id (e.g. "openai")
    #[serde(default)]
    api_keys: BTreeMap<String, String>,
    /// The currently signed-in session, if any
    #[serde(default)]
    session: Option<Session>,
}

impl SecretsFile {
    fn load() -> Result<Self> {
        let path = secrets_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let secrets = toml::from_str(&content)
            .map_err(|e| anyhow!("Secrets file is corrupted: {e}"))?;
        Ok(secrets)
    }

    fn save(&self) -> Result<()> {
        let path = secrets_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        restrict_permissions(&path)?;
        Ok(())
    }
}

/// Returns the stored API key for a provider, preferring the environment.
///
/// For the "openai" provider the OPENAI_API_KEY environment variable wins
/// over the secrets file so deployments can inject the key at process start.
pub fn get_api_key(provider: &str) -> Result<Option<String>> {
    if provider == "openai" {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                return Ok(Some(key));
            }
        }
    }

    let secrets = SecretsFile::load()?;
    Ok(secrets.api_keys.get(provider).cloned())
}

/// Saves an API key for a provider to the secrets file.
pub fn save_api_key(provider: &str, api_key: &str) -> Result<()> {
    let mut secrets = SecretsFile::load()?;
    secrets.api_keys.insert(provider.to_string(), api_key.to_string());
    secrets.save()?;
    tracing::info!("API key saved for provider '{}'", provider);
    Ok(())
}

/// Returns the persisted session, if a user is signed in.
pub fn load_session() -> Result<Option<Session>> {
    let secrets = SecretsFile::load()?;
    Ok(secrets.session)
}

/// Persists the session created by a successful sign-in or sign-up.
pub fn save_session(session: &Session) -> Result<()> {
    let mut secrets = SecretsFile::load()?;
    secrets.session = Some(session.clone());
    secrets.save()?;
    tracing::info!("Session saved for {}", session.email);
    Ok(())
}

/// Removes the persisted session. Signing out twice is harmless.
pub fn clear_session() -> Result<()> {
    let mut secrets = SecretsFile::load()?;
    if secrets.session.take().is_some() {
        secrets.save()?;
        tracing::info!("Session cleared");
    }
    Ok(())
}

/// Path to the secrets file in the user's local data directory.
fn secrets_path() -> Result<PathBuf> {
    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("voxkiosk");
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("secrets.toml"))
}

/// Restricts the secrets file to owner read/write on Unix systems.
#[cfg(unix)]
fn restrict_permissions(path: &PathBuf) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &PathBuf) -> Result<()> {
    Ok(())
}
