//! Kiosk account authentication.
//!
//! Sign-in and sign-up prompt for credentials interactively and persist the
//! resulting session. Sign-out clears it. `set-key` stores the OpenAI API
//! key for deployments that don't use the environment variable.

use anyhow::anyhow;
use cliclack::{input, intro, note, outro, password};
use console::style;

use crate::auth::AuthClient;
use crate::config::{self, KioskConfig};

/// Signs an existing user in and persists the session.
pub async fn handle_sign_in() -> Result<(), anyhow::Error> {
    tracing::info!("=== voxkiosk Sign-In ===");

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    intro(style(" sign in ").on_white().black())?;

    if let Some(session) = config::load_session()? {
        note("current session", &session.email)?;
    }

    let (email, pass) = prompt_credentials()?;
    let client = auth_client()?;

    let session = client
        .sign_in(&email, &pass)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    config::save_session(&session)?;

    outro(format!("✅ Signed in as {}.", session.email))?;
    tracing::info!("Sign-in completed for {}", session.email);
    Ok(())
}

/// Creates a new account and persists the session.
pub async fn handle_sign_up() -> Result<(), anyhow::Error> {
    tracing::info!("=== voxkiosk Sign-Up ===");

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    intro(style(" sign up ").on_white().black())?;

    let (email, pass) = prompt_credentials()?;
    let client = auth_client()?;

    let session = client
        .sign_up(&email, &pass)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    config::save_session(&session)?;

    outro(format!("✅ Account created, signed in as {}.", session.email))?;
    tracing::info!("Sign-up completed for {}", session.email);
    Ok(())
}

/// Clears the persisted session. Failures are logged, not surfaced.
pub fn handle_sign_out() -> Result<(), anyhow::Error> {
    match config::load_session()? {
        Some(session) => {
            if let Err(e) = config::clear_session() {
                tracing::error!("Error signing out: {e}");
            }
            println!("Signed out {}.", session.email);
        }
        None => {
            println!("Not signed in.");
        }
    }
    Ok(())
}

/// Stores the OpenAI API key in the secrets file.
pub fn handle_set_key() -> Result<(), anyhow::Error> {
    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    intro(style(" api key ").on_white().black())?;

    let current_key = config::get_api_key("openai").ok().flatten();

    // Pressing Enter keeps an already-saved key
    let api_key: String = if current_key.is_some() {
        password("Enter OpenAI API key (press Enter to keep current):")
            .allow_empty()
            .interact()
            .map_err(|e| anyhow!("API key input cancelled: {e}"))?
    } else {
        password("Enter OpenAI API key:")
            .interact()
            .map_err(|e| anyhow!("API key input cancelled: {e}"))?
    };

    let api_key_to_save = if api_key.is_empty() {
        match current_key {
            Some(key) => key,
            None => return Err(anyhow!("API key cannot be empty")),
        }
    } else {
        api_key
    };

    config::save_api_key("openai", &api_key_to_save)?;
    outro("✅ API key saved.")?;
    Ok(())
}

/// Prompts for email and password.
fn prompt_credentials() -> Result<(String, String), anyhow::Error> {
    let email: String = input("Email:")
        .placeholder("visitor@example.com")
        .validate(|value: &String| {
            if value.contains('@') {
                Ok(())
            } else {
                Err("Enter a valid email address")
            }
        })
        .interact()
        .map_err(|e| anyhow!("Email input cancelled: {e}"))?;

    let pass: String = password("Password:")
        .interact()
        .map_err(|e| anyhow!("Password input cancelled: {e}"))?;

    Ok((email, pass))
}

/// Builds the auth client from the configured Firebase project.
fn auth_client() -> Result<AuthClient, anyhow::Error> {
    let config_data = KioskConfig::load()
        .map_err(|e| anyhow!("Configuration error: {e}. Run 'voxkiosk config' to fix it."))?;

    if config_data.firebase.api_key.is_empty() {
        return Err(anyhow!(
            "No Firebase API key configured. Run 'voxkiosk config' and fill in the [firebase] section."
        ));
    }

    Ok(AuthClient::new(config_data.firebase.api_key))
}
