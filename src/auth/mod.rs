//! User authentication against the Firebase Identity Toolkit.
//!
//! Sign-in and sign-up exchange email/password credentials for a session
//! token. The session is persisted by the secrets store and gates every
//! kiosk interaction; sign-out simply clears it.

pub mod client;

pub use client::AuthClient;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the identity provider.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No account exists for that email address")]
    EmailNotFound,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("An account already exists for that email address")]
    EmailExists,
    #[error("Password is too weak: must be at least 6 characters")]
    WeakPassword,
    #[error("Too many attempts, please try again later")]
    TooManyAttempts,
    #[error("Authentication network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Authentication failed: {0}")]
    Api(String),
}

/// A signed-in user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Email address the user signed in with
    pub email: String,
    /// Stable user id assigned by the identity provider
    pub local_id: String,
    /// Bearer token attached to storage requests
    pub id_token: String,
    /// Token used to mint a fresh id token after expiry
    pub refresh_token: String,
    /// When the id token stops being valid
    pub expires_at: DateTime<Local>,
}

impl Session {
    /// Builds a session from a token response, converting the relative
    /// expiry into an absolute timestamp.
    pub fn new(
        email: String,
        local_id: String,
        id_token: String,
        refresh_token: String,
        expires_in_secs: i64,
    ) -> Self {
        Self {
            email,
            local_id,
            id_token,
            refresh_token,
            expires_at: Local::now() + Duration::seconds(expires_in_secs),
        }
    }

    /// True once the id token has lapsed and the user must sign in again.
    pub fn is_expired(&self) -> bool {
        Local::now() >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let fresh = Session::new(
            "a@b.c".into(),
            "uid".into(),
            "token".into(),
            "refresh".into(),
            3600,
        );
        assert!(!fresh.is_expired());

        let stale = Session::new(
            "a@b.c".into(),
            "uid".into(),
            "token".into(),
            "refresh".into(),
            -1,
        );
        assert!(stale.is_expired());
    }
}
