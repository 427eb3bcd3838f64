//! Identity Toolkit REST client.
//!
//! Both sign-in and sign-up POST email/password credentials with
//! `returnSecureToken` set, and the project's web API key as a query
//! parameter. Server error codes are mapped to user-facing variants.

use serde::{Deserialize, Serialize};

use super::{AuthError, Session};

const IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    email: String,
    local_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Authenticates users against one Firebase project.
pub struct AuthClient {
    client: reqwest::Client,
    api_key: String,
}

impl AuthClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Signs an existing user in.
    ///
    /// # Errors
    /// - `AuthError::EmailNotFound` / `InvalidCredentials` for bad credentials
    /// - `AuthError::Network` if the request never completes
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.token_request("accounts:signInWithPassword", email, password)
            .await
    }

    /// Creates a new account and signs it in.
    ///
    /// # Errors
    /// - `AuthError::EmailExists` if the address is taken
    /// - `AuthError::WeakPassword` if the password is rejected
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.token_request("accounts:signUp", email, password).await
    }

    async fn token_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{IDENTITY_BASE}/{endpoint}?key={}", self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&CredentialsRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(&body));
        }

        let token: TokenResponse = response.json().await?;
        let expires_in_secs = token.expires_in.parse::<i64>().unwrap_or(3600);

        tracing::info!("Authenticated as {}", token.email);

        Ok(Session::new(
            token.email,
            token.local_id,
            token.id_token,
            token.refresh_token,
            expires_in_secs,
        ))
    }
}

/// Maps Identity Toolkit error codes to user-facing errors.
fn map_api_error(body: &str) -> AuthError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    // Codes may carry a suffix, e.g. "WEAK_PASSWORD : Password should be..."
    let code = message.split_whitespace().next().unwrap_or("");
    match code {
        "EMAIL_NOT_FOUND" => AuthError::EmailNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::InvalidCredentials,
        "EMAIL_EXISTS" => AuthError::EmailExists,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        _ => AuthError::Api(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND"}}"#;
        assert!(matches!(map_api_error(body), AuthError::EmailNotFound));

        let body = r#"{"error":{"code":400,"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        assert!(matches!(map_api_error(body), AuthError::WeakPassword));

        let body = r#"{"error":{"code":400,"message":"SOMETHING_ELSE"}}"#;
        assert!(matches!(map_api_error(body), AuthError::Api(_)));

        // Unparseable bodies fall through with the raw text
        assert!(matches!(map_api_error("gateway timeout"), AuthError::Api(_)));
    }
}
