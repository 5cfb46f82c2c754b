//! Authentication service.
//!
//! Email and password accounts are held by Firebase Auth; this service talks
//! to its REST API and hands back who signed in. Provider error codes are
//! passed through unchanged.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use emporium_core::{Email, UserId};

use crate::config::FirebaseConfig;
use crate::firestore::error_message;

/// Minimum password length accepted by Firebase Auth.
const MIN_PASSWORD_LENGTH: usize = 6;

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Firebase user id (`localId`).
    pub user_id: UserId,
    /// Account email.
    pub email: Email,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
}

impl TryFrom<PasswordResponse> for AuthSession {
    type Error = AuthError;

    fn try_from(response: PasswordResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(response.local_id),
            email: Email::parse(&response.email)?,
        })
    }
}

/// Client for Firebase Auth email/password accounts.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthServiceInner>,
}

struct AuthServiceInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(AuthServiceInner {
                client: reqwest::Client::new(),
                endpoint: config.auth_endpoint.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new account with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::Provider` with Firebase's message (e.g.
    /// `EMAIL_EXISTS`) if the account cannot be created.
    #[instrument(skip(self, password))]
    pub async fn register_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        self.call("accounts:signUp", &email, password).await
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Provider` with Firebase's message (e.g.
    /// `EMAIL_NOT_FOUND`, `INVALID_PASSWORD`) if sign-in is refused.
    #[instrument(skip(self, password))]
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::Provider("MISSING_PASSWORD".to_owned()));
        }
        self.call("accounts:signInWithPassword", &email, password)
            .await
    }

    async fn call(
        &self,
        method: &str,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let mut url = Url::parse(&format!("{}/{method}", self.inner.endpoint))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());

        let response = self
            .inner
            .client
            .post(url)
            .json(&PasswordRequest {
                email: email.as_str(),
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::warn!(status = %status, message = %message, "Firebase Auth refused request");
            return Err(AuthError::Provider(message));
        }

        let parsed: PasswordResponse = serde_json::from_str(&body)?;
        AuthSession::try_from(parsed)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("endpoint", &self.inner.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        let result = validate_password("short");
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    }

    #[test]
    fn test_validate_password_valid() {
        assert!(validate_password("hunter22").is_ok());
    }

    #[test]
    fn test_password_request_wire_format() {
        let body = serde_json::to_value(PasswordRequest {
            email: "ada@example.com",
            password: "hunter22",
            return_secure_token: true,
        })
        .unwrap();
        assert_eq!(body["returnSecureToken"], true);
        assert_eq!(body["email"], "ada@example.com");
    }

    #[test]
    fn test_password_response_parsing() {
        let parsed: PasswordResponse = serde_json::from_str(
            r#"{"kind":"identitytoolkit#VerifyPasswordResponse","localId":"uid-1","email":"ada@example.com","displayName":"","idToken":"tok","registered":true,"refreshToken":"r","expiresIn":"3600"}"#,
        )
        .unwrap();
        let session = AuthSession::try_from(parsed).unwrap();
        assert_eq!(session.user_id.as_str(), "uid-1");
        assert_eq!(session.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_password_response_with_bad_email_is_rejected() {
        let parsed: PasswordResponse =
            serde_json::from_str(r#"{"localId":"uid-1","email":"nope","idToken":"tok"}"#).unwrap();
        assert!(matches!(
            AuthSession::try_from(parsed),
            Err(AuthError::InvalidEmail(_))
        ));
    }
}
