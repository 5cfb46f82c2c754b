//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] emporium_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The identity provider rejected the request; the message is its own
    /// (e.g. `EMAIL_NOT_FOUND`, `INVALID_PASSWORD`, `EMAIL_EXISTS`).
    #[error("{0}")]
    Provider(String),

    /// HTTP request to the identity provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity provider's response could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl AuthError {
    /// Whether the provider refused because the account already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Provider(message) if message.starts_with("EMAIL_EXISTS"))
    }

    /// Whether the provider refused the password as too weak.
    #[must_use]
    pub fn is_weak_password(&self) -> bool {
        matches!(self, Self::Provider(message) if message.starts_with("WEAK_PASSWORD"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_is_verbatim() {
        let err = AuthError::Provider("EMAIL_NOT_FOUND".to_owned());
        assert_eq!(err.to_string(), "EMAIL_NOT_FOUND");
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_provider_classification() {
        assert!(AuthError::Provider("EMAIL_EXISTS".to_owned()).is_conflict());
        assert!(
            AuthError::Provider(
                "WEAK_PASSWORD : Password should be at least 6 characters".to_owned()
            )
            .is_weak_password()
        );
    }
}
