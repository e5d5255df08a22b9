//! Token pair issued on login and refresh.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;

/// Access and refresh tokens with metadata.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Access token sent as a bearer credential.
    pub access_token: SecretString,
    /// Refresh token for obtaining a new access token.
    pub refresh_token: SecretString,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// When the access token expires, if the backend said so.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Tokens {
    /// Build tokens from a backend grant where `expires_in` is in seconds.
    pub fn from_grant(
        access_token: String,
        refresh_token: String,
        token_type: String,
        expires_in: Option<i64>,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token),
            refresh_token: SecretString::from(refresh_token),
            token_type,
            expires_at: expires_in
                .filter(|secs| *secs > 0)
                .and_then(Duration::try_seconds)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_grant_sets_expiry() {
        let tokens = Tokens::from_grant(
            "access".to_string(),
            "refresh".to_string(),
            "Bearer".to_string(),
            Some(3600),
        );
        let remaining = tokens.expires_at.unwrap() - Utc::now();
        assert!(remaining > Duration::minutes(59));
    }

    #[test]
    fn test_from_grant_without_expiry() {
        let tokens = Tokens::from_grant(
            "access".to_string(),
            "refresh".to_string(),
            "Bearer".to_string(),
            None,
        );
        assert!(tokens.expires_at.is_none());
    }

    #[test]
    fn test_from_grant_ignores_unrepresentable_expiry() {
        let tokens = Tokens::from_grant(
            "access".to_string(),
            "refresh".to_string(),
            "Bearer".to_string(),
            Some(i64::MAX),
        );
        assert!(tokens.expires_at.is_none());
    }
}
