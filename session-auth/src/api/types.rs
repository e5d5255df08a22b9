//! Wire schemas for the identity backend's authentication endpoints.
//!
//! Every response is validated when it crosses the boundary; a payload that
//! deserializes but is unusable is rejected with `HttpErrorKind::InvalidResponse`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{http_error, Error, HttpErrorKind};
use crate::session::{Tokens, UserIdentity};

/// Body of `POST /auth/oidc/initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    pub provider_id: String,
    pub redirect_uri: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Response of `POST /auth/oidc/initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub authorization_url: String,
    /// May be assigned by the server, overriding the client's value.
    pub state: String,
    #[serde(default)]
    pub code_verifier: Option<String>,
}

impl InitiateResponse {
    pub(crate) fn validate(self) -> Result<Self, Error> {
        let url = Url::parse(&self.authorization_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::error::ErrorKind::Http(HttpErrorKind::InvalidResponse),
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(http_error(
                HttpErrorKind::InvalidResponse,
                "authorizationUrl must be an http(s) URL",
            ));
        }
        if self.state.trim().is_empty() {
            return Err(http_error(
                HttpErrorKind::InvalidResponse,
                "initiate response carries an empty state",
            ));
        }
        Ok(self)
    }
}

/// Body of `POST /auth/oidc/callback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    pub provider_id: String,
    pub code: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
}

/// Body of `POST /auth/token/refresh` and `POST /auth/logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Token grant returned by the callback and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: UserIdentity,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl AuthResponse {
    pub(crate) fn validate(self) -> Result<Self, Error> {
        if self.access_token.trim().is_empty() {
            return Err(http_error(
                HttpErrorKind::InvalidResponse,
                "auth response carries an empty accessToken",
            ));
        }
        if self.refresh_token.trim().is_empty() {
            return Err(http_error(
                HttpErrorKind::InvalidResponse,
                "auth response carries an empty refreshToken",
            ));
        }
        self.user
            .validate()
            .map_err(|msg| http_error(HttpErrorKind::InvalidResponse, msg))?;
        Ok(self)
    }

    /// Split into the identity and token pair stored in the session.
    pub fn into_parts(self) -> (UserIdentity, Tokens) {
        let tokens = Tokens::from_grant(
            self.access_token,
            self.refresh_token,
            self.token_type,
            self.expires_in,
        );
        (self.user, tokens)
    }
}
