//! Error types for the `session-auth` crate.
//!
//! A root Error struct holds an optional source and a tree of error kind enums.
//! The `domain` crate translates these into its own kinds.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for session-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in session-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Http(HttpErrorKind),
    Token(TokenErrorKind),
    Oidc(OidcErrorKind),
    Storage(StorageErrorKind),
}

/// Errors from talking to the identity backend.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    /// Transport-level failure. Never retried automatically.
    Network,
    /// The backend answered 401 and no refresh could recover it.
    Unauthorized,
    /// Any other non-success status.
    Rejected(u16),
    /// The backend answered with a payload that does not match its schema.
    InvalidResponse,
}

/// Errors from session token handling.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    NotFound,
    RefreshFailed,
}

/// Errors from the OIDC login flow.
#[derive(Debug, PartialEq)]
pub enum OidcErrorKind {
    /// No pending attempt, or the returned state does not match it.
    StateMismatch,
    AttemptExpired,
    UnknownProvider,
    ProviderUnavailable,
    /// The identity provider redirected back with an `error` parameter.
    ProviderDenied,
    InvalidCallback,
}

/// Errors from client-side persistence.
#[derive(Debug, PartialEq)]
pub enum StorageErrorKind {
    Io,
    Serialization,
    EncryptionFailed,
    DecryptionFailed,
}

impl Error {
    /// Returns true if this is an OIDC anti-forgery failure.
    pub fn is_state_mismatch(&self) -> bool {
        self.error_kind == ErrorKind::Oidc(OidcErrorKind::StateMismatch)
    }

    /// Returns true if no identity provider could be offered.
    pub fn is_provider_unavailable(&self) -> bool {
        self.error_kind == ErrorKind::Oidc(OidcErrorKind::ProviderUnavailable)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
            ErrorKind::Token(kind) => write!(f, "Token error: {:?}", kind)?,
            ErrorKind::Oidc(kind) => write!(f, "OIDC error: {:?}", kind)?,
            ErrorKind::Storage(kind) => write!(f, "Storage error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_decode() {
            ErrorKind::Http(HttpErrorKind::InvalidResponse)
        } else if err.is_request() && !err.is_connect() && !err.is_timeout() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            other => Error {
                source: Some(Box::new(other)),
                error_kind: ErrorKind::Http(HttpErrorKind::Network),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Storage(StorageErrorKind::Serialization),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Storage(StorageErrorKind::Io),
        }
    }
}

/// Helper function to create HTTP errors.
pub fn http_error(kind: HttpErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Http(kind),
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}

/// Helper function to create OIDC flow errors.
pub fn oidc_error(kind: OidcErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Oidc(kind),
    }
}

/// Helper function to create storage errors.
pub fn storage_error(kind: StorageErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Storage(kind),
    }
}
