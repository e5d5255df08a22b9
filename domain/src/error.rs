//! Error types for the `domain` layer.
use session_auth::error::{
    Error as SessionAuthError, ErrorKind as SessionAuthErrorKind, HttpErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Callers such as the CLI depend on `domain` and should not need to
/// inspect `session_auth` errors directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Invalid(String),
    Other(String),
}

/// Enum representing the various kinds of errors reported by the identity backend.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The session is missing or could not be refreshed.
    Unauthenticated,
    Forbidden,
    NotFound,
    Rejected(u16),
    InvalidResponse,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Domain Error: {:?} ({source})", self.error_kind),
            None => write!(f, "Domain Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `session_auth` layer to the `domain` layer.
impl From<SessionAuthError> for Error {
    fn from(err: SessionAuthError) -> Self {
        let error_kind = match &err.error_kind {
            SessionAuthErrorKind::Http(kind) => match kind {
                HttpErrorKind::BuilderFailed => DomainErrorKind::Internal(InternalErrorKind::Config),
                HttpErrorKind::RequestFailed | HttpErrorKind::Network => {
                    DomainErrorKind::External(ExternalErrorKind::Network)
                }
                HttpErrorKind::Unauthorized => {
                    DomainErrorKind::External(ExternalErrorKind::Unauthenticated)
                }
                HttpErrorKind::Rejected(403) => {
                    DomainErrorKind::External(ExternalErrorKind::Forbidden)
                }
                HttpErrorKind::Rejected(404) => {
                    DomainErrorKind::External(ExternalErrorKind::NotFound)
                }
                HttpErrorKind::Rejected(status) => {
                    DomainErrorKind::External(ExternalErrorKind::Rejected(*status))
                }
                HttpErrorKind::InvalidResponse => {
                    DomainErrorKind::External(ExternalErrorKind::InvalidResponse)
                }
            },
            SessionAuthErrorKind::Token(_) => {
                DomainErrorKind::External(ExternalErrorKind::Unauthenticated)
            }
            SessionAuthErrorKind::Oidc(_) => {
                DomainErrorKind::External(ExternalErrorKind::Other("OIDC error".to_string()))
            }
            SessionAuthErrorKind::Storage(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        SessionAuthError::from(err).into()
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        SessionAuthError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_auth::error::{http_error, token_error, TokenErrorKind};

    #[test]
    fn test_unauthorized_translates_to_unauthenticated() {
        let err: Error = http_error(HttpErrorKind::Unauthorized, "401").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Unauthenticated)
        );
    }

    #[test]
    fn test_rejected_statuses_translate() {
        let not_found: Error = http_error(HttpErrorKind::Rejected(404), "404").into();
        assert_eq!(
            not_found.error_kind,
            DomainErrorKind::External(ExternalErrorKind::NotFound)
        );

        let conflict: Error = http_error(HttpErrorKind::Rejected(409), "409").into();
        assert_eq!(
            conflict.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Rejected(409))
        );
    }

    #[test]
    fn test_refresh_failure_translates_to_unauthenticated() {
        let err: Error = token_error(TokenErrorKind::RefreshFailed, "expired").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Unauthenticated)
        );
    }

    #[test]
    fn test_display_includes_source() {
        let err: Error = http_error(HttpErrorKind::Network, "connection refused").into();
        assert!(err.to_string().contains("connection refused"));
    }
}
