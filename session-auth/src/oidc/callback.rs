//! Parameters delivered to the redirect URI by the identity provider.

use url::Url;

use crate::error::{oidc_error, Error, ErrorKind, OidcErrorKind};

/// What the provider handed back on the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackParams {
    /// The user authorized; exchange `code` for a session.
    Authorized { code: String, state: String },
    /// The provider reported an error instead of a code.
    Denied {
        error: String,
        description: Option<String>,
        state: Option<String>,
    },
}

impl CallbackParams {
    pub fn authorized(code: impl Into<String>, state: impl Into<String>) -> Self {
        CallbackParams::Authorized {
            code: code.into(),
            state: state.into(),
        }
    }

    /// Parse the full redirect URL, e.g.
    /// `http://localhost:5173/auth/callback?code=xyz&state=abc123`.
    pub fn from_redirect_url(redirect_url: &str) -> Result<Self, Error> {
        let url = Url::parse(redirect_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Oidc(OidcErrorKind::InvalidCallback),
        })?;

        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut description = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Ok(CallbackParams::Denied {
                error,
                description,
                state,
            });
        }

        match (code, state) {
            (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => {
                Ok(CallbackParams::Authorized { code, state })
            }
            _ => Err(oidc_error(
                OidcErrorKind::InvalidCallback,
                "redirect URL is missing code or state",
            )),
        }
    }

    pub fn state(&self) -> Option<&str> {
        match self {
            CallbackParams::Authorized { state, .. } => Some(state),
            CallbackParams::Denied { state, .. } => state.as_deref(),
        }
    }
}
