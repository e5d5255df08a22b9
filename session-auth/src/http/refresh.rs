//! Bearer injection with a single refresh-and-retry on 401.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::IdentityBackend;
use crate::error::{token_error, Error, ErrorKind, TokenErrorKind};
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// Middleware that authenticates every request from the [`SessionStore`].
///
/// On a 401 it refreshes the session once and re-issues the request with the
/// new access token. A 401 on the retried request is returned as is. If the
/// refresh itself fails the session is cleared, the user is sent to the login
/// page and the original 401 is returned.
///
/// Concurrent 401s are serialized on a refresh guard. A request that acquires
/// the guard after another one already replaced the token it was sent with
/// retries with the new token instead of refreshing again.
pub struct TokenRefreshMiddleware {
    session: Arc<SessionStore>,
    backend: Arc<dyn IdentityBackend>,
    navigator: Arc<dyn Navigator>,
    login_url: String,
    refresh_guard: Mutex<()>,
}

impl TokenRefreshMiddleware {
    pub fn new(
        session: Arc<SessionStore>,
        backend: Arc<dyn IdentityBackend>,
        navigator: Arc<dyn Navigator>,
        login_url: impl Into<String>,
    ) -> Self {
        Self {
            session,
            backend,
            navigator,
            login_url: login_url.into(),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Obtain an access token to retry with.
    ///
    /// Fails with `Token(NotFound)` when there is nothing to refresh with and
    /// `Token(RefreshFailed)` when the backend refused the refresh, in which
    /// case the session has been cleared and the user sent to the login page.
    async fn recover(&self, sent_with: Option<&SecretString>) -> Result<SecretString, Error> {
        let _guard = self.refresh_guard.lock().await;

        // Another request may have refreshed while this one waited
        if let Some(current) = self.session.access_token() {
            let sent = sent_with.map(|t| t.expose_secret());
            if sent != Some(current.expose_secret()) {
                debug!("Access token was refreshed by another request");
                return Ok(current);
            }
        }

        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| token_error(TokenErrorKind::NotFound, "no refresh token in session"))?;

        match self.backend.refresh(refresh_token.expose_secret()).await {
            Ok(grant) => {
                let (user, tokens) = grant.into_parts();
                let access_token = tokens.access_token.clone();
                self.session.set_session(user, tokens);
                debug!("Access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                self.session.clear_session();
                self.navigator.redirect(&self.login_url);
                Err(Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Token(TokenErrorKind::RefreshFailed),
                })
            }
        }
    }
}

fn set_bearer(request: &mut Request, token: &SecretString) -> reqwest_middleware::Result<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(reqwest_middleware::Error::middleware)?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

#[async_trait]
impl Middleware for TokenRefreshMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut ::http::Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let sent_with = self.session.access_token();
        if let Some(token) = &sent_with {
            set_bearer(&mut req, token)?;
        }

        // Streaming bodies cannot be replayed
        let retry = req.try_clone();

        let response = next.clone().run(req, extensions).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(mut retry) = retry else {
            debug!("Request body is not replayable, propagating 401");
            return Ok(response);
        };

        match self.recover(sent_with.as_ref()).await {
            Ok(token) => {
                set_bearer(&mut retry, &token)?;
                debug!("Retrying {} {} with refreshed token", retry.method(), retry.url());
                next.run(retry, extensions).await
            }
            Err(e) if e.error_kind == ErrorKind::Token(TokenErrorKind::NotFound) => {
                debug!("{}, propagating 401", e);
                Ok(response)
            }
            Err(e) => {
                warn!("Session ended: {}", e);
                Ok(response)
            }
        }
    }
}

impl std::fmt::Debug for TokenRefreshMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRefreshMiddleware")
            .field("login_url", &self.login_url)
            .finish()
    }
}
