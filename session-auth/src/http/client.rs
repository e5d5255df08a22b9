//! Authenticated HTTP client builder with middleware.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest_middleware::{ClientBuilder, RequestBuilder};
use url::Url;

use super::TokenRefreshMiddleware;
use crate::api::IdentityBackend;
use crate::error::{Error, ErrorKind, HttpErrorKind};
use crate::navigation::Navigator;
use crate::oidc::DEFAULT_LOGIN_URL;
use crate::session::SessionStore;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Root of the backend API; request paths are appended to it.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Where the user is sent when the session cannot be refreshed.
    pub login_url: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("session-auth/{}", env!("CARGO_PKG_VERSION")),
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

/// Authenticated HTTP client with middleware.
pub type AuthenticatedClient = reqwest_middleware::ClientWithMiddleware;

/// Gateway for every authenticated backend call.
///
/// Wraps an [`AuthenticatedClient`] rooted at the backend's base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: AuthenticatedClient,
    base_url: String,
}

impl ApiClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/users/42`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    pub fn inner(&self) -> &AuthenticatedClient {
        &self.client
    }
}

/// Builder for creating authenticated HTTP clients with middleware.
///
/// Every client it builds injects the session's bearer token and refreshes
/// the session once on a 401.
pub struct AuthenticatedClientBuilder {
    config: HttpClientConfig,
    session: Arc<SessionStore>,
    backend: Arc<dyn IdentityBackend>,
    navigator: Arc<dyn Navigator>,
}

impl AuthenticatedClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new(
        session: Arc<SessionStore>,
        backend: Arc<dyn IdentityBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config: HttpClientConfig::default(),
            session,
            backend,
            navigator,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.config.login_url = login_url.into();
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<ApiClient, Error> {
        Url::parse(&self.config.base_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
        })?;

        // Build the base reqwest client
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let refresh = TokenRefreshMiddleware::new(
            self.session,
            self.backend,
            self.navigator,
            self.config.login_url,
        );
        let client_with_middleware = ClientBuilder::new(client).with(refresh).build();

        Ok(ApiClient {
            client: client_with_middleware,
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
        })
    }
}
