//! reqwest implementation of [`IdentityBackend`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::response::{decode_json, ensure_success};
use super::{
    AuthResponse, CallbackRequest, IdentityBackend, InitiateRequest, InitiateResponse,
    RefreshTokenRequest,
};
use crate::error::{Error, ErrorKind, HttpErrorKind};
use crate::oidc::OidcProvider;

/// Identity backend reached over HTTP.
///
/// Uses a plain client without the refresh middleware so that a failing
/// refresh call can never trigger another refresh.
#[derive(Debug, Clone)]
pub struct HttpIdentityBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityBackend {
    /// Create a backend client for the API rooted at `base_url`
    /// (e.g. `http://localhost:8080/api/v1`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("session-auth/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, base_url)
    }

    /// Create a backend client around an existing reqwest client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        Url::parse(base_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
        })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl IdentityBackend for HttpIdentityBackend {
    async fn providers(&self) -> Result<Vec<OidcProvider>, Error> {
        debug!("Fetching enabled identity providers");
        let response = self
            .client
            .get(self.endpoint("/oidc-providers"))
            .query(&[("enabled", "true")])
            .send()
            .await?;

        let providers: Vec<OidcProvider> = decode_json(response).await?;
        Ok(providers.into_iter().filter(|p| p.enabled).collect())
    }

    async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateResponse, Error> {
        debug!("Initiating OIDC login with provider {}", request.provider_id);
        let response = self
            .client
            .post(self.endpoint("/auth/oidc/initiate"))
            .json(request)
            .send()
            .await?;

        decode_json::<InitiateResponse>(response).await?.validate()
    }

    async fn exchange_code(&self, request: &CallbackRequest) -> Result<AuthResponse, Error> {
        debug!("Exchanging authorization code with provider {}", request.provider_id);
        let response = self
            .client
            .post(self.endpoint("/auth/oidc/callback"))
            .json(request)
            .send()
            .await?;

        decode_json::<AuthResponse>(response).await?.validate()
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, Error> {
        debug!("Refreshing access token");
        let response = self
            .client
            .post(self.endpoint("/auth/token/refresh"))
            .json(&RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        decode_json::<AuthResponse>(response).await?.validate()
    }

    async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), Error> {
        let response = self
            .client
            .post(self.endpoint("/auth/logout"))
            .bearer_auth(access_token)
            .json(&RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        ensure_success(response).await.map(|_| ()).inspect_err(|e| {
            warn!("Backend rejected logout: {}", e);
        })
    }
}
