//! Client for the identity backend's authentication endpoints.

use async_trait::async_trait;

use crate::error::Error;
use crate::oidc::OidcProvider;

mod http;
pub mod response;
mod types;

pub use http::HttpIdentityBackend;
pub use types::{
    AuthResponse, CallbackRequest, InitiateRequest, InitiateResponse, RefreshTokenRequest,
};

/// Trait for the identity backend's authentication endpoints.
///
/// The Flow Coordinator and the refresh middleware depend on this trait rather
/// than on HTTP directly.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// `GET /oidc-providers?enabled=true`
    async fn providers(&self) -> Result<Vec<OidcProvider>, Error>;

    /// `POST /auth/oidc/initiate`
    async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateResponse, Error>;

    /// `POST /auth/oidc/callback`
    async fn exchange_code(&self, request: &CallbackRequest) -> Result<AuthResponse, Error>;

    /// `POST /auth/token/refresh`
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, Error>;

    /// `POST /auth/logout`, authenticated with the current access token.
    async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), Error>;
}
