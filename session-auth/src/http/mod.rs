//! Authenticated request gateway.

mod client;
mod refresh;

pub use client::{
    ApiClient, AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig,
    DEFAULT_API_BASE_URL,
};
pub use refresh::TokenRefreshMiddleware;
