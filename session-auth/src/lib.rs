//! # session-auth
//!
//! Client-side authentication for the identity administration API:
//! - Session store persisted under a single storage key
//! - Authenticated HTTP client that injects the bearer token and refreshes once on 401
//! - OIDC login flow (provider discovery, initiation, callback, logout)
//! - Key/value storage with optional AES-256-GCM encryption at rest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_auth::{
//!     api::HttpIdentityBackend,
//!     http::AuthenticatedClientBuilder,
//!     oidc::{FlowCoordinator, PendingAttemptStore},
//!     session::SessionStore,
//! };
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod navigation;
pub mod oidc;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use navigation::Navigator;
pub use session::SessionStore;
