//! OIDC login flow against the identity backend.
//!
//! The backend performs the actual OIDC exchange with the identity provider.
//! This side generates the anti-forgery `state`, remembers the in-flight
//! attempt across the redirect and turns a successful callback into a session.

pub mod callback;
pub mod flow;
pub mod pending;
mod provider;
pub mod state;

pub use callback::CallbackParams;
pub use flow::{
    AuthorizationRedirect, CallbackOutcome, FlowCoordinator, FlowSettings, DEFAULT_LOGIN_URL,
    DEFAULT_LOGOUT_TIMEOUT, DEFAULT_REDIRECT_URI,
};
pub use pending::{PendingAttempt, PendingAttemptStore, DEFAULT_PENDING_KEY};
pub use provider::{OidcProvider, ProviderType};
