//! Session state: who is signed in and with which tokens.

mod identity;
mod store;
mod tokens;

pub use identity::{IdentityProfile, UserIdentity};
pub use store::{Session, SessionStore, DEFAULT_SESSION_KEY};
pub use tokens::Tokens;
