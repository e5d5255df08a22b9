//! User administration on top of the authenticated `session-auth` client.
//!
//! Consumers such as the CLI depend on `domain` for user operations and its
//! error tree, and do not need to interpret `session_auth` errors directly.
pub use session_auth::http::ApiClient;

pub mod error;
pub mod user;
pub mod users;
