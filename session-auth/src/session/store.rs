//! Process-wide session context with persistence under a single storage key.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Tokens, UserIdentity};
use crate::storage::{MemoryStorage, Storage};

/// Default storage key for the persisted session.
pub const DEFAULT_SESSION_KEY: &str = "auth-storage";

/// Snapshot of the current authentication state.
///
/// `is_authenticated` is computed from the other fields, so it can never
/// disagree with them.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserIdentity>,
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub token_type: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// Time left on the access token, negative once it has lapsed.
    ///
    /// Informational only; refresh is driven by the backend answering 401.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }

    fn from_grant(user: UserIdentity, tokens: Tokens) -> Self {
        Self {
            user: Some(user),
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            token_type: Some(tokens.token_type),
            expires_at: tokens.expires_at,
        }
    }

    fn into_persisted(self) -> PersistedSession {
        let is_authenticated = self.is_authenticated();
        PersistedSession {
            user: self.user,
            access_token: self.access_token.map(|t| t.expose_secret().clone()),
            refresh_token: self.refresh_token.map(|t| t.expose_secret().clone()),
            token_type: self.token_type,
            expires_at: self.expires_at,
            is_authenticated,
        }
    }
}

/// On-disk form of a [`Session`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    user: Option<UserIdentity>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_authenticated: bool,
}

impl From<PersistedSession> for Session {
    fn from(persisted: PersistedSession) -> Self {
        Self {
            user: persisted.user,
            access_token: persisted.access_token.map(SecretString::from),
            refresh_token: persisted.refresh_token.map(SecretString::from),
            token_type: persisted.token_type,
            expires_at: persisted.expires_at,
        }
    }
}

/// Owner of the session state.
///
/// Other components hold an `Arc<SessionStore>`, read through the accessors,
/// and mutate only through [`set_session`](Self::set_session) and
/// [`clear_session`](Self::clear_session). Both mutations are synchronous and
/// never hold the lock across an await.
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn Storage>,
    key: String,
}

impl SessionStore {
    /// Load the session persisted under `key`, or start empty.
    ///
    /// A persisted value that cannot be read or decoded is discarded so the
    /// client starts unauthenticated rather than failing.
    pub fn init(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let session = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => {
                    let session = Session::from(persisted);
                    if session.is_authenticated() {
                        debug!("Reloaded persisted session");
                        session
                    } else {
                        Session::default()
                    }
                }
                Err(e) => {
                    warn!("Discarding unreadable persisted session: {}", e);
                    Session::default()
                }
            },
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("Failed to load persisted session: {}", e);
                Session::default()
            }
        };

        Self {
            state: RwLock::new(session),
            storage,
            key,
        }
    }

    /// A store that persists nothing beyond the process.
    pub fn in_memory() -> Self {
        Self::init(Arc::new(MemoryStorage::new()), DEFAULT_SESSION_KEY)
    }

    /// Clone of the current session.
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Atomically replace the whole session with a new identity and token pair.
    ///
    /// Persistence failures are logged; the in-memory session is updated regardless.
    pub fn set_session(&self, user: UserIdentity, tokens: Tokens) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Session::from_grant(user, tokens);

        match serde_json::to_string(&state.clone().into_persisted()) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(&self.key, &raw) {
                    warn!("Failed to persist session: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize session: {}", e),
        }
        debug!("Session established");
    }

    /// Drop the identity and both tokens. Always succeeds locally.
    pub fn clear_session(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Session::default();

        if let Err(e) = self.storage.remove(&self.key) {
            warn!("Failed to remove persisted session: {}", e);
        }
        debug!("Session cleared");
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}
