//! Persistence of the in-flight login attempt across the provider redirect.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;
use crate::storage::Storage;

/// Default storage key for the pending attempt.
pub const DEFAULT_PENDING_KEY: &str = "oidc-pending";

/// An initiated login waiting for its callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAttempt {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
}

impl PendingAttempt {
    pub fn new(state: String, code_verifier: Option<String>, provider_id: String) -> Self {
        Self {
            state,
            code_verifier,
            provider_id,
            created_at: Utc::now(),
        }
    }

    /// A deadline past the representable range never expires.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at
            .checked_add_signed(ttl)
            .is_some_and(|deadline| Utc::now() > deadline)
    }
}

/// Holds at most one [`PendingAttempt`] under a single storage key.
///
/// Saving overwrites any earlier attempt, so only the most recent
/// initiation can complete.
#[derive(Clone)]
pub struct PendingAttemptStore {
    storage: Arc<dyn Storage>,
    key: String,
    ttl: Duration,
}

impl PendingAttemptStore {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            storage,
            key: key.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn save(&self, attempt: &PendingAttempt) -> Result<(), Error> {
        let raw = serde_json::to_string(attempt)?;
        self.storage.set(&self.key, &raw)?;
        debug!("Saved pending attempt for provider {}", attempt.provider_id);
        Ok(())
    }

    /// Read the pending attempt without consuming it.
    pub fn peek(&self) -> Result<Option<PendingAttempt>, Error> {
        match self.storage.get(&self.key)? {
            Some(raw) => Ok(Self::decode(&raw)),
            None => Ok(None),
        }
    }

    /// Load and delete the pending attempt.
    ///
    /// The stored value is removed before it is decoded, so an unreadable
    /// attempt is consumed as well and reported as absent.
    pub fn take(&self) -> Result<Option<PendingAttempt>, Error> {
        let raw = self.storage.get(&self.key)?;
        if raw.is_some() {
            self.storage.remove(&self.key)?;
        }
        Ok(raw.as_deref().and_then(Self::decode))
    }

    fn decode(raw: &str) -> Option<PendingAttempt> {
        serde_json::from_str(raw)
            .inspect_err(|e| warn!("Discarding unreadable pending attempt: {}", e))
            .ok()
    }
}

impl std::fmt::Debug for PendingAttemptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAttemptStore")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .finish()
    }
}
