use config::Config;
use log::info;
use session_auth::api::{HttpIdentityBackend, IdentityBackend};
use session_auth::http::{ApiClient, AuthenticatedClientBuilder};
use session_auth::navigation::Navigator;
use session_auth::oidc::{FlowCoordinator, FlowSettings, PendingAttemptStore};
use session_auth::storage::{FileStorage, Storage};
use session_auth::{Error, SessionStore};
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Opens the storage directory holding persisted client state.
///
/// Values are encrypted at rest when a storage encryption key is configured.
pub fn init_storage(config: &Config) -> Result<Arc<dyn Storage>, Error> {
    let mut storage = FileStorage::new(config.storage_dir())?;
    if let Some(key) = config.storage_encryption_key() {
        storage = storage.with_encryption_key(&key)?;
    }
    info!(
        "Storage config: dir={}, encrypted={}",
        storage.dir().display(),
        storage.is_encrypted()
    );

    Ok(Arc::new(storage))
}

// Service-level state containing only infrastructure concerns
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub session: Arc<SessionStore>,
    backend: Arc<dyn IdentityBackend>,
}

impl AppState {
    /// Reloads the persisted session and connects the identity backend client.
    pub fn new(app_config: Config, storage: &Arc<dyn Storage>) -> Result<Self, Error> {
        let session = Arc::new(SessionStore::init(
            Arc::clone(storage),
            app_config.session_storage_key.clone(),
        ));
        let backend = Arc::new(HttpIdentityBackend::new(
            app_config.api_base_url(),
            app_config.request_timeout(),
        )?);

        Ok(Self {
            config: app_config,
            storage: Arc::clone(storage),
            session,
            backend,
        })
    }

    /// Replaces the identity backend, e.g. with a test double.
    pub fn set_backend(&mut self, backend: Arc<dyn IdentityBackend>) {
        self.backend = backend;
    }

    pub fn backend(&self) -> Arc<dyn IdentityBackend> {
        Arc::clone(&self.backend)
    }

    pub fn pending_attempts(&self) -> PendingAttemptStore {
        PendingAttemptStore::new(
            Arc::clone(&self.storage),
            self.config.pending_storage_key.clone(),
            self.config.pending_attempt_ttl(),
        )
    }

    pub fn flow_coordinator(&self, navigator: Arc<dyn Navigator>) -> FlowCoordinator {
        FlowCoordinator::new(
            self.backend(),
            Arc::clone(&self.session),
            self.pending_attempts(),
            navigator,
            FlowSettings {
                redirect_uri: self.config.oidc_redirect_uri().to_string(),
                login_url: self.config.login_url().to_string(),
                logout_timeout: self.config.logout_timeout(),
            },
        )
    }

    /// Client for authenticated API calls sharing this state's session.
    pub fn api_client(&self, navigator: Arc<dyn Navigator>) -> Result<ApiClient, Error> {
        AuthenticatedClientBuilder::new(Arc::clone(&self.session), self.backend(), navigator)
            .with_base_url(self.config.api_base_url())
            .with_timeout(self.config.request_timeout())
            .with_login_url(self.config.login_url())
            .build()
    }
}
