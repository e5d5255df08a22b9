//! OIDC login flow: discovery, initiation, callback and logout.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use super::callback::CallbackParams;
use super::pending::{PendingAttempt, PendingAttemptStore};
use super::state::{generate_token, states_match};
use super::OidcProvider;
use crate::api::{CallbackRequest, IdentityBackend, InitiateRequest};
use crate::error::{oidc_error, Error, ErrorKind, OidcErrorKind};
use crate::navigation::Navigator;
use crate::session::{SessionStore, UserIdentity};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5173/auth/callback";
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:5173/login";
pub const DEFAULT_LOGOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Locations and limits used by the [`FlowCoordinator`].
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Callback URL registered with the backend for the code redirect.
    pub redirect_uri: String,
    /// Where the user is sent after logout.
    pub login_url: String,
    /// Upper bound on the remote logout notification.
    pub logout_timeout: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            logout_timeout: DEFAULT_LOGOUT_TIMEOUT,
        }
    }
}

/// Where initiation sent the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRedirect {
    pub provider_id: String,
    pub authorization_url: String,
    pub state: String,
}

/// Result of handling a callback.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    /// The code was exchanged and the session established.
    Authenticated(UserIdentity),
    /// This redirect was already handled; nothing was done.
    AlreadyProcessed,
}

/// Drives the login state machine on top of the identity backend.
///
/// Initiation and callback are independent steps connected only by the
/// persisted [`PendingAttempt`], so a callback may be handled by a different
/// process than the one that initiated the login.
pub struct FlowCoordinator {
    backend: Arc<dyn IdentityBackend>,
    session: Arc<SessionStore>,
    pending: PendingAttemptStore,
    navigator: Arc<dyn Navigator>,
    settings: FlowSettings,
    providers: RwLock<Vec<OidcProvider>>,
    processed: Mutex<HashSet<String>>,
}

impl FlowCoordinator {
    pub fn new(
        backend: Arc<dyn IdentityBackend>,
        session: Arc<SessionStore>,
        pending: PendingAttemptStore,
        navigator: Arc<dyn Navigator>,
        settings: FlowSettings,
    ) -> Self {
        Self {
            backend,
            session,
            pending,
            navigator,
            settings,
            providers: RwLock::new(Vec::new()),
            processed: Mutex::new(HashSet::new()),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Providers from the most recent successful discovery.
    pub fn providers(&self) -> Vec<OidcProvider> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch the enabled providers. An empty list is a valid result.
    pub async fn discover(&self) -> Result<Vec<OidcProvider>, Error> {
        let providers = self.backend.providers().await.map_err(|e| {
            warn!("Provider discovery failed: {}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Oidc(OidcErrorKind::ProviderUnavailable),
            }
        })?;

        let enabled: Vec<OidcProvider> = providers.into_iter().filter(|p| p.enabled).collect();
        debug!("Discovered {} enabled provider(s)", enabled.len());

        *self.providers.write().unwrap_or_else(PoisonError::into_inner) = enabled.clone();
        Ok(enabled)
    }

    /// Start a login with `provider_id` and redirect to its authorization URL.
    ///
    /// Any earlier pending attempt is overwritten.
    pub async fn initiate(&self, provider_id: &str) -> Result<AuthorizationRedirect, Error> {
        let mut providers = self.providers();
        if providers.is_empty() {
            providers = self.discover().await?;
        }
        if providers.is_empty() {
            return Err(oidc_error(
                OidcErrorKind::ProviderUnavailable,
                "no identity providers are configured",
            ));
        }
        if !providers.iter().any(|p| p.provider_id == provider_id && p.enabled) {
            return Err(oidc_error(
                OidcErrorKind::UnknownProvider,
                &format!("provider '{}' is not enabled", provider_id),
            ));
        }

        let request = InitiateRequest {
            provider_id: provider_id.to_string(),
            redirect_uri: self.settings.redirect_uri.clone(),
            state: generate_token(),
            nonce: Some(generate_token()),
        };
        let response = self.backend.initiate(&request).await?;
        if response.state != request.state {
            debug!("Backend assigned its own state value");
        }

        let attempt = PendingAttempt::new(
            response.state.clone(),
            response.code_verifier,
            provider_id.to_string(),
        );
        self.pending.save(&attempt)?;

        info!("Login initiated with provider {}", provider_id);
        self.navigator.redirect(&response.authorization_url);

        Ok(AuthorizationRedirect {
            provider_id: provider_id.to_string(),
            authorization_url: response.authorization_url,
            state: response.state,
        })
    }

    /// Complete a login from the provider's redirect.
    ///
    /// The pending attempt is consumed before anything is validated, so it is
    /// gone whether this succeeds or fails. The session is only touched on
    /// success.
    pub async fn handle_callback(&self, params: CallbackParams) -> Result<CallbackOutcome, Error> {
        // A state is only marked processed once its attempt has been consumed
        let attempt = match params.state() {
            Some(state) => {
                let mut processed = self.processed.lock().unwrap_or_else(PoisonError::into_inner);
                if processed.contains(state) {
                    debug!("Ignoring repeated callback");
                    return Ok(CallbackOutcome::AlreadyProcessed);
                }
                let attempt = self.pending.take()?;
                processed.insert(state.to_string());
                attempt
            }
            None => self.pending.take()?,
        };

        let (code, state) = match params {
            CallbackParams::Authorized { code, state } => (code, state),
            CallbackParams::Denied {
                error, description, ..
            } => {
                warn!("Identity provider returned error: {}", error);
                let message = match description {
                    Some(description) => format!("{}: {}", error, description),
                    None => error,
                };
                return Err(oidc_error(OidcErrorKind::ProviderDenied, &message));
            }
        };

        let attempt = attempt.ok_or_else(|| {
            warn!("Callback received without a pending login attempt");
            oidc_error(OidcErrorKind::StateMismatch, "no pending login attempt")
        })?;
        if !states_match(&attempt.state, &state) {
            warn!("Callback state does not match the pending attempt");
            return Err(oidc_error(
                OidcErrorKind::StateMismatch,
                "state does not match the pending login attempt",
            ));
        }
        if attempt.is_expired(self.pending.ttl()) {
            return Err(oidc_error(
                OidcErrorKind::AttemptExpired,
                "pending login attempt has expired",
            ));
        }

        let request = CallbackRequest {
            provider_id: attempt.provider_id,
            code,
            state,
            code_verifier: attempt.code_verifier,
        };
        let response = self.backend.exchange_code(&request).await.inspect_err(|e| {
            warn!("Code exchange with provider {} failed: {}", request.provider_id, e);
        })?;

        let (user, tokens) = response.into_parts();
        self.session.set_session(user.clone(), tokens);
        info!("Authenticated as {}", user.username);

        Ok(CallbackOutcome::Authenticated(user))
    }

    /// End the session.
    ///
    /// The backend is notified on a best-effort basis; the local session is
    /// cleared and the user sent to the login page regardless.
    pub async fn logout(&self) {
        let session = self.session.snapshot();
        if let (Some(access_token), Some(refresh_token)) =
            (&session.access_token, &session.refresh_token)
        {
            let notify = self
                .backend
                .logout(access_token.expose_secret(), refresh_token.expose_secret());
            match tokio::time::timeout(self.settings.logout_timeout, notify).await {
                Ok(Ok(())) => debug!("Backend acknowledged logout"),
                Ok(Err(e)) => warn!("Remote logout failed: {}", e),
                Err(_) => warn!(
                    "Remote logout timed out after {:?}",
                    self.settings.logout_timeout
                ),
            }
        }

        self.session.clear_session();
        info!("Logged out");
        self.navigator.redirect(&self.settings.login_url);
    }
}

impl std::fmt::Debug for FlowCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowCoordinator")
            .field("session", &self.session)
            .field("pending", &self.pending)
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthResponse, InitiateResponse};
    use crate::error::{http_error, HttpErrorKind, StorageErrorKind};
    use crate::navigation::testing::RecordingNavigator;
    use crate::oidc::pending::DEFAULT_PENDING_KEY;
    use crate::oidc::ProviderType;
    use crate::session::Tokens;
    use crate::storage::{MemoryStorage, Storage};
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy, PartialEq)]
    enum LogoutBehavior {
        Succeed,
        Fail,
        Hang,
    }

    // Mock backend for testing
    struct MockBackend {
        providers: Vec<OidcProvider>,
        discovery_fails: bool,
        server_state: Option<String>,
        exchange_fails: bool,
        logout_behavior: LogoutBehavior,
        initiate_requests: Mutex<Vec<InitiateRequest>>,
        exchange_requests: Mutex<Vec<CallbackRequest>>,
        logout_calls: AtomicUsize,
        logout_tokens: Mutex<Vec<(String, String)>>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                providers: vec![provider("google", true), provider("legacy", false)],
                discovery_fails: false,
                server_state: None,
                exchange_fails: false,
                logout_behavior: LogoutBehavior::Succeed,
                initiate_requests: Mutex::new(Vec::new()),
                exchange_requests: Mutex::new(Vec::new()),
                logout_calls: AtomicUsize::new(0),
                logout_tokens: Mutex::new(Vec::new()),
            }
        }

        fn exchange_count(&self) -> usize {
            self.exchange_requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl IdentityBackend for MockBackend {
        async fn providers(&self) -> Result<Vec<OidcProvider>, Error> {
            if self.discovery_fails {
                return Err(http_error(HttpErrorKind::Rejected(503), "unavailable"));
            }
            Ok(self.providers.clone())
        }

        async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateResponse, Error> {
            self.initiate_requests.lock().unwrap().push(request.clone());
            let state = self
                .server_state
                .clone()
                .unwrap_or_else(|| request.state.clone());
            Ok(InitiateResponse {
                authorization_url: format!("https://idp.example.com/authorize?state={}", state),
                state,
                code_verifier: Some("verifier-1".to_string()),
            })
        }

        async fn exchange_code(&self, request: &CallbackRequest) -> Result<AuthResponse, Error> {
            self.exchange_requests.lock().unwrap().push(request.clone());
            if self.exchange_fails {
                return Err(http_error(HttpErrorKind::Rejected(400), "invalid_grant"));
            }
            Ok(AuthResponse {
                access_token: "access-1".to_string(),
                refresh_token: "refresh-1".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: Some(900),
                user: user("u1"),
            })
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<AuthResponse, Error> {
            Err(http_error(HttpErrorKind::Unauthorized, "not used"))
        }

        async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), Error> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            self.logout_tokens
                .lock()
                .unwrap()
                .push((access_token.to_string(), refresh_token.to_string()));
            match self.logout_behavior {
                LogoutBehavior::Succeed => Ok(()),
                LogoutBehavior::Fail => Err(http_error(HttpErrorKind::Network, "connection reset")),
                LogoutBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(())
                }
            }
        }
    }

    fn provider(id: &str, enabled: bool) -> OidcProvider {
        OidcProvider {
            provider_id: id.to_string(),
            provider_name: None,
            display_name: id.to_uppercase(),
            provider_type: ProviderType::Oidc,
            enabled,
        }
    }

    fn user(id: &str) -> UserIdentity {
        UserIdentity {
            user_id: id.to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            roles: BTreeSet::from(["ADMIN".to_string()]),
            profile: None,
        }
    }

    struct Harness {
        backend: Arc<MockBackend>,
        storage: Arc<MemoryStorage>,
        navigator: Arc<RecordingNavigator>,
        flow: FlowCoordinator,
    }

    fn harness(backend: MockBackend) -> Harness {
        harness_with(backend, FlowSettings::default())
    }

    fn harness_with(backend: MockBackend, settings: FlowSettings) -> Harness {
        let backend = Arc::new(backend);
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let session = Arc::new(SessionStore::init(storage.clone(), "auth-storage"));
        let pending = PendingAttemptStore::new(
            storage.clone(),
            DEFAULT_PENDING_KEY,
            chrono::Duration::minutes(10),
        );
        let flow = FlowCoordinator::new(
            backend.clone(),
            session,
            pending,
            navigator.clone(),
            settings,
        );
        Harness {
            backend,
            storage,
            navigator,
            flow,
        }
    }

    fn save_pending(h: &Harness, state: &str, provider_id: &str) {
        let pending = PendingAttemptStore::new(
            h.storage.clone(),
            DEFAULT_PENDING_KEY,
            chrono::Duration::minutes(10),
        );
        pending
            .save(&PendingAttempt::new(
                state.to_string(),
                None,
                provider_id.to_string(),
            ))
            .unwrap();
    }

    fn pending_exists(h: &Harness) -> bool {
        h.storage.get(DEFAULT_PENDING_KEY).unwrap().is_some()
    }

    #[tokio::test]
    async fn test_discover_returns_enabled_providers() {
        let h = harness(MockBackend::new());

        let providers = h.flow.discover().await.unwrap();

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].provider_id, "google");
        assert_eq!(h.flow.providers(), providers);
    }

    #[tokio::test]
    async fn test_discover_empty_list_is_valid() {
        let mut backend = MockBackend::new();
        backend.providers = Vec::new();
        let h = harness(backend);

        assert!(h.flow.discover().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_failure_is_provider_unavailable() {
        let mut backend = MockBackend::new();
        backend.discovery_fails = true;
        let h = harness(backend);

        let err = h.flow.discover().await.unwrap_err();
        assert!(err.is_provider_unavailable());
    }

    #[tokio::test]
    async fn test_initiate_persists_attempt_and_redirects() {
        let h = harness(MockBackend::new());

        let redirect = h.flow.initiate("google").await.unwrap();

        let requests = h.backend.initiate_requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].provider_id, "google");
        assert_eq!(requests[0].redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(requests[0].state.len(), 64);
        assert!(requests[0].nonce.is_some());

        assert_eq!(h.navigator.targets(), vec![redirect.authorization_url.clone()]);

        let raw = h.storage.get(DEFAULT_PENDING_KEY).unwrap().unwrap();
        let attempt: PendingAttempt = serde_json::from_str(&raw).unwrap();
        assert_eq!(attempt.state, redirect.state);
        assert_eq!(attempt.provider_id, "google");
        assert_eq!(attempt.code_verifier.as_deref(), Some("verifier-1"));
    }

    #[tokio::test]
    async fn test_initiate_prefers_server_state() {
        let mut backend = MockBackend::new();
        backend.server_state = Some("server-state".to_string());
        let h = harness(backend);

        let redirect = h.flow.initiate("google").await.unwrap();

        assert_eq!(redirect.state, "server-state");
        let raw = h.storage.get(DEFAULT_PENDING_KEY).unwrap().unwrap();
        assert!(raw.contains("server-state"));
    }

    #[tokio::test]
    async fn test_initiate_unknown_provider() {
        let h = harness(MockBackend::new());

        let err = h.flow.initiate("legacy").await.unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Oidc(OidcErrorKind::UnknownProvider));
        assert!(h.backend.initiate_requests.lock().unwrap().is_empty());
        assert!(!pending_exists(&h));
    }

    #[tokio::test]
    async fn test_initiate_without_providers() {
        let mut backend = MockBackend::new();
        backend.providers = Vec::new();
        let h = harness(backend);

        let err = h.flow.initiate("google").await.unwrap_err();
        assert!(err.is_provider_unavailable());
    }

    #[tokio::test]
    async fn test_callback_success_scenario() {
        let h = harness(MockBackend::new());
        save_pending(&h, "abc123", "google");

        let outcome = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::Authenticated(user("u1")));
        let requests = h.backend.exchange_requests.lock().unwrap().clone();
        assert_eq!(
            requests,
            vec![CallbackRequest {
                provider_id: "google".to_string(),
                code: "xyz".to_string(),
                state: "abc123".to_string(),
                code_verifier: None,
            }]
        );
        assert!(h.flow.session().is_authenticated());
        assert_eq!(
            h.flow.session().access_token().unwrap().expose_secret(),
            "access-1"
        );
        assert!(!pending_exists(&h));
    }

    #[tokio::test]
    async fn test_callback_state_mismatch_scenario() {
        let h = harness(MockBackend::new());
        save_pending(&h, "abc123", "google");

        let err = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", "wrong"))
            .await
            .unwrap_err();

        assert!(err.is_state_mismatch());
        assert_eq!(h.backend.exchange_count(), 0);
        assert!(!h.flow.session().is_authenticated());
        assert!(!pending_exists(&h));
    }

    #[tokio::test]
    async fn test_callback_without_pending_attempt() {
        let h = harness(MockBackend::new());

        let err = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap_err();

        assert!(err.is_state_mismatch());
        assert_eq!(h.backend.exchange_count(), 0);
    }

    #[tokio::test]
    async fn test_second_initiation_invalidates_first_state() {
        let h = harness(MockBackend::new());
        let first = h.flow.initiate("google").await.unwrap();
        let second = h.flow.initiate("google").await.unwrap();
        assert_ne!(first.state, second.state);

        let err = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", first.state))
            .await
            .unwrap_err();

        assert!(err.is_state_mismatch());
        assert!(!h.flow.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_callback_with_latest_initiation_succeeds() {
        let h = harness(MockBackend::new());
        let redirect = h.flow.initiate("google").await.unwrap();

        let outcome = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", redirect.state))
            .await
            .unwrap();

        assert!(matches!(outcome, CallbackOutcome::Authenticated(_)));
        let requests = h.backend.exchange_requests.lock().unwrap().clone();
        assert_eq!(requests[0].code_verifier.as_deref(), Some("verifier-1"));
    }

    #[tokio::test]
    async fn test_repeated_callback_is_already_processed() {
        let h = harness(MockBackend::new());
        save_pending(&h, "abc123", "google");

        let first = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap();
        let second = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap();

        assert!(matches!(first, CallbackOutcome::Authenticated(_)));
        assert_eq!(second, CallbackOutcome::AlreadyProcessed);
        assert_eq!(h.backend.exchange_count(), 1);
    }

    // Memory storage whose first removal fails
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        failed_once: std::sync::atomic::AtomicBool,
    }

    impl Storage for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, Error> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), Error> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), Error> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(std::io::Error::other("device busy").into());
            }
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_mark_callback_processed() {
        let backend = Arc::new(MockBackend::new());
        let storage = Arc::new(FlakyStorage::default());
        let pending = PendingAttemptStore::new(
            storage.clone(),
            DEFAULT_PENDING_KEY,
            chrono::Duration::minutes(10),
        );
        pending
            .save(&PendingAttempt::new(
                "abc123".to_string(),
                None,
                "google".to_string(),
            ))
            .unwrap();
        let flow = FlowCoordinator::new(
            backend.clone(),
            Arc::new(SessionStore::init(storage.clone(), "auth-storage")),
            pending,
            Arc::new(RecordingNavigator::default()),
            FlowSettings::default(),
        );

        let err = flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Storage(StorageErrorKind::Io));

        let outcome = flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap();
        assert!(matches!(outcome, CallbackOutcome::Authenticated(_)));
        assert_eq!(backend.exchange_count(), 1);
        assert!(flow.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_exchange_failure_consumes_attempt() {
        let mut backend = MockBackend::new();
        backend.exchange_fails = true;
        let h = harness(backend);
        save_pending(&h, "abc123", "google");

        let err = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Http(HttpErrorKind::Rejected(400)));
        assert!(!pending_exists(&h));
        assert!(!h.flow.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_attempt_is_rejected() {
        let h = harness(MockBackend::new());
        let mut attempt = PendingAttempt::new("abc123".to_string(), None, "google".to_string());
        attempt.created_at = chrono::Utc::now() - chrono::Duration::minutes(30);
        h.storage
            .set(DEFAULT_PENDING_KEY, &serde_json::to_string(&attempt).unwrap())
            .unwrap();

        let err = h
            .flow
            .handle_callback(CallbackParams::authorized("xyz", "abc123"))
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Oidc(OidcErrorKind::AttemptExpired));
        assert_eq!(h.backend.exchange_count(), 0);
        assert!(!pending_exists(&h));
    }

    #[tokio::test]
    async fn test_provider_denied_consumes_attempt() {
        let h = harness(MockBackend::new());
        save_pending(&h, "abc123", "google");

        let params = CallbackParams::from_redirect_url(
            "http://localhost:5173/auth/callback?error=access_denied&state=abc123",
        )
        .unwrap();
        let err = h.flow.handle_callback(params).await.unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Oidc(OidcErrorKind::ProviderDenied));
        assert_eq!(h.backend.exchange_count(), 0);
        assert!(!pending_exists(&h));
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_redirects() {
        let h = harness(MockBackend::new());
        h.flow.session().set_session(
            user("u1"),
            Tokens::from_grant("a".into(), "r".into(), "Bearer".into(), None),
        );

        h.flow.logout().await;

        assert_eq!(h.backend.logout_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *h.backend.logout_tokens.lock().unwrap(),
            vec![("a".to_string(), "r".to_string())]
        );
        assert!(!h.flow.session().is_authenticated());
        assert_eq!(h.navigator.targets(), vec![DEFAULT_LOGIN_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_logout_clears_session_when_remote_fails() {
        let mut backend = MockBackend::new();
        backend.logout_behavior = LogoutBehavior::Fail;
        let h = harness(backend);
        h.flow.session().set_session(
            user("u1"),
            Tokens::from_grant("a".into(), "r".into(), "Bearer".into(), None),
        );

        h.flow.logout().await;

        assert!(!h.flow.session().is_authenticated());
        assert_eq!(h.navigator.targets(), vec![DEFAULT_LOGIN_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_logout_clears_session_when_remote_hangs() {
        let mut backend = MockBackend::new();
        backend.logout_behavior = LogoutBehavior::Hang;
        let settings = FlowSettings {
            logout_timeout: Duration::from_millis(50),
            ..FlowSettings::default()
        };
        let h = harness_with(backend, settings);
        h.flow.session().set_session(
            user("u1"),
            Tokens::from_grant("a".into(), "r".into(), "Bearer".into(), None),
        );

        let started = std::time::Instant::now();
        h.flow.logout().await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!h.flow.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_without_session_skips_remote_call() {
        let h = harness(MockBackend::new());

        h.flow.logout().await;

        assert_eq!(h.backend.logout_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.navigator.targets(), vec![DEFAULT_LOGIN_URL.to_string()]);
    }
}
