use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default identity backend API root used when `API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = session_auth::http::DEFAULT_API_BASE_URL;

/// Default callback URL registered with the backend for the OIDC redirect.
pub const DEFAULT_OIDC_REDIRECT_URI: &str = session_auth::oidc::DEFAULT_REDIRECT_URI;

/// Default login entry point the user is sent to when the session ends.
pub const DEFAULT_LOGIN_URL: &str = session_auth::oidc::DEFAULT_LOGIN_URL;

pub const DEFAULT_STORAGE_DIR: &str = ".auth-admin";

/// Longest accepted pending attempt lifetime, one day.
pub const MAX_PENDING_ATTEMPT_TTL_SECS: u64 = 86_400;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The root URL of the identity backend REST API.
    #[arg(long, env, default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// The callback URL the identity provider redirects to after login.
    #[arg(long, env, default_value = DEFAULT_OIDC_REDIRECT_URI)]
    oidc_redirect_uri: String,

    /// The login entry point used after logout or an unrecoverable refresh failure.
    #[arg(long, env, default_value = DEFAULT_LOGIN_URL)]
    login_url: String,

    /// Directory holding the persisted session and pending login attempt.
    #[arg(long, env, default_value = DEFAULT_STORAGE_DIR)]
    storage_dir: PathBuf,

    /// Storage key for the persisted session.
    #[arg(long, env, default_value = session_auth::session::DEFAULT_SESSION_KEY)]
    pub session_storage_key: String,

    /// Storage key for the pending OIDC login attempt.
    #[arg(long, env, default_value = session_auth::oidc::DEFAULT_PENDING_KEY)]
    pub pending_storage_key: String,

    /// 64 hex characters (32 bytes) used to encrypt persisted state with AES-256-GCM.
    /// State is stored in plain JSON when unset.
    #[arg(long, env, hide_env_values = true)]
    storage_encryption_key: Option<String>,

    /// Timeout in seconds for requests to the backend
    #[arg(long, env, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Timeout in seconds for the best-effort remote logout notification
    #[arg(long, env, default_value_t = 5)]
    pub logout_timeout_secs: u64,

    /// Seconds a pending login attempt stays valid while waiting for its callback
    #[arg(
        long,
        env,
        default_value_t = 600,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PENDING_ATTEMPT_TTL_SECS),
    )]
    pub pending_attempt_ttl_secs: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    /// Configuration from the environment and defaults only, ignoring command line arguments.
    fn default() -> Self {
        Config::parse_from([env!("CARGO_PKG_NAME")])
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn set_api_base_url(mut self, api_base_url: String) -> Self {
        self.api_base_url = api_base_url;
        self
    }

    pub fn oidc_redirect_uri(&self) -> &str {
        &self.oidc_redirect_uri
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn set_storage_dir(mut self, storage_dir: PathBuf) -> Self {
        self.storage_dir = storage_dir;
        self
    }

    /// Returns the storage encryption key, if configured.
    pub fn storage_encryption_key(&self) -> Option<String> {
        self.storage_encryption_key.clone()
    }

    pub fn set_storage_encryption_key(mut self, key: String) -> Self {
        self.storage_encryption_key = Some(key);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn logout_timeout(&self) -> Duration {
        Duration::from_secs(self.logout_timeout_secs)
    }

    pub fn pending_attempt_ttl(&self) -> chrono::Duration {
        let secs = self.pending_attempt_ttl_secs.min(MAX_PENDING_ATTEMPT_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}
