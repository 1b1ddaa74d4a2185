//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ZENTRA_BACKEND_URL` - Base URL of the managed backend (e.g., `https://xyz.supabase.co`)
//! - `ZENTRA_BACKEND_ANON_KEY` - Public API key for the backend
//!
//! ## Optional
//! - `ZENTRA_PREFERENCE_FUNCTION` - Serverless function name (default: criar-preferencia)
//! - `ZENTRA_POLL_INTERVAL_SECS` - Payment poll interval (default: 5)
//! - `ZENTRA_POLL_TIMEOUT_SECS` - Payment poll wall-clock timeout (default: 600)
//! - `ZENTRA_REDIRECT_DELAY_MS` - Delay before navigating after a terminal poll status (default: 2000)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_PREFERENCE_FUNCTION: &str = "criar-preferencia";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 600;
const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Checkout flow configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct CheckoutConfig {
    /// Base URL of the managed backend.
    pub backend_url: Url,
    /// Public API key sent with every backend request.
    pub anon_key: SecretString,
    /// Name of the serverless function that mints gateway preferences.
    pub preference_function: String,
    /// Interval between payment-status queries.
    pub poll_interval: Duration,
    /// Wall-clock timeout after which polling gives up.
    pub poll_timeout: Duration,
    /// Delay between reaching a terminal poll status and navigating.
    pub redirect_delay: Duration,
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("backend_url", &self.backend_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("preference_function", &self.preference_function)
            .field("poll_interval", &self.poll_interval)
            .field("poll_timeout", &self.poll_timeout)
            .field("redirect_delay", &self.redirect_delay)
            .finish()
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend_url = get_required_env("ZENTRA_BACKEND_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ZENTRA_BACKEND_URL".to_string(), e.to_string())
            })?;
        let anon_key = get_validated_secret("ZENTRA_BACKEND_ANON_KEY")?;

        let preference_function =
            get_env_or_default("ZENTRA_PREFERENCE_FUNCTION", DEFAULT_PREFERENCE_FUNCTION);

        let poll_interval = Duration::from_secs(get_parsed_or_default(
            "ZENTRA_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?);
        let poll_timeout = Duration::from_secs(get_parsed_or_default(
            "ZENTRA_POLL_TIMEOUT_SECS",
            DEFAULT_POLL_TIMEOUT_SECS,
        )?);
        let redirect_delay = Duration::from_millis(get_parsed_or_default(
            "ZENTRA_REDIRECT_DELAY_MS",
            DEFAULT_REDIRECT_DELAY_MS,
        )?);

        Ok(Self {
            backend_url,
            anon_key,
            preference_function,
            poll_interval,
            poll_timeout,
            redirect_delay,
        })
    }

    /// A configuration suitable for tests: local backend, fast timers.
    #[must_use]
    pub fn for_tests(backend_url: Url) -> Self {
        Self {
            backend_url,
            anon_key: SecretString::from("test-anon-key"),
            preference_function: DEFAULT_PREFERENCE_FUNCTION.to_string(),
            poll_interval: Duration::from_secs(5),
            poll_timeout: Duration::from_secs(600),
            redirect_delay: Duration::from_millis(2000),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed as `u64`, falling back to a default.
fn get_parsed_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
