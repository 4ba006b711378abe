//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Base URL of the Supabase project
//!   (e.g. <https://xyzcompany.supabase.co>)
//! - `SUPABASE_ANON_KEY` - Publishable (anon) API key
//!
//! ## Optional
//! - `KV_THUMBNAIL_BUCKET` - Storage bucket for thumbnails (default: THUMBNAIL)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "insert",
    "enter-",
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

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Supabase collaborator configuration.
    pub supabase: SupabaseConfig,
}

/// Supabase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL. Auth, REST, and storage endpoints hang off it.
    pub project_url: Url,
    /// Anon API key, sent as `apikey` header on every request.
    pub anon_key: SecretString,
    /// Storage bucket holding asset thumbnails.
    pub thumbnail_bucket: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("project_url", &self.project_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("thumbnail_bucket", &self.thumbnail_bucket)
            .finish()
    }
}

impl AppConfig {
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

        Ok(Self {
            supabase: SupabaseConfig::from_env()?,
        })
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("SUPABASE_URL")?;
        let project_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_owned(), e.to_string()))?;
        if project_url.host_str().is_none() {
            return Err(ConfigError::InvalidEnvVar(
                "SUPABASE_URL".to_owned(),
                "must have a host".to_owned(),
            ));
        }

        let anon_key = get_required_env("SUPABASE_ANON_KEY")?;
        validate_secret_strength(&anon_key, "SUPABASE_ANON_KEY")?;

        Ok(Self {
            project_url,
            anon_key: SecretString::from(anon_key),
            thumbnail_bucket: get_env_or_default("KV_THUMBNAIL_BUCKET", "THUMBNAIL"),
        })
    }

    /// Expose the anon key for request headers.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }

    /// Build an endpoint URL under the project base.
    ///
    /// `path` is joined without leading-slash surprises, so
    /// `endpoint("rest/v1/kv_assets")` works for any project URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.project_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
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
