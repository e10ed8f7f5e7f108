//! Environment-driven configuration
//!
//! Only a malformed value is an error. A missing API key is a valid
//! configuration that runs every resolver without a remote cache.

use crate::error::ConfigError;
use std::time::Duration;
use tracing::debug;

/// Default configuration values
pub mod defaults {
    /// Model used for both cache creation and completions
    pub const MODEL: &str = "gemini-2.0-flash-001";

    /// Generative Language REST endpoint
    pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Lifetime of a remote context cache
    pub const CACHE_TTL_SECS: u64 = 3600;

    /// Upper bound on startup cache warm-up
    pub const WARMUP_TIMEOUT_SECS: u64 = 30;

    /// Per-request HTTP timeout
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
}

/// Environment variable names
pub mod env_keys {
    pub const API_KEY: &str = "GEMINI_API_KEY";
    pub const MODEL: &str = "CANON_MODEL";
    pub const API_BASE_URL: &str = "CANON_API_BASE_URL";
    pub const CACHE_TTL_SECS: &str = "CANON_CACHE_TTL_SECS";
    pub const WARMUP_TIMEOUT_SECS: &str = "CANON_WARMUP_TIMEOUT_SECS";
    pub const HTTP_TIMEOUT_SECS: &str = "CANON_HTTP_TIMEOUT_SECS";
    pub const PARALLEL_CACHE_INIT: &str = "CANON_PARALLEL_CACHE_INIT";
}

#[derive(Clone)]
pub struct CanonConfig {
    /// LLM vendor credential; `None` means degraded (uncached) mode
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub cache_ttl_secs: u64,
    pub warmup_timeout: Duration,
    pub http_timeout: Duration,
    /// Create the per-type caches concurrently instead of one after another
    pub parallel_cache_init: bool,
}

impl std::fmt::Debug for CanonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("warmup_timeout", &self.warmup_timeout)
            .field("http_timeout", &self.http_timeout)
            .field("parallel_cache_init", &self.parallel_cache_init)
            .finish()
    }
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: defaults::MODEL.to_string(),
            api_base_url: defaults::API_BASE_URL.to_string(),
            cache_ttl_secs: defaults::CACHE_TTL_SECS,
            warmup_timeout: Duration::from_secs(defaults::WARMUP_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
            parallel_cache_init: false,
        }
    }
}

impl CanonConfig {
    /// Load configuration from the process environment (and `.env` if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var(env_keys::API_KEY)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let config = Self {
            api_key,
            model: std::env::var(env_keys::MODEL).unwrap_or_else(|_| defaults::MODEL.to_string()),
            api_base_url: std::env::var(env_keys::API_BASE_URL)
                .unwrap_or_else(|_| defaults::API_BASE_URL.to_string()),
            cache_ttl_secs: parse_u64(env_keys::CACHE_TTL_SECS, defaults::CACHE_TTL_SECS)?,
            warmup_timeout: Duration::from_secs(parse_u64(
                env_keys::WARMUP_TIMEOUT_SECS,
                defaults::WARMUP_TIMEOUT_SECS,
            )?),
            http_timeout: Duration::from_secs(parse_u64(
                env_keys::HTTP_TIMEOUT_SECS,
                defaults::HTTP_TIMEOUT_SECS,
            )?),
            parallel_cache_init: parse_bool(env_keys::PARALLEL_CACHE_INIT, false)?,
        };

        debug!(config = ?config, "Loaded canon configuration");
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value }),
        },
        Err(_) => Ok(default),
    }
}
