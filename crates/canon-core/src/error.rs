use canon_types::EntityType;
use thiserror::Error;

/// Errors from the completion and context-cache HTTP services
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Provider error {status}: {body}")]
    Provider { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The model produced no text candidate
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

/// Errors surfaced by explicit cache lifecycle calls
#[derive(Debug, Error)]
pub enum CacheError {
    /// No credential configured, so there is no remote service to talk to
    #[error("Context caching is disabled")]
    Disabled,

    #[error("Remote cache error: {0}")]
    Remote(#[from] LlmError),
}

/// Errors raised while loading or validating an entity registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Record {index} has an empty id")]
    EmptyId { index: usize },

    #[error("Record {id} has an empty name")]
    EmptyName { id: String },

    #[error("Duplicate canonical id: {0}")]
    DuplicateId(String),

    #[error("Id {id:?} is not in canonical {entity_type} form (expected {expected:?})")]
    NonCanonicalId {
        entity_type: EntityType,
        id: String,
        expected: String,
    },

    #[error("Unsupported registry file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

pub type LlmResult<T> = Result<T, LlmError>;
pub type CacheResult<T> = Result<T, CacheError>;
