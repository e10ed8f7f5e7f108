//! LLM integration
//!
//! The resolver and the cache manager only see the two traits below; the
//! Gemini REST client implements both, and tests substitute stubs.

pub mod gemini_client;
pub mod prompt_templates;

pub use gemini_client::GeminiClient;

use crate::error::LlmResult;
use async_trait::async_trait;
use canon_types::CacheMetadata;

/// One completion call: either inline context in the system message, or a
/// cache handle carrying the context server-side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_message: Option<String>,
    pub user_message: String,
    /// Remote cache name to bind instead of resending the context
    pub cached_content: Option<String>,
}

impl CompletionRequest {
    pub fn is_cached(&self) -> bool {
        self.cached_content.is_some()
    }
}

/// Text completion service
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Return the raw text of the first candidate
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<String>;
}

/// Parameters for creating a remote context cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCacheRequest {
    pub model: String,
    pub display_name: String,
    pub system_instruction: String,
    pub content: String,
    pub ttl_seconds: u64,
}

/// One page of a cache listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePage {
    pub caches: Vec<CacheMetadata>,
    pub next_page_token: Option<String>,
}

/// Remote context-cache lifecycle service
#[async_trait]
pub trait ContextCacheService: Send + Sync {
    async fn create(&self, request: &CreateCacheRequest) -> LlmResult<CacheMetadata>;

    async fn get(&self, name: &str) -> LlmResult<CacheMetadata>;

    async fn list_page(&self, page_size: u32, page_token: Option<&str>) -> LlmResult<CachePage>;

    async fn update_ttl(&self, name: &str, ttl_seconds: u64) -> LlmResult<CacheMetadata>;

    async fn delete(&self, name: &str) -> LlmResult<()>;
}
