//! Gemini REST client for completions and context caches

use super::{CachePage, CompletionModel, CompletionRequest, ContextCacheService, CreateCacheRequest};
use crate::config::{defaults, CanonConfig};
use crate::error::{LlmError, LlmResult};
use async_trait::async_trait;
use canon_types::CacheMetadata;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Resolution answers are a single id; this leaves room for long names
const MAX_OUTPUT_TOKENS: u32 = 64;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_content: Option<String>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }

    fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate that has any
    fn first_text(&self) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            let text: String = candidate
                .content
                .as_ref()?
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect();
            (!text.trim().is_empty()).then_some(text)
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCachedContent {
    pub model: String,
    pub display_name: String,
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub ttl: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateCachedContent {
    pub ttl: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListCachedContentsResponse {
    #[serde(default)]
    pub cached_contents: Vec<CacheMetadata>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Duration string format the API uses, e.g. `3600s`
fn ttl_string(ttl_seconds: u64) -> String {
    format!("{ttl_seconds}s")
}

/// Gemini client
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl GeminiClient {
    /// Create a client with the default endpoint
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            api_key,
            model: model.into(),
            http_client,
        }
    }

    /// Build a client whose requests time out after `config.http_timeout`
    pub fn from_config(config: &CanonConfig) -> LlmResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self::new(config.api_key.clone(), config.model.clone(), http_client)
            .with_base_url(config.api_base_url.clone()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model resource name, e.g. `models/gemini-2.0-flash-001`
    pub fn model_resource(&self) -> String {
        model_resource(&self.model)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http_client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("x-goog-api-key", key),
            None => builder,
        }
    }

    async fn send<R: DeserializeOwned>(&self, builder: RequestBuilder) -> LlmResult<R> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(LlmError::Provider { status, body });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            // DELETE answers with an empty body on some deployments
            return serde_json::from_str("{}").map_err(LlmError::from);
        }
        serde_json::from_slice(&bytes).map_err(|e| LlmError::malformed(e.to_string()))
    }

    pub(crate) fn generate_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        // A cached content already carries its system instruction; the API
        // rejects a second one on the same call.
        let system_instruction = if request.is_cached() {
            None
        } else {
            request.system_message.clone().map(Content::system)
        };

        GenerateContentRequest {
            contents: vec![Content::user(request.user_message.clone())],
            system_instruction,
            cached_content: request.cached_content.clone(),
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    pub(crate) fn create_cache_body(&self, request: &CreateCacheRequest) -> CreateCachedContent {
        CreateCachedContent {
            model: model_resource(&request.model),
            display_name: request.display_name.clone(),
            system_instruction: Content::system(request.system_instruction.clone()),
            contents: vec![Content::user(request.content.clone())],
            ttl: ttl_string(request.ttl_seconds),
        }
    }
}

fn model_resource(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model, cached = request.is_cached()))]
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<String> {
        let body = self.generate_request(request);
        let path = format!("{}:generateContent", self.model_resource());

        let response: GenerateContentResponse =
            self.send(self.request(Method::POST, &path).json(&body)).await?;

        let text = response.first_text().ok_or(LlmError::EmptyResponse)?;
        debug!(response = %text, "Received completion");
        Ok(text)
    }
}

#[async_trait]
impl ContextCacheService for GeminiClient {
    #[instrument(skip_all, fields(display_name = %request.display_name))]
    async fn create(&self, request: &CreateCacheRequest) -> LlmResult<CacheMetadata> {
        let body = self.create_cache_body(request);
        self.send(self.request(Method::POST, "cachedContents").json(&body))
            .await
    }

    async fn get(&self, name: &str) -> LlmResult<CacheMetadata> {
        self.send(self.request(Method::GET, name)).await
    }

    async fn list_page(&self, page_size: u32, page_token: Option<&str>) -> LlmResult<CachePage> {
        let mut builder = self
            .request(Method::GET, "cachedContents")
            .query(&[("pageSize", page_size.to_string())]);
        if let Some(token) = page_token {
            builder = builder.query(&[("pageToken", token)]);
        }

        let response: ListCachedContentsResponse = self.send(builder).await?;
        Ok(CachePage {
            caches: response.cached_contents,
            next_page_token: response.next_page_token.filter(|token| !token.is_empty()),
        })
    }

    async fn update_ttl(&self, name: &str, ttl_seconds: u64) -> LlmResult<CacheMetadata> {
        let body = UpdateCachedContent {
            ttl: ttl_string(ttl_seconds),
        };
        self.send(
            self.request(Method::PATCH, name)
                .query(&[("updateMask", "ttl")])
                .json(&body),
        )
        .await
    }

    async fn delete(&self, name: &str) -> LlmResult<()> {
        let _: serde_json::Value = self.send(self.request(Method::DELETE, name)).await?;
        Ok(())
    }
}
