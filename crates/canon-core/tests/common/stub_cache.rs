//! In-memory stand-in for the remote context-cache service

use canon_core::error::{LlmError, LlmResult};
use canon_core::llm::{CachePage, CreateCacheRequest};
use canon_core::ContextCacheService;
use canon_types::CacheMetadata;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct StubCacheService {
    /// Creation fails when the display name contains any of these
    fail_for: Vec<String>,
    /// Pre-seeded listing, one inner vec per page
    pages: Vec<Vec<CacheMetadata>>,
    delay: Option<Duration>,
    counter: AtomicUsize,
    pub created: Mutex<Vec<CreateCacheRequest>>,
    pub updated: Mutex<Vec<(String, u64)>>,
    pub deleted: Mutex<Vec<String>>,
    pub page_requests: Mutex<Vec<Option<String>>>,
}

pub fn metadata(name: &str) -> CacheMetadata {
    CacheMetadata {
        name: name.to_string(),
        model: "models/stub".to_string(),
        display_name: None,
        create_time: None,
        update_time: None,
        expire_time: None,
        usage_metadata: None,
    }
}

#[allow(dead_code)]
impl StubCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, display_name_part: &str) -> Self {
        self.fail_for.push(display_name_part.to_string());
        self
    }

    pub fn with_pages(mut self, pages: Vec<Vec<&str>>) -> Self {
        self.pages = pages
            .into_iter()
            .map(|page| page.into_iter().map(metadata).collect())
            .collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.display_name.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ContextCacheService for StubCacheService {
    async fn create(&self, request: &CreateCacheRequest) -> LlmResult<CacheMetadata> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .fail_for
            .iter()
            .any(|part| request.display_name.contains(part.as_str()))
        {
            return Err(LlmError::Provider {
                status: 500,
                body: format!("cannot cache {}", request.display_name),
            });
        }

        self.created.lock().unwrap().push(request.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(metadata(&format!(
            "cachedContents/{}-{n}",
            request.display_name
        )))
    }

    async fn get(&self, name: &str) -> LlmResult<CacheMetadata> {
        let known = self
            .created
            .lock()
            .unwrap()
            .iter()
            .any(|request| name.contains(request.display_name.as_str()));
        if known {
            Ok(metadata(name))
        } else {
            Err(LlmError::Provider {
                status: 404,
                body: format!("{name} not found"),
            })
        }
    }

    async fn list_page(&self, _page_size: u32, page_token: Option<&str>) -> LlmResult<CachePage> {
        self.page_requests
            .lock()
            .unwrap()
            .push(page_token.map(str::to_string));

        let index = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| LlmError::malformed(format!("bad token {token}")))?,
        };

        let caches = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(CachePage {
            caches,
            next_page_token,
        })
    }

    async fn update_ttl(&self, name: &str, ttl_seconds: u64) -> LlmResult<CacheMetadata> {
        self.updated
            .lock()
            .unwrap()
            .push((name.to_string(), ttl_seconds));
        Ok(metadata(name))
    }

    async fn delete(&self, name: &str) -> LlmResult<()> {
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
