//! Context cache lifecycle management
//!
//! The manager owns one optional remote cache per entity type. The handle
//! table is written during initialization and by explicit lifecycle calls,
//! and read by resolvers on every call. A missing handle is never an error:
//! resolvers fall back to sending their context inline.

use crate::config::CanonConfig;
use crate::context::build_context;
use crate::error::{CacheError, CacheResult};
use crate::llm::prompt_templates::cache_system_instruction;
use crate::llm::{ContextCacheService, CreateCacheRequest};
use crate::registry::{EntityRegistry, Registries};
use canon_types::{CacheHandle, CacheMetadata, EntityType};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// How per-type caches are created at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStrategy {
    /// One entity type after another
    #[default]
    Sequential,
    /// All entity types concurrently; outcomes are identical
    Parallel,
}

/// Result of creating the cache for one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheInitStatus {
    /// Remote cache created under this name
    Created(String),
    /// Remote call failed; the entity type runs uncached
    Failed(String),
    /// No credential configured
    Disabled,
}

/// Per-entity-type outcome of an initialization pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub entries: Vec<(EntityType, CacheInitStatus)>,
}

impl InitReport {
    pub fn status(&self, entity_type: EntityType) -> Option<&CacheInitStatus> {
        self.entries
            .iter()
            .find(|(t, _)| *t == entity_type)
            .map(|(_, status)| status)
    }

    pub fn created(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, status)| matches!(status, CacheInitStatus::Created(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, status)| matches!(status, CacheInitStatus::Failed(_)))
            .count()
    }
}

/// Owner of the per-entity-type remote context caches
pub struct ContextCacheManager {
    /// `None` when no credential is configured
    service: Option<Arc<dyn ContextCacheService>>,
    model: String,
    ttl_seconds: u64,
    handles: RwLock<HashMap<EntityType, CacheHandle>>,
}

impl std::fmt::Debug for ContextCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCacheManager")
            .field("enabled", &self.is_enabled())
            .field("model", &self.model)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl ContextCacheManager {
    pub fn new(
        service: Option<Arc<dyn ContextCacheService>>,
        model: impl Into<String>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            service,
            model: model.into(),
            ttl_seconds,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Manager that never creates caches
    pub fn disabled(model: impl Into<String>) -> Self {
        Self::new(None, model, crate::config::defaults::CACHE_TTL_SECS)
    }

    /// Use `service` only when the configuration carries a credential
    pub fn from_config(config: &CanonConfig, service: Arc<dyn ContextCacheService>) -> Self {
        let service = config.has_credentials().then_some(service);
        Self::new(service, config.model.clone(), config.cache_ttl_secs)
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create caches for every registry, one entity type at a time
    pub async fn initialize(&self, registries: &Registries) -> InitReport {
        self.initialize_with(registries, InitStrategy::Sequential)
            .await
    }

    /// Create caches for every registry concurrently
    pub async fn initialize_parallel(&self, registries: &Registries) -> InitReport {
        self.initialize_with(registries, InitStrategy::Parallel).await
    }

    /// Create one cache per registry; failures are logged and isolated
    #[instrument(skip_all, fields(strategy = ?strategy, registries = registries.len()))]
    pub async fn initialize_with(
        &self,
        registries: &Registries,
        strategy: InitStrategy,
    ) -> InitReport {
        let Some(service) = self.service.as_ref() else {
            warn!(
                "No LLM API credential configured; context caching disabled, \
                 resolvers will send context inline"
            );
            return InitReport {
                entries: registries
                    .iter()
                    .map(|registry| (registry.entity_type(), CacheInitStatus::Disabled))
                    .collect(),
            };
        };

        info!("Initializing context caches");

        let entries = match strategy {
            InitStrategy::Sequential => {
                let mut entries = Vec::with_capacity(registries.len());
                for registry in registries.iter() {
                    let status = self.create_for(service.as_ref(), registry).await;
                    entries.push((registry.entity_type(), status));
                }
                entries
            }
            InitStrategy::Parallel => {
                join_all(registries.iter().map(|registry| async move {
                    let status = self.create_for(service.as_ref(), registry).await;
                    (registry.entity_type(), status)
                }))
                .await
            }
        };

        let report = InitReport { entries };
        info!(
            created = report.created(),
            failed = report.failed(),
            "Context cache initialization finished"
        );
        report
    }

    async fn create_for(
        &self,
        service: &dyn ContextCacheService,
        registry: &EntityRegistry,
    ) -> CacheInitStatus {
        let entity_type = registry.entity_type();
        let request = CreateCacheRequest {
            model: self.model.clone(),
            display_name: format!("canon-{entity_type}"),
            system_instruction: cache_system_instruction(entity_type),
            content: build_context(registry.records()),
            ttl_seconds: self.ttl_seconds,
        };

        debug!(
            entity_type = %entity_type,
            records = registry.len(),
            context_chars = request.content.len(),
            "Creating context cache"
        );

        match service.create(&request).await {
            Ok(metadata) => {
                let handle = CacheHandle::new(metadata.name.clone(), entity_type, self.ttl_seconds);
                self.handles.write().await.insert(entity_type, handle);
                info!(
                    entity_type = %entity_type,
                    cache = %metadata.name,
                    ttl_seconds = self.ttl_seconds,
                    "Created context cache"
                );
                CacheInitStatus::Created(metadata.name)
            }
            Err(e) => {
                self.handles.write().await.remove(&entity_type);
                error!(
                    entity_type = %entity_type,
                    error = %e,
                    "Failed to create context cache; resolver will use inline context"
                );
                CacheInitStatus::Failed(e.to_string())
            }
        }
    }

    /// Current handle for an entity type, if a cache was created
    pub async fn get(&self, entity_type: EntityType) -> Option<CacheHandle> {
        self.handles.read().await.get(&entity_type).cloned()
    }

    /// All live handles in `EntityType::ALL` order
    pub async fn handles(&self) -> Vec<CacheHandle> {
        let handles = self.handles.read().await;
        EntityType::ALL
            .iter()
            .filter_map(|entity_type| handles.get(entity_type).cloned())
            .collect()
    }

    /// Drop the handle for `entity_type` if it still names `name`
    ///
    /// Called when a call bound to the cache fails, so later calls go
    /// inline until the cache is recreated. A handle already replaced by
    /// [`ContextCacheManager::recreate`] is left alone. Returns whether a
    /// handle was removed.
    pub async fn invalidate(&self, entity_type: EntityType, name: &str) -> bool {
        let mut handles = self.handles.write().await;
        if handles.get(&entity_type).is_some_and(|handle| handle.name == name) {
            handles.remove(&entity_type);
            warn!(
                entity_type = %entity_type,
                cache = %name,
                "Dropped context cache handle; resolver will use inline context"
            );
            true
        } else {
            false
        }
    }

    /// Replace the cache for one entity type with a freshly created one
    ///
    /// Expired caches are recreated rather than extended. The previous remote
    /// cache is left to expire on its own.
    #[instrument(skip_all, fields(entity_type = %registry.entity_type()))]
    pub async fn recreate(&self, registry: &EntityRegistry) -> Option<CacheHandle> {
        let Some(service) = self.service.as_ref() else {
            debug!("Context caching disabled; nothing to recreate");
            return None;
        };

        match self.create_for(service.as_ref(), registry).await {
            CacheInitStatus::Created(_) => self.get(registry.entity_type()).await,
            _ => None,
        }
    }

    fn service(&self) -> CacheResult<&Arc<dyn ContextCacheService>> {
        self.service.as_ref().ok_or(CacheError::Disabled)
    }

    /// Every remote cache visible to the credential, across all pages
    #[instrument(skip(self))]
    pub async fn list(&self, page_size: u32) -> CacheResult<Vec<CacheMetadata>> {
        let service = self.service()?;
        let mut caches = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = service
                .list_page(page_size, page_token.as_deref())
                .await
                .inspect_err(|e| error!(error = %e, "Failed to list context caches"))?;

            caches.extend(page.caches);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = caches.len(), "Listed context caches");
        Ok(caches)
    }

    /// Remote metadata for one cache
    pub async fn metadata(&self, name: &str) -> CacheResult<CacheMetadata> {
        self.service()?
            .get(name)
            .await
            .inspect_err(|e| error!(cache = %name, error = %e, "Failed to fetch context cache"))
            .map_err(CacheError::from)
    }

    /// Set a new TTL on a remote cache
    #[instrument(skip(self))]
    pub async fn update(&self, name: &str, ttl_seconds: u64) -> CacheResult<CacheMetadata> {
        let metadata = self
            .service()?
            .update_ttl(name, ttl_seconds)
            .await
            .inspect_err(|e| {
                error!(cache = %name, error = %e, "Failed to update context cache TTL")
            })?;
        info!(cache = %name, ttl_seconds, "Updated context cache TTL");
        Ok(metadata)
    }

    /// Delete a remote cache and forget any handle pointing at it
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> CacheResult<()> {
        self.service()?
            .delete(name)
            .await
            .inspect_err(|e| error!(cache = %name, error = %e, "Failed to delete context cache"))?;

        self.handles
            .write()
            .await
            .retain(|_, handle| handle.name != name);
        info!(cache = %name, "Deleted context cache");
        Ok(())
    }
}
