//! Startup sequence
//!
//! Cache warm-up is awaited before any resolver is handed out, under a
//! bounded timeout. A timed-out warm-up is not fatal: entity types without a
//! handle resolve with inline context until their cache is recorded.

use crate::cache::{ContextCacheManager, InitReport, InitStrategy};
use crate::config::CanonConfig;
use crate::error::LlmResult;
use crate::llm::{CompletionModel, ContextCacheService, GeminiClient};
use crate::registry::Registries;
use crate::resolver::EntityResolvers;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// How the warm-up phase ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmupOutcome {
    /// Initialization completed; per-type results inside
    Warm(InitReport),
    /// Initialization exceeded its timeout
    ///
    /// It keeps running in the background: creates already in flight still
    /// record their handles, and resolvers bind them from the next call on.
    Cold,
}

impl WarmupOutcome {
    pub fn is_warm(&self) -> bool {
        matches!(self, WarmupOutcome::Warm(_))
    }
}

/// Run cache initialization with an upper bound on how long startup waits
#[instrument(skip(manager, registries))]
pub async fn warm_up(
    manager: &Arc<ContextCacheManager>,
    registries: &Registries,
    timeout: Duration,
    strategy: InitStrategy,
) -> WarmupOutcome {
    let init = {
        let manager = Arc::clone(manager);
        let registries = registries.clone();
        tokio::spawn(async move { manager.initialize_with(&registries, strategy).await })
    };

    match tokio::time::timeout(timeout, init).await {
        Ok(Ok(report)) => WarmupOutcome::Warm(report),
        Ok(Err(e)) => {
            error!(error = %e, "Context cache warm-up task failed; starting cold");
            WarmupOutcome::Cold
        }
        Err(_) => {
            let live = manager.handles().await.len();
            warn!(
                timeout_secs = timeout.as_secs_f64(),
                live_handles = live,
                "Context cache warm-up timed out; starting cold, \
                 pending caches will bind when created"
            );
            WarmupOutcome::Cold
        }
    }
}

/// A ready-to-serve resolution subsystem
pub struct Canon {
    pub cache: Arc<ContextCacheManager>,
    pub resolvers: EntityResolvers,
    pub warmup: WarmupOutcome,
}

impl Canon {
    /// Build the Gemini client from `config`, warm the caches and build resolvers
    pub async fn start(config: &CanonConfig, registries: &Registries) -> LlmResult<Self> {
        let client = Arc::new(GeminiClient::from_config(config)?);
        Ok(Self::start_with(config, registries, client.clone(), client).await)
    }

    /// Same as [`Canon::start`] with caller-supplied services
    #[instrument(skip_all, fields(registries = registries.len()))]
    pub async fn start_with(
        config: &CanonConfig,
        registries: &Registries,
        model: Arc<dyn CompletionModel>,
        cache_service: Arc<dyn ContextCacheService>,
    ) -> Self {
        let cache = Arc::new(ContextCacheManager::from_config(config, cache_service));
        let strategy = if config.parallel_cache_init {
            InitStrategy::Parallel
        } else {
            InitStrategy::Sequential
        };

        let warmup = warm_up(&cache, registries, config.warmup_timeout, strategy).await;
        let resolvers = EntityResolvers::build(registries, model, Some(Arc::clone(&cache)));

        info!(
            warm = warmup.is_warm(),
            entity_types = ?resolvers.entity_types(),
            "Resolution subsystem ready"
        );

        Self {
            cache,
            resolvers,
            warmup,
        }
    }
}
