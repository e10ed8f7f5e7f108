//! Name to canonical-id resolution
//!
//! One completion call per input, then three gates on the raw answer:
//! the not-found sentinel, the id-shape sanitizer, and membership in the
//! live registry. Only an answer that clears all three is returned. Every
//! failure, including transport errors, collapses to `None`.

use crate::cache::ContextCacheManager;
use crate::context::build_context;
use crate::llm::prompt_templates::{resolver_system_message, resolver_user_message};
use crate::llm::{CompletionModel, CompletionRequest};
use crate::not_found::{is_not_found, NotFoundPredicate};
use crate::registry::{EntityRegistry, Registries};
use crate::sanitize::Sanitizer;
use canon_types::{EntityType, ResolutionOutcome, ResolutionRequest, ResolutionResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Async resolve function handed to downstream API wrappers
///
/// `None` means "could not resolve"; callers should ask the user to
/// disambiguate rather than treat it as an error.
pub type ResolveFn = Arc<dyn Fn(String) -> BoxFuture<'static, Option<String>> + Send + Sync>;

/// Builds the system and user messages for one resolution call
pub trait MessageBuilder: Send + Sync {
    /// `context` is the serialized registry, or `None` when a cache handle
    /// carries it
    fn system_message(&self, entity_type: EntityType, context: Option<&str>) -> String;

    fn user_message(&self, entity_type: EntityType, name: &str) -> String;
}

/// Message builder backed by the standard prompt templates
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessageBuilder;

impl MessageBuilder for DefaultMessageBuilder {
    fn system_message(&self, entity_type: EntityType, context: Option<&str>) -> String {
        resolver_system_message(entity_type, context)
    }

    fn user_message(&self, entity_type: EntityType, name: &str) -> String {
        resolver_user_message(entity_type, name)
    }
}

/// Where the reference context for a call comes from
#[derive(Clone)]
pub enum ContextSource {
    /// Always send the serialized registry in the system message
    Inline,
    /// Bind the entity type's cache handle when one exists, otherwise inline
    Cached(Arc<ContextCacheManager>),
}

impl std::fmt::Debug for ContextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextSource::Inline => f.write_str("Inline"),
            ContextSource::Cached(_) => f.write_str("Cached"),
        }
    }
}

/// Everything a resolver needs for one entity type
#[derive(Clone)]
pub struct ResolverConfig {
    /// Universe of valid answers; also determines the entity type
    pub registry: EntityRegistry,
    pub model: Arc<dyn CompletionModel>,
    pub context_source: ContextSource,
    pub sanitizer: Sanitizer,
    pub not_found: NotFoundPredicate,
    pub message_builder: Arc<dyn MessageBuilder>,
}

impl ResolverConfig {
    /// Inline context, default sanitizer for the id shape, default prompts
    pub fn new(registry: EntityRegistry, model: Arc<dyn CompletionModel>) -> Self {
        let sanitizer = Sanitizer::for_shape(registry.entity_type().id_shape());
        Self {
            registry,
            model,
            context_source: ContextSource::Inline,
            sanitizer,
            not_found: is_not_found,
            message_builder: Arc::new(DefaultMessageBuilder),
        }
    }

    pub fn with_cache(mut self, manager: Arc<ContextCacheManager>) -> Self {
        self.context_source = ContextSource::Cached(manager);
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_not_found(mut self, predicate: NotFoundPredicate) -> Self {
        self.not_found = predicate;
        self
    }

    pub fn with_message_builder(mut self, builder: Arc<dyn MessageBuilder>) -> Self {
        self.message_builder = builder;
        self
    }
}

/// Resolver for a single entity type
pub struct EntityResolver {
    config: ResolverConfig,
    /// Serialized registry, built once
    inline_context: String,
}

impl EntityResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let inline_context = build_context(config.registry.records());
        Self {
            config,
            inline_context,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.config.registry.entity_type()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.config.registry
    }

    /// Resolve a free-text name to a canonical id, or `None`
    pub async fn resolve(&self, name: &str) -> Option<String> {
        self.resolve_detailed(name).await.into_option()
    }

    /// Resolve and report which gate decided the outcome
    #[instrument(skip(self), fields(entity_type = %self.entity_type()))]
    pub async fn resolve_detailed(&self, name: &str) -> ResolutionResult {
        let entity_type = self.entity_type();
        let request = ResolutionRequest::new(entity_type, name);

        let input = name.trim();
        if input.is_empty() {
            debug!("Empty input; nothing to resolve");
            return ResolutionResult::unresolved(request, ResolutionOutcome::NotFound);
        }

        let completion = self.completion_request(input).await;
        let raw = match self.config.model.complete(&completion).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!(
                    input = %input,
                    cached = completion.is_cached(),
                    error = %e,
                    "Resolution call failed"
                );
                self.invalidate_cache(&completion).await;
                return ResolutionResult::unresolved(request, ResolutionOutcome::Failed);
            }
        };
        debug!(raw = %raw, "Model answered");

        if (self.config.not_found)(&raw) {
            warn!("could not resolve {entity_type}: {input}");
            return ResolutionResult::unresolved(request, ResolutionOutcome::NotFound);
        }

        let sanitized = self.config.sanitizer.apply(&raw);
        if sanitized.is_empty() {
            warn!(raw = %raw, "could not resolve {entity_type}: {input} (empty answer)");
            return ResolutionResult::unresolved(request, ResolutionOutcome::EmptyOutput);
        }

        if !self.config.registry.contains(&sanitized) {
            warn!(input = %input, "model returned invalid {entity_type}: {sanitized}");
            return ResolutionResult::unresolved(request, ResolutionOutcome::InvalidOutput);
        }

        info!(input = %input, canonical_id = %sanitized, "Resolved {entity_type}");
        ResolutionResult::resolved(request, sanitized)
    }

    async fn completion_request(&self, input: &str) -> CompletionRequest {
        let entity_type = self.entity_type();
        let handle = match &self.config.context_source {
            ContextSource::Inline => None,
            ContextSource::Cached(manager) => manager.get(entity_type).await,
        };

        let builder = &self.config.message_builder;
        let user_message = builder.user_message(entity_type, input);

        match handle {
            Some(handle) => CompletionRequest {
                system_message: Some(builder.system_message(entity_type, None)),
                user_message,
                cached_content: Some(handle.name),
            },
            None => CompletionRequest {
                system_message: Some(
                    builder.system_message(entity_type, Some(self.inline_context.as_str())),
                ),
                user_message,
                cached_content: None,
            },
        }
    }

    /// A failed call bound to a cache usually means the cache expired or
    /// was removed remotely; stop binding it.
    async fn invalidate_cache(&self, completion: &CompletionRequest) {
        if let (ContextSource::Cached(manager), Some(name)) =
            (&self.config.context_source, completion.cached_content.as_deref())
        {
            manager.invalidate(self.entity_type(), name).await;
        }
    }

    /// Wrap a shared resolver as a [`ResolveFn`]
    pub fn into_fn(self: Arc<Self>) -> ResolveFn {
        Arc::new(move |name: String| {
            let resolver = Arc::clone(&self);
            async move { resolver.resolve(&name).await }.boxed()
        })
    }
}

/// Build a resolve function for one entity type
pub fn make_resolver(config: ResolverConfig) -> ResolveFn {
    Arc::new(EntityResolver::new(config)).into_fn()
}

/// The standard resolver for each registered entity type
#[derive(Clone, Default)]
pub struct EntityResolvers {
    resolvers: HashMap<EntityType, Arc<EntityResolver>>,
}

impl EntityResolvers {
    /// One resolver per registry, bound to `cache` when given
    pub fn build(
        registries: &Registries,
        model: Arc<dyn CompletionModel>,
        cache: Option<Arc<ContextCacheManager>>,
    ) -> Self {
        let resolvers = registries
            .iter()
            .map(|registry| {
                let mut config = ResolverConfig::new(registry.clone(), Arc::clone(&model));
                if let Some(manager) = &cache {
                    config = config.with_cache(Arc::clone(manager));
                }
                (registry.entity_type(), Arc::new(EntityResolver::new(config)))
            })
            .collect();

        Self { resolvers }
    }

    pub fn get(&self, entity_type: EntityType) -> Option<Arc<EntityResolver>> {
        self.resolvers.get(&entity_type).cloned()
    }

    pub fn resolve_fn(&self, entity_type: EntityType) -> Option<ResolveFn> {
        self.get(entity_type).map(EntityResolver::into_fn)
    }

    /// Resolve against the given entity type; `None` if it has no registry
    pub async fn resolve(&self, entity_type: EntityType, name: &str) -> Option<String> {
        match self.resolvers.get(&entity_type) {
            Some(resolver) => resolver.resolve(name).await,
            None => {
                warn!(entity_type = %entity_type, "No registry loaded for entity type");
                None
            }
        }
    }

    pub fn entity_types(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|entity_type| self.resolvers.contains_key(entity_type))
            .collect()
    }
}
