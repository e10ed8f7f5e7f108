//! Canonical-id resolution for DeFi entity names
//!
//! Free-text names ("Arbitrum", "Stargate", "USDT") are mapped to the ids
//! REST backends expect by asking an LLM to pick from a fixed registry, then
//! checking the answer against that registry locally. Large registries can
//! be held in a remote context cache so they are not resent on every call.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod logging;
pub mod not_found;
pub mod registry;
pub mod resolver;
pub mod sanitize;
pub mod startup;

pub use cache::{CacheInitStatus, ContextCacheManager, InitReport, InitStrategy};
pub use config::CanonConfig;
pub use context::build_context;
pub use error::{CacheError, ConfigError, LlmError, RegistryError};
pub use llm::{CompletionModel, CompletionRequest, ContextCacheService, GeminiClient};
pub use not_found::{is_not_found, NOT_FOUND_SENTINEL};
pub use registry::{EntityRegistry, Registries};
pub use resolver::{
    make_resolver, ContextSource, DefaultMessageBuilder, EntityResolver, EntityResolvers,
    MessageBuilder, ResolveFn, ResolverConfig,
};
pub use sanitize::{sanitize_name, sanitize_numeric, sanitize_slug, strip_decoration, Sanitizer};
pub use startup::{warm_up, Canon, WarmupOutcome};

pub use canon_types;
