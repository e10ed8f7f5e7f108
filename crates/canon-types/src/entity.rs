//! Entity definitions with type-safe enums
//!
//! Entity types are a closed set so every registry, cache handle and
//! resolver is keyed by the same enum instead of free-form strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use strum::{Display, EnumString, IntoStaticStr};

/// Kinds of entities that downstream connectors address by canonical id
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Blockchains, addressed by chain name (e.g. "Ethereum")
    Chains,
    /// DeFi protocols, addressed by slug (e.g. "aave-v3")
    Protocols,
    /// Stablecoins, addressed by numeric id
    Stablecoins,
    /// Bridges, addressed by numeric id
    Bridges,
}

impl EntityType {
    /// Every entity type, in initialization order
    pub const ALL: [EntityType; 4] = [
        EntityType::Protocols,
        EntityType::Chains,
        EntityType::Stablecoins,
        EntityType::Bridges,
    ];

    /// Shape of the canonical identifier for this entity type
    pub fn id_shape(&self) -> IdShape {
        match self {
            EntityType::Chains => IdShape::Name,
            EntityType::Protocols => IdShape::Slug,
            EntityType::Stablecoins | EntityType::Bridges => IdShape::Numeric,
        }
    }

    /// Singular, human-readable label used in prompts and log lines
    pub fn singular(&self) -> &'static str {
        match self {
            EntityType::Chains => "chain",
            EntityType::Protocols => "protocol",
            EntityType::Stablecoins => "stablecoin",
            EntityType::Bridges => "bridge",
        }
    }
}

/// Format family a canonical identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdShape {
    /// Free-text display name, compared verbatim
    Name,
    /// Lower-case `[a-z0-9_-]` slug
    Slug,
    /// Decimal digits only
    Numeric,
}

/// Canonical identifier as it appears in a registry file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalId {
    Number(u64),
    Text(String),
}

impl CanonicalId {
    /// String form used for prompts and for validating model output
    pub fn as_canonical(&self) -> String {
        match self {
            CanonicalId::Number(n) => n.to_string(),
            CanonicalId::Text(s) => s.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CanonicalId::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalId::Number(n) => write!(f, "{n}"),
            CanonicalId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CanonicalId {
    fn from(value: &str) -> Self {
        CanonicalId::Text(value.to_string())
    }
}

impl From<String> for CanonicalId {
    fn from(value: String) -> Self {
        CanonicalId::Text(value)
    }
}

impl From<u64> for CanonicalId {
    fn from(value: u64) -> Self {
        CanonicalId::Number(value)
    }
}

/// One canonical entity from a static registry
///
/// The required fields form a closed shape; anything else a registry file
/// carries is kept verbatim in `extra` and never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: CanonicalId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Passthrough metadata not used for resolution
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(id: impl Into<CanonicalId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: None,
            aliases: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Canonical id rendered as the string a resolver may return
    pub fn canonical_id(&self) -> String {
        self.id.as_canonical()
    }
}
