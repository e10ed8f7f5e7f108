//! Remote context-cache types

use crate::entity::EntityType;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Handle to one server-held context blob serving a single entity type
///
/// A handle only exists once the remote service has returned a name for it.
/// Expiry is tracked by the remote service; `expires_at` is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHandle {
    /// Vendor-assigned cache name, e.g. `cachedContents/abc123`
    pub name: String,
    pub entity_type: EntityType,
    pub created_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl CacheHandle {
    pub fn new(name: impl Into<String>, entity_type: EntityType, ttl_seconds: u64) -> Self {
        Self {
            name: name.into(),
            entity_type,
            created_at: Utc::now(),
            ttl_seconds,
        }
    }

    /// Time at which the remote service is expected to drop the cache
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Token accounting the remote service reports for a cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheUsage {
    #[serde(default)]
    pub total_token_count: u64,
}

/// Metadata the remote service returns for get, list and update calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<CacheUsage>,
}
