//! Read-only entity registries
//!
//! Registries are validated once at the boundary and then shared behind an
//! `Arc`. Resolvers check every model answer against them, so they are the
//! only source of ids a resolver may return.

use crate::error::RegistryError;
use crate::sanitize::Sanitizer;
use canon_types::{EntityRecord, EntityType};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Ordered, immutable set of records for one entity type
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entity_type: EntityType,
    records: Arc<[EntityRecord]>,
    ids: Arc<HashSet<String>>,
}

impl EntityRegistry {
    /// Validate and wrap records, preserving their order
    ///
    /// Every id must already be in the form the entity type's sanitizer
    /// produces; anything else could never match a model answer.
    pub fn new(entity_type: EntityType, records: Vec<EntityRecord>) -> Result<Self, RegistryError> {
        let sanitizer = Sanitizer::for_shape(entity_type.id_shape());
        let mut ids = HashSet::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            if record.id.is_empty() {
                return Err(RegistryError::EmptyId { index });
            }
            let id = record.canonical_id();
            if record.name.trim().is_empty() {
                return Err(RegistryError::EmptyName { id });
            }
            let expected = sanitizer.apply(&id);
            if expected != id {
                return Err(RegistryError::NonCanonicalId {
                    entity_type,
                    id,
                    expected,
                });
            }
            if !ids.insert(id.clone()) {
                return Err(RegistryError::DuplicateId(id));
            }
        }

        debug!(
            entity_type = %entity_type,
            records = records.len(),
            "Built entity registry"
        );

        Ok(Self {
            entity_type,
            records: records.into(),
            ids: Arc::new(ids),
        })
    }

    /// Parse a JSON array of records
    pub fn from_json_str(entity_type: EntityType, json: &str) -> Result<Self, RegistryError> {
        let records: Vec<EntityRecord> = serde_json::from_str(json)?;
        Self::new(entity_type, records)
    }

    /// Parse a YAML sequence of records
    pub fn from_yaml_str(entity_type: EntityType, yaml: &str) -> Result<Self, RegistryError> {
        let records: Vec<EntityRecord> = serde_yaml::from_str(yaml)?;
        Self::new(entity_type, records)
    }

    /// Load a registry file, choosing the parser by extension
    pub fn load(entity_type: EntityType, path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let registry = match extension.as_str() {
            "json" => Self::from_json_str(entity_type, &content)?,
            "yaml" | "yml" => Self::from_yaml_str(entity_type, &content)?,
            other => return Err(RegistryError::UnsupportedFormat(other.to_string())),
        };

        info!(
            entity_type = %entity_type,
            path = %path.display(),
            records = registry.len(),
            "Loaded entity registry"
        );
        Ok(registry)
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// True when `id` is the canonical id of some record
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn find(&self, id: &str) -> Option<&EntityRecord> {
        if !self.contains(id) {
            return None;
        }
        self.records.iter().find(|record| record.canonical_id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Registries for every configured entity type
#[derive(Debug, Clone, Default)]
pub struct Registries {
    by_type: HashMap<EntityType, EntityRegistry>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registry, replacing any previous one for the same entity type
    pub fn insert(&mut self, registry: EntityRegistry) -> Option<EntityRegistry> {
        self.by_type.insert(registry.entity_type(), registry)
    }

    pub fn with(mut self, registry: EntityRegistry) -> Self {
        self.insert(registry);
        self
    }

    pub fn get(&self, entity_type: EntityType) -> Option<&EntityRegistry> {
        self.by_type.get(&entity_type)
    }

    /// Registries in `EntityType::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = &EntityRegistry> {
        EntityType::ALL
            .into_iter()
            .filter_map(move |entity_type| self.by_type.get(&entity_type))
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
