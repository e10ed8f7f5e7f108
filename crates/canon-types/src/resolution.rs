//! Per-call resolution request and result types

use crate::entity::EntityType;
use serde::{Deserialize, Serialize};
use strum::Display;

/// A free-text name to be mapped onto a canonical id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub entity_type: EntityType,
    pub input: String,
}

impl ResolutionRequest {
    pub fn new(entity_type: EntityType, input: impl Into<String>) -> Self {
        Self {
            entity_type,
            input: input.into(),
        }
    }
}

/// Why a resolution produced the value it did
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Model output passed sanitization and registry validation
    Resolved,
    /// Model answered with the not-found sentinel, or the input was blank
    NotFound,
    /// Sanitization left nothing behind
    EmptyOutput,
    /// Sanitized output is not a canonical id in the registry
    InvalidOutput,
    /// The completion call itself failed
    Failed,
}

/// Outcome of one resolution call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub entity_type: EntityType,
    pub input: String,
    pub canonical_id: Option<String>,
    pub outcome: ResolutionOutcome,
}

impl ResolutionResult {
    pub fn resolved(request: ResolutionRequest, canonical_id: String) -> Self {
        Self {
            entity_type: request.entity_type,
            input: request.input,
            canonical_id: Some(canonical_id),
            outcome: ResolutionOutcome::Resolved,
        }
    }

    pub fn unresolved(request: ResolutionRequest, outcome: ResolutionOutcome) -> Self {
        Self {
            entity_type: request.entity_type,
            input: request.input,
            canonical_id: None,
            outcome,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some()
    }

    /// Collapse to the two-valued result callers consume
    pub fn into_option(self) -> Option<String> {
        self.canonical_id
    }
}
