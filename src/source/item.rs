// src/source/item.rs
//! The uniform item every object is normalized into.

use crate::types::{ObjectKind, PropertyMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One object read from the workspace, in a shape independent of its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// Canonical dashed identifier; never empty.
    pub id: String,
    pub kind: ObjectKind,
    /// The object as received, opaque to the source.
    pub payload: Value,
    pub metadata: ItemMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub source_type: String,
    pub source_id: String,
    /// The identifier exactly as it appeared on the wire.
    pub original_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub processing: ProcessingState,
    #[serde(default)]
    pub properties: PropertyMap<Value>,
}

/// Where an item is in a downstream pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingState {
    pub phase: ProcessingPhase,
    pub status: ProcessingStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPhase {
    #[default]
    Read,
    Transform,
    Write,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl NormalizedItem {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.metadata.properties.get(name)
    }
}
