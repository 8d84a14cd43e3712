// src/model/common.rs
//! Shapes shared by several Notion objects: parents, users, files and icons.

use crate::types::{BlockId, DatabaseId, NotionId, PageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an object lives in the workspace tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    DatabaseId { database_id: DatabaseId },
    PageId { page_id: PageId },
    BlockId { block_id: BlockId },
    Workspace { workspace: bool },
}

impl Parent {
    pub fn workspace() -> Self {
        Parent::Workspace { workspace: true }
    }

    /// The raw identifier of the parent object, if it is not the workspace.
    pub fn id(&self) -> Option<&str> {
        match self {
            Parent::DatabaseId { database_id } => Some(database_id.as_str()),
            Parent::PageId { page_id } => Some(page_id.as_str()),
            Parent::BlockId { block_id } => Some(block_id.as_str()),
            Parent::Workspace { .. } => None,
        }
    }

    /// Whether this parent is the given database.
    pub fn is_database(&self, database: &NotionId) -> bool {
        match self {
            Parent::DatabaseId { database_id } => database_id
                .canonical()
                .map(|id| &id == database)
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// A user reference as embedded in other objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialUser {
    pub id: UserId,
}

impl PartialUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UserId::from_raw(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

/// A file hosted by Notion; the URL expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedFile {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    External { external: ExternalFile },
    File { file: HostedFile },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::External { external } => &external.url,
            FileObject::File { file } => &file.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: HostedFile },
    #[serde(other)]
    Unsupported,
}

/// An object body that carries no fields, e.g. `"divider": {}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyObject {}
