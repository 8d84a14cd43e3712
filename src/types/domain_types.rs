// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API key for Notion API authentication
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if !key.starts_with("secret_") && !key.starts_with("ntn_") {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must start with 'secret_' or 'ntn_'".to_string(),
            });
        }

        if key.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the prefix is ever shown.
        write!(f, "{}...", &self.0[..10])
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

/// The object kinds of the Notion API vocabulary.
///
/// `File` and `PropertyItem` exist on the wire but are not read by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Page,
    Database,
    Block,
    User,
    Comment,
    File,
    PropertyItem,
}

impl ObjectKind {
    /// Kinds the source knows how to read.
    pub const READABLE: [ObjectKind; 5] = [
        ObjectKind::Page,
        ObjectKind::Database,
        ObjectKind::Block,
        ObjectKind::User,
        ObjectKind::Comment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Page => "page",
            ObjectKind::Database => "database",
            ObjectKind::Block => "block",
            ObjectKind::User => "user",
            ObjectKind::Comment => "comment",
            ObjectKind::File => "file",
            ObjectKind::PropertyItem => "property_item",
        }
    }

    pub fn is_readable(&self) -> bool {
        Self::READABLE.contains(self)
    }

    /// Kinds that are only reachable by enriching a page.
    pub fn is_nested_in_page(&self) -> bool {
        matches!(self, ObjectKind::Block | ObjectKind::Comment)
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" | "pages" => Ok(ObjectKind::Page),
            "database" | "databases" => Ok(ObjectKind::Database),
            "block" | "blocks" => Ok(ObjectKind::Block),
            "user" | "users" => Ok(ObjectKind::User),
            "comment" | "comments" => Ok(ObjectKind::Comment),
            "file" | "files" => Ok(ObjectKind::File),
            "property_item" => Ok(ObjectKind::PropertyItem),
            other => Err(ValidationError::UnknownObjectKind(other.to_string())),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
