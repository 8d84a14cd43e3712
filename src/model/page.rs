use super::common::{FileObject, Icon, Parent, PartialUser};
use super::properties::{PropertySchema, PropertyValue};
use super::rich_text::{plain_text, RichText};
use crate::types::{DatabaseId, PageId, PropertyMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Notion page, standalone or a database row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<PartialUser>,
    #[serde(default)]
    pub last_edited_by: Option<PartialUser>,
    pub parent: Parent,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub cover: Option<FileObject>,
    #[serde(default)]
    pub properties: PropertyMap<PropertyValue>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Page {
    /// A minimal page with no properties, parented to the workspace.
    pub fn new(id: PageId, created_time: DateTime<Utc>, last_edited_time: DateTime<Utc>) -> Self {
        Self {
            id,
            created_time,
            last_edited_time,
            created_by: None,
            last_edited_by: None,
            parent: Parent::workspace(),
            archived: false,
            in_trash: false,
            icon: None,
            cover: None,
            properties: PropertyMap::new(),
            url: None,
            public_url: None,
        }
    }

    pub fn title(&self) -> String {
        self.properties.title().unwrap_or_default()
    }

    /// Archived or trashed.
    pub fn is_removed(&self) -> bool {
        self.archived || self.in_trash
    }
}

/// A database and its column schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<PartialUser>,
    #[serde(default)]
    pub last_edited_by: Option<PartialUser>,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub description: Vec<RichText>,
    pub parent: Parent,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub cover: Option<FileObject>,
    #[serde(default)]
    pub properties: PropertyMap<PropertySchema>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Database {
    pub fn new(
        id: DatabaseId,
        created_time: DateTime<Utc>,
        last_edited_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            created_time,
            last_edited_time,
            created_by: None,
            last_edited_by: None,
            title: Vec::new(),
            description: Vec::new(),
            parent: Parent::workspace(),
            archived: false,
            in_trash: false,
            is_inline: false,
            icon: None,
            cover: None,
            properties: PropertyMap::new(),
            url: None,
        }
    }

    pub fn title(&self) -> String {
        plain_text(&self.title)
    }

    pub fn is_removed(&self) -> bool {
        self.archived || self.in_trash
    }
}
