// src/model/search.rs
//! Request and result shapes of `POST /v1/search`.

use super::page::{Database, Page};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SearchSort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl SearchRequest {
    pub fn pages() -> Self {
        Self {
            filter: Some(SearchFilter::object(SearchObject::Page)),
            ..Self::default()
        }
    }

    pub fn databases() -> Self {
        Self {
            filter: Some(SearchFilter::object(SearchObject::Database)),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.trim().is_empty());
        self
    }

    pub fn with_sort(mut self, direction: Option<SortDirection>) -> Self {
        self.sort = direction.map(SearchSort::last_edited);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Search only supports filtering on the object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub value: SearchObject,
    pub property: String,
}

impl SearchFilter {
    pub fn object(value: SearchObject) -> Self {
        Self {
            value,
            property: "object".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchObject {
    Page,
    Database,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSort {
    pub direction: SortDirection,
    pub timestamp: String,
}

impl SearchSort {
    pub fn last_edited(direction: SortDirection) -> Self {
        Self {
            direction,
            timestamp: "last_edited_time".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl std::str::FromStr for SortDirection {
    type Err = crate::types::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(crate::types::ValidationError::InvalidValue {
                field: "sort",
                value: other.to_string(),
            }),
        }
    }
}

/// One hit of a search, discriminated by its `object` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum SearchResult {
    Page(Page),
    Database(Database),
}

impl SearchResult {
    pub fn id(&self) -> &str {
        match self {
            SearchResult::Page(page) => page.id.as_str(),
            SearchResult::Database(database) => database.id.as_str(),
        }
    }
}
