// src/source/request.rs
//! What a caller asks a read to do, and the plan resolved from it.

use crate::api::PageDetailOptions;
use crate::config::SourceConfig;
use crate::constants::{MAX_CONCURRENT_LIMIT, NOTION_API_PAGE_SIZE, OUTPUT_BUFFER_MULTIPLIER};
use crate::error::AppError;
use crate::model::{Database, Page, SearchRequest, SortDirection};
use crate::types::{NotionId, ObjectKind};
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

/// A request to read objects from the workspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadRequest {
    pub kinds: Vec<ObjectKind>,
    pub tuning: ReadTuning,
    pub filters: ReadFilters,
}

impl ReadRequest {
    pub fn new(kinds: impl IntoIterator<Item = ObjectKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_tuning(mut self, tuning: ReadTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_filters(mut self, filters: ReadFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn wants(&self, kind: ObjectKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Per-read overrides of the source configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadTuning {
    pub page_size: Option<u32>,
    /// Page enrichments allowed in flight at once.
    pub max_concurrent: Option<usize>,
    pub max_depth: Option<u8>,
}

/// Which objects a read keeps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadFilters {
    /// Free-text search query; overrides the configured one.
    pub query: Option<String>,
    /// Inclusive lower bound on last-edited time.
    pub modified_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on last-edited time.
    pub modified_before: Option<DateTime<Utc>>,
    pub include_archived: bool,
    /// Only pages whose parent is this database.
    pub parent_database: Option<NotionId>,
    pub sort: Option<SortDirection>,
}

impl ReadFilters {
    fn admits(&self, removed: bool, last_edited: DateTime<Utc>) -> bool {
        if removed && !self.include_archived {
            return false;
        }
        if self.modified_after.is_some_and(|after| last_edited < after) {
            return false;
        }
        if self.modified_before.is_some_and(|before| last_edited > before) {
            return false;
        }
        true
    }

    pub fn admits_page(&self, page: &Page) -> bool {
        self.admits(page.is_removed(), page.last_edited_time)
            && self
                .parent_database
                .as_ref()
                .map_or(true, |database| page.parent.is_database(database))
    }

    pub fn admits_database(&self, database: &Database) -> bool {
        self.admits(database.is_removed(), database.last_edited_time)
    }
}

/// The effective settings of one read: configuration with the request's
/// overrides applied.
#[derive(Debug, Clone)]
pub(crate) struct ReadPlan {
    pub want_pages: bool,
    pub want_blocks: bool,
    pub want_comments: bool,
    pub want_databases: bool,
    pub want_users: bool,
    pub page_size: u32,
    pub max_concurrent: usize,
    pub max_depth: u8,
    pub query: Option<String>,
    pub filters: ReadFilters,
}

impl ReadPlan {
    /// Kinds that are requested but disabled in `config` are left out.
    pub fn resolve(config: &SourceConfig, request: &ReadRequest) -> Self {
        let wants = |kind| request.wants(kind) && config.enabled(kind);

        Self {
            want_pages: wants(ObjectKind::Page),
            want_blocks: wants(ObjectKind::Block),
            want_comments: wants(ObjectKind::Comment),
            want_databases: wants(ObjectKind::Database),
            want_users: wants(ObjectKind::User),
            page_size: request.tuning.page_size.unwrap_or(config.page_size),
            max_concurrent: request
                .tuning
                .max_concurrent
                .unwrap_or(config.max_concurrent),
            max_depth: request.tuning.max_depth.unwrap_or(config.max_depth),
            query: request
                .filters
                .query
                .clone()
                .or_else(|| config.search_query.clone()),
            filters: request.filters.clone(),
        }
    }

    pub fn check_bounds(&self) -> Result<(), AppError> {
        if self.page_size == 0 || self.page_size > NOTION_API_PAGE_SIZE {
            return Err(AppError::invalid_request(format!(
                "page size must be between 1 and {}, got {}",
                NOTION_API_PAGE_SIZE, self.page_size
            )));
        }
        if self.max_concurrent == 0 || self.max_concurrent > MAX_CONCURRENT_LIMIT {
            return Err(AppError::invalid_request(format!(
                "max concurrent must be between 1 and {}, got {}",
                MAX_CONCURRENT_LIMIT, self.max_concurrent
            )));
        }
        Ok(())
    }

    /// Whether the page search has to run at all.
    pub fn runs_page_group(&self) -> bool {
        self.want_pages || self.want_blocks || self.want_comments
    }

    pub fn search(&self, base: SearchRequest) -> SearchRequest {
        base.with_query(self.query.clone())
            .with_sort(self.filters.sort)
            .with_page_size(self.page_size)
    }

    pub fn detail_options(&self) -> PageDetailOptions {
        PageDetailOptions {
            include_blocks: self.want_blocks,
            include_comments: self.want_comments,
            max_depth: self.max_depth,
            page_size: self.page_size,
        }
    }

    pub fn buffer_capacity(&self) -> usize {
        (self.page_size as usize)
            .saturating_mul(self.max_concurrent)
            .saturating_mul(OUTPUT_BUFFER_MULTIPLIER)
            .clamp(1, Semaphore::MAX_PERMITS)
    }
}
