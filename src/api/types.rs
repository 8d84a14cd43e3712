// src/api/types.rs
//! Response envelopes and pagination results.

use crate::model::{Block, Comment, Page};
use serde::Deserialize;

/// Generic paginated response from Notion API.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Error response from Notion API.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionApiErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A record inside an otherwise valid page that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub object_id: Option<String>,
    pub reason: String,
}

/// One page of results from a paginated endpoint.
///
/// Records that failed to parse are kept aside in `rejected` so one bad
/// object does not cost its whole page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T> {
    pub results: Vec<T>,
    pub rejected: Vec<RejectedRecord>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> ResultPage<T> {
    /// A final page with no rejections.
    pub fn new(results: Vec<T>) -> Self {
        Self {
            results,
            rejected: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }

    /// Marks the page as followed by another one at `cursor`.
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self.has_more = true;
        self
    }

    pub fn with_rejected(mut self, rejected: Vec<RejectedRecord>) -> Self {
        self.rejected = rejected;
        self
    }

    /// The cursor to continue from, if the endpoint reported more results.
    pub fn continuation(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|_| self.has_more)
    }
}

/// Result of draining every page of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub total_fetched: usize,
    pub rejected: usize,
}

impl<T> Default for PaginationResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_fetched: 0,
            rejected: 0,
        }
    }
}

impl<T> From<Vec<T>> for PaginationResult<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total_fetched: items.len(),
            items,
            rejected: 0,
        }
    }
}

/// What to include when enriching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDetailOptions {
    pub include_blocks: bool,
    pub include_comments: bool,
    /// Levels of the block tree to walk; 0 and 1 both mean top-level only.
    pub max_depth: u8,
    pub page_size: u32,
}

impl PageDetailOptions {
    /// Number of block levels that will actually be fetched.
    pub fn block_levels(&self) -> u8 {
        self.max_depth
            .clamp(1, crate::constants::NOTION_MAX_FETCH_DEPTH)
    }
}

/// A page together with its block tree and comments.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDetail {
    pub page: Page,
    /// Top-level blocks; nested blocks hang off [`Block::children`].
    pub blocks: Vec<Block>,
    pub comments: Vec<Comment>,
    /// Blocks and comments that were returned but failed to parse.
    pub rejected: usize,
}

impl PageDetail {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            blocks: Vec::new(),
            comments: Vec::new(),
            rejected: 0,
        }
    }

    /// Number of blocks at every level of the tree.
    pub fn block_count(&self) -> usize {
        fn count(blocks: &[Block]) -> usize {
            blocks
                .iter()
                .map(|block| 1 + count(&block.children))
                .sum()
        }
        count(&self.blocks)
    }
}
