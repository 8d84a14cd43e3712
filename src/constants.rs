// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// The API version this client speaks.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Base URL of the public REST API. The trailing slash matters for `Url::join`.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1/";

/// How many objects the Notion API returns per page of results, at most.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Maximum nesting depth when walking a page's block tree.
///
/// Notion blocks can nest arbitrarily deep; this caps runaway traversal.
pub const NOTION_MAX_FETCH_DEPTH: u8 = 50;

/// Notion's published average rate limit for an integration.
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 3.0;

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

pub const RETRY_MAX_ATTEMPTS: u32 = 4;
pub const RETRY_INITIAL_DELAY: Duration = Duration::from_millis(500);
pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Per-request timeout of the HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Value of `source_type` on every emitted item.
pub const SOURCE_TYPE: &str = "notion";

/// Human-readable name reported by `describe`.
pub const SOURCE_NAME: &str = "Notion API Source";

/// Page enrichments allowed in flight at once, unless configured.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Upper bound on configured page enrichments in flight.
pub const MAX_CONCURRENT_LIMIT: usize = 64;

/// Output channel capacity is `page_size * max_concurrent * this`.
pub const OUTPUT_BUFFER_MULTIPLIER: usize = 10;

/// Entries kept by the identifier cache of the default decoder.
pub const ID_CACHE_CAPACITY: usize = 4096;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
