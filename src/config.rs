// src/config.rs
use crate::constants::{
    DEFAULT_MAX_CONCURRENT, DEFAULT_REQUESTS_PER_SECOND, MAX_CONCURRENT_LIMIT, NOTION_API_BASE_URL,
    NOTION_API_PAGE_SIZE, REQUEST_TIMEOUT, RETRY_MAX_ATTEMPTS,
};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::model::SortDirection;
use crate::source::{ReadFilters, ReadRequest};
use crate::types::{ApiKey, NotionId, ObjectKind, ValidationError};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Connector settings: which kinds to read and how hard to push the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub include_pages: bool,
    pub include_databases: bool,
    pub include_blocks: bool,
    pub include_comments: bool,
    pub include_users: bool,
    /// Block tree levels fetched per page; 0 and 1 both mean top-level only.
    pub max_depth: u8,
    pub page_size: u32,
    pub requests_per_second: f64,
    /// Page enrichments allowed in flight at once.
    pub max_concurrent: usize,
    pub search_query: Option<String>,
    /// Reported by `describe`; reads always cover the workspace the API key belongs to.
    pub workspace_id: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            include_pages: true,
            include_databases: true,
            include_blocks: true,
            include_comments: true,
            include_users: false,
            max_depth: 0,
            page_size: NOTION_API_PAGE_SIZE,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            search_query: None,
            workspace_id: None,
        }
    }
}

impl SourceConfig {
    /// Whether reads of `kind` are switched on.
    pub fn enabled(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Page => self.include_pages,
            ObjectKind::Database => self.include_databases,
            ObjectKind::Block => self.include_blocks,
            ObjectKind::Comment => self.include_comments,
            ObjectKind::User => self.include_users,
            ObjectKind::File | ObjectKind::PropertyItem => false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 || self.page_size > NOTION_API_PAGE_SIZE {
            return Err(ValidationError::OutOfBounds {
                field: "page_size",
                value: u64::from(self.page_size),
                min: 1,
                max: u64::from(NOTION_API_PAGE_SIZE),
            });
        }
        if self.max_concurrent == 0 || self.max_concurrent > MAX_CONCURRENT_LIMIT {
            return Err(ValidationError::OutOfBounds {
                field: "max_concurrent",
                value: self.max_concurrent as u64,
                min: 1,
                max: MAX_CONCURRENT_LIMIT as u64,
            });
        }
        if !self.requests_per_second.is_finite() || self.requests_per_second <= 0.0 {
            return Err(ValidationError::InvalidRate {
                field: "requests_per_second",
                value: self.requests_per_second,
            });
        }
        if !ObjectKind::READABLE.iter().any(|kind| self.enabled(*kind)) {
            return Err(ValidationError::NothingEnabled);
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub base_url: Url,
    pub requests_per_second: f64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: default_base_url(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            max_retries: RETRY_MAX_ATTEMPTS - 1,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Points the client at another server, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ValidationError> {
        let mut url = Url::parse(base_url).map_err(|e| ValidationError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.saturating_add(1),
            ..RetryPolicy::default()
        }
    }
}

fn default_base_url() -> Url {
    lazy_static::lazy_static! {
        static ref BASE_URL: Url = Url::parse(NOTION_API_BASE_URL)
            .expect("Failed to parse the Notion API base URL - this is a bug in the code");
    }
    BASE_URL.clone()
}

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Object kinds to read, comma separated (page, database, block, comment, user).
    /// Defaults to every kind enabled in the configuration.
    #[arg(short, long, value_delimiter = ',')]
    pub kinds: Vec<String>,

    /// Free-text search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Write JSON lines to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Results requested per API call (1-100)
    #[arg(long, default_value_t = NOTION_API_PAGE_SIZE)]
    pub page_size: u32,

    /// Pages enriched concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Block tree levels fetched per page (0 = top-level only)
    #[arg(long, default_value_t = 0)]
    pub depth: u8,

    /// Average API requests per second
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_SECOND)]
    pub rps: f64,

    /// Also emit archived and trashed pages and databases
    #[arg(long, default_value_t = false)]
    pub include_archived: bool,

    /// Only objects edited at or after this RFC 3339 time
    #[arg(long)]
    pub modified_after: Option<String>,

    /// Only objects edited at or before this RFC 3339 time
    #[arg(long)]
    pub modified_before: Option<String>,

    /// Only pages that are rows of this database (ID or URL)
    #[arg(long)]
    pub database: Option<String>,

    /// Sort search results by last edit: asc or desc
    #[arg(long)]
    pub sort: Option<String>,

    /// Read workspace users as well
    #[arg(long, default_value_t = false)]
    pub include_users: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Resolved settings for one run of the binary.
#[derive(Debug, Clone)]
pub struct CliSettings {
    pub source: SourceConfig,
    pub client: ClientConfig,
    pub request: ReadRequest,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

impl CliSettings {
    /// Resolves command-line input and the `NOTION_API_KEY` environment variable.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_key_str = std::env::var("NOTION_API_KEY").map_err(|_| {
            AppError::MissingConfiguration(
                "NOTION_API_KEY environment variable not set".to_string(),
            )
        })?;
        let api_key = ApiKey::new(api_key_str)?;
        Self::from_parts(cli, api_key)
    }

    fn from_parts(cli: CommandLineInput, api_key: ApiKey) -> Result<Self, AppError> {
        let kinds = cli
            .kinds
            .iter()
            .filter(|kind| !kind.trim().is_empty())
            .map(|kind| kind.parse::<ObjectKind>())
            .collect::<Result<Vec<_>, _>>()?;

        let source = SourceConfig {
            include_users: cli.include_users || kinds.contains(&ObjectKind::User),
            max_depth: cli.depth,
            page_size: cli.page_size,
            requests_per_second: cli.rps,
            max_concurrent: cli.max_concurrent,
            search_query: cli.query.clone(),
            ..SourceConfig::default()
        };
        source.validate()?;

        let kinds = if kinds.is_empty() {
            ObjectKind::READABLE
                .into_iter()
                .filter(|kind| source.enabled(*kind))
                .collect()
        } else {
            kinds
        };

        let filters = ReadFilters {
            query: cli.query,
            modified_after: cli
                .modified_after
                .as_deref()
                .map(|raw| parse_timestamp("modified_after", raw))
                .transpose()?,
            modified_before: cli
                .modified_before
                .as_deref()
                .map(|raw| parse_timestamp("modified_before", raw))
                .transpose()?,
            include_archived: cli.include_archived,
            parent_database: cli.database.as_deref().map(NotionId::parse).transpose()?,
            sort: cli
                .sort
                .as_deref()
                .map(str::parse::<SortDirection>)
                .transpose()?,
        };

        let client = ClientConfig {
            requests_per_second: cli.rps,
            ..ClientConfig::new(api_key)
        };

        Ok(CliSettings {
            source,
            client,
            request: ReadRequest::new(kinds).with_filters(filters),
            output: cli.output.map(PathBuf::from),
            verbose: cli.verbose,
        })
    }
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidValue {
            field,
            value: raw.to_string(),
        })
}
