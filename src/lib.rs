// src/lib.rs
//! notion-source library: a typed Notion API client and a streaming source
//! connector that reads a workspace into normalized items.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `DecodeError`, `ValidationError`
//! - **Configuration**: `SourceConfig`, `ClientConfig`, `CliSettings`
//! - **Wire model**: `Page`, `Database`, `Block`, `User`, `Comment`, etc.
//! - **Domain types**: `NotionId`, `IdParser`, `ApiKey`, `ObjectKind`, etc.
//! - **API client**: `NotionRepository`, `NotionHttpClient`, pagination
//! - **Source**: `NotionSource`, `RecordDecoder`, `MetricsRecorder`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_recovery;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, DecodeError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CliSettings, ClientConfig, CommandLineInput, SourceConfig};

// --- Wire Model ---
pub use crate::model::{
    Block, BlockContent, Comment, Database, Page, Parent, PropertyTypeValue, PropertyValue,
    RichText, SearchRequest, SearchResult, SortDirection, User,
};

// --- Domain Types ---
pub use crate::types::{
    ApiKey, BlockId, Color, CommentId, DatabaseId, IdParser, NotionId, ObjectKind, PageId,
    PropertyMap, UserId,
};

// --- API Client ---
pub use crate::api::{
    NotionHttpClient, NotionRepository, PageDetail, PageDetailOptions, PageStream,
    PaginationResult, ResultPage,
};

// --- Source ---
pub use crate::pipeline::{DataSource, SourceDescriptor};
pub use crate::source::{
    ConcurrencyGate, MetricsRecorder, NormalizedItem, NotionRecordDecoder, NotionSource,
    ReadFilters, ReadRequest, ReadTuning, Record, RecordDecoder, SourceMetrics,
};
