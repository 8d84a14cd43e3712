// src/error.rs
//! Error types for the client and the source.
//!
//! `AppError` covers everything that can fail a call: configuration,
//! request validation, transport, and the Notion service itself.
//! `DecodeError` is scoped to turning one record into one item; the source
//! counts and skips those instead of failing the stream.

use crate::types::{ObjectKind, ValidationError};
use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded; back off and retry
    RateLimited,
    /// The requested object does not exist or is inaccessible
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::ServiceUnavailable | Self::InternalError | Self::Conflict => {
                true
            }
            Self::HttpStatus(status) => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Whether this error means the resource simply doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound | Self::HttpStatus(404))
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid read request: {0}")]
    InvalidRequest(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AppError {
    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NotionService { code, .. } => code.is_retryable(),
            AppError::NetworkFailure(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|status| {
                        status.is_server_error()
                            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    })
            }
            _ => false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest(message.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::MissingConfiguration(format!("Invalid API URL: {}", err))
    }
}

/// Why a single record could not become an item.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{kind} record has no identifier")]
    MissingId { kind: ObjectKind },

    #[error("{kind} record has an invalid identifier: {source}")]
    InvalidId {
        kind: ObjectKind,
        #[source]
        source: ValidationError,
    },

    #[error("Failed to convert {kind} payload: {source}")]
    Payload {
        kind: ObjectKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} items cannot be decoded by this decoder")]
    UnsupportedKind { kind: ObjectKind },

    #[error("Item metadata is missing '{field}'")]
    MissingMetadata { field: &'static str },
}

impl DecodeError {
    pub fn kind(&self) -> Option<ObjectKind> {
        match self {
            DecodeError::MissingId { kind }
            | DecodeError::InvalidId { kind, .. }
            | DecodeError::Payload { kind, .. }
            | DecodeError::UnsupportedKind { kind } => Some(*kind),
            DecodeError::MissingMetadata { .. } => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
