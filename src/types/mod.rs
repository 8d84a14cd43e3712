// src/types/mod.rs
//! Validated domain types shared by the wire model, the HTTP client and the source.

use thiserror::Error;

mod collections;
mod colors;
mod domain_types;
mod ids;

pub use collections::*;
pub use colors::*;
pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid Notion ID format: {0}")]
    InvalidId(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown object kind: {0}")]
    UnknownObjectKind(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Value out of bounds for {field}: {value}, expected {min}..={max}")]
    OutOfBounds {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Invalid rate for {field}: {value}")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },

    #[error("No object kinds are enabled in the source configuration")]
    NothingEnabled,
}
