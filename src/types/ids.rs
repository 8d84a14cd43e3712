// src/types/ids.rs
//! Notion object identifiers.
//!
//! Two shapes live here. `Id<T>` is the raw identifier exactly as it appears
//! on the wire, tagged with the kind of object it names; deserializing one
//! never fails. `NotionId` is the validated, canonical (dashed, lowercase)
//! form produced by [`NotionId::parse`] or by an [`IdParser`].

use super::ValidationError;
use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use uuid::Uuid;

/// Strong typing for IDs with phantom types
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

// Derived Clone would require `T: Clone` on the marker.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_raw(self.value.clone())
    }
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentMarker;

pub type PageId = Id<PageMarker>;
pub type BlockId = Id<BlockMarker>;
pub type DatabaseId = Id<DatabaseMarker>;
pub type UserId = Id<UserMarker>;
pub type CommentId = Id<CommentMarker>;

impl<T> Id<T> {
    /// Wraps a wire identifier without validating it.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _phantom: PhantomData,
        }
    }

    /// Create a new random v4 UUID ID, in canonical dashed form.
    pub fn new_v4() -> Self {
        Self::from_raw(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Validates and canonicalizes this identifier.
    pub fn canonical(&self) -> Result<NotionId, ValidationError> {
        NotionId::parse(&self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<&NotionId> for Id<T> {
    fn from(id: &NotionId) -> Self {
        Self::from_raw(id.as_str())
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_raw(value))
    }
}

/// A validated Notion ID in canonical dashed UUID form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotionId(String);

impl NotionId {
    /// Returns the canonical dashed form, e.g. `550e8400-e29b-41d4-a716-446655440000`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the 32-character form without dashes.
    pub fn to_simple(&self) -> String {
        self.0.replace('-', "")
    }

    /// Parses dashed UUIDs, bare 32-character hex IDs and Notion URLs.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned = input.trim().trim_end_matches('/');

        if cleaned.is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }

        if let Ok(uuid) = Uuid::parse_str(cleaned) {
            return Ok(Self::from_uuid(uuid));
        }

        if cleaned.contains("notion") {
            return Self::extract_from_url(cleaned);
        }

        Err(ValidationError::InvalidId(format!(
            "Could not parse Notion ID from: {}",
            input
        )))
    }

    fn from_uuid(uuid: Uuid) -> Self {
        NotionId(uuid.hyphenated().to_string())
    }

    fn extract_from_url(url: &str) -> Result<Self, ValidationError> {
        lazy_static::lazy_static! {
            static ref ID_REGEX: Regex = Regex::new(
                r"(?:[/-])([a-fA-F0-9]{32}|[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12})(?:[/?#]|$)"
            ).expect("Failed to compile Notion ID regex - this is a bug in the code");
        }

        ID_REGEX
            .captures(url)
            .and_then(|captures| captures.get(1))
            .and_then(|id| Uuid::parse_str(id.as_str()).ok())
            .map(Self::from_uuid)
            .ok_or_else(|| ValidationError::InvalidId(format!("No valid ID found in URL: {}", url)))
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NotionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for NotionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NotionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NotionId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Canonicalizes identifiers, optionally memoizing results in an LRU cache.
///
/// Parsing is a pure function of its input, so a cached parser returns
/// exactly what an uncached one would. Construct one per process (or per
/// test) and share it behind an `Arc`.
pub struct IdParser {
    cache: Option<Mutex<LruCache<String, NotionId>>>,
}

impl IdParser {
    /// A parser without a cache.
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// A parser that remembers up to `capacity` recent inputs.
    pub fn with_cache(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Some(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn parse(&self, input: &str) -> Result<NotionId, ValidationError> {
        let Some(cache) = &self.cache else {
            return NotionId::parse(input);
        };

        if let Some(hit) = cache.lock().get(input) {
            return Ok(hit.clone());
        }

        let parsed = NotionId::parse(input)?;
        cache.lock().put(input.to_string(), parsed.clone());
        Ok(parsed)
    }

    /// Number of cached entries; zero for an uncached parser.
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.lock().len())
    }
}

impl Default for IdParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdParser")
            .field("cached", &self.cached_len())
            .finish()
    }
}
