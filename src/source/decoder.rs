// src/source/decoder.rs
//! Turning wire records into [`NormalizedItem`]s, and back.

use super::item::{ItemMetadata, NormalizedItem, ProcessingState};
use crate::constants::{ID_CACHE_CAPACITY, SOURCE_TYPE};
use crate::error::DecodeError;
use crate::model::{Block, Comment, Database, Page, PartialUser, User};
use crate::types::{IdParser, NotionId, ObjectKind, PropertyMap};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// One object as fetched, tagged with what it is.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A page as returned by search, without enrichment.
    Page(Page),
    /// A page whose blocks and comments were fetched alongside it.
    PageDetail {
        page: Page,
        blocks_count: usize,
        comments_count: usize,
    },
    Database(Database),
    /// A block, flattened out of its tree, with the page or block it hangs off.
    Block { block: Block, parent_id: NotionId },
    User(User),
    Comment(Comment),
}

impl Record {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Record::Page(_) | Record::PageDetail { .. } => ObjectKind::Page,
            Record::Database(_) => ObjectKind::Database,
            Record::Block { .. } => ObjectKind::Block,
            Record::User(_) => ObjectKind::User,
            Record::Comment(_) => ObjectKind::Comment,
        }
    }
}

/// Converts one record into one item.
///
/// Implementations must not depend on anything but the record, and may fail
/// per record without affecting others.
pub trait RecordDecoder: Send + Sync {
    fn decode(&self, record: Record) -> Result<NormalizedItem, DecodeError>;
}

/// The decoder used in production.
///
/// Identifiers are canonicalized through the shared [`IdParser`]; records
/// with an empty or unparseable identifier are rejected.
#[derive(Debug, Clone)]
pub struct NotionRecordDecoder {
    ids: Arc<IdParser>,
}

impl NotionRecordDecoder {
    pub fn new(ids: Arc<IdParser>) -> Self {
        Self { ids }
    }

    /// Rebuilds the record an item was decoded from.
    pub fn encode(&self, item: &NormalizedItem) -> Result<Record, DecodeError> {
        let kind = item.kind;
        let properties = &item.metadata.properties;

        match kind {
            ObjectKind::Page => {
                let page = payload(item)?;
                match (
                    properties.get_u64("blocks_count"),
                    properties.get_u64("comments_count"),
                ) {
                    (Some(blocks_count), Some(comments_count)) => Ok(Record::PageDetail {
                        page,
                        blocks_count: blocks_count as usize,
                        comments_count: comments_count as usize,
                    }),
                    _ => Ok(Record::Page(page)),
                }
            }
            ObjectKind::Database => Ok(Record::Database(payload(item)?)),
            ObjectKind::Block => {
                let parent = properties
                    .get_str("parent_id")
                    .ok_or(DecodeError::MissingMetadata { field: "parent_id" })?;
                let parent_id = self
                    .ids
                    .parse(parent)
                    .map_err(|source| DecodeError::InvalidId { kind, source })?;
                Ok(Record::Block {
                    block: payload(item)?,
                    parent_id,
                })
            }
            ObjectKind::User => Ok(Record::User(payload(item)?)),
            ObjectKind::Comment => Ok(Record::Comment(payload(item)?)),
            ObjectKind::File | ObjectKind::PropertyItem => {
                Err(DecodeError::UnsupportedKind { kind })
            }
        }
    }

    fn item<T: Serialize>(
        &self,
        kind: ObjectKind,
        raw_id: &str,
        times: Option<(DateTime<Utc>, DateTime<Utc>)>,
        object: &T,
        properties: PropertyMap<Value>,
    ) -> Result<NormalizedItem, DecodeError> {
        if raw_id.trim().is_empty() {
            return Err(DecodeError::MissingId { kind });
        }
        let id = self
            .ids
            .parse(raw_id)
            .map_err(|source| DecodeError::InvalidId { kind, source })?;
        let payload =
            serde_json::to_value(object).map_err(|source| DecodeError::Payload { kind, source })?;

        Ok(NormalizedItem {
            id: id.to_string(),
            kind,
            payload,
            metadata: ItemMetadata {
                source_type: SOURCE_TYPE.to_string(),
                source_id: id.to_string(),
                original_id: raw_id.to_string(),
                created_at: times.map(|(created, _)| created),
                modified_at: times.map(|(_, edited)| edited),
                processing: ProcessingState::default(),
                properties,
            },
        })
    }

    fn page_properties(page: &Page) -> PropertyMap<Value> {
        authorship(page.archived, &page.created_by, &page.last_edited_by)
            .with("parent_id", json!(page.parent.id()))
    }
}

impl Default for NotionRecordDecoder {
    fn default() -> Self {
        let ids = NonZeroUsize::new(ID_CACHE_CAPACITY)
            .map_or_else(IdParser::new, IdParser::with_cache);
        Self::new(Arc::new(ids))
    }
}

impl RecordDecoder for NotionRecordDecoder {
    fn decode(&self, record: Record) -> Result<NormalizedItem, DecodeError> {
        let kind = record.kind();
        match record {
            Record::Page(page) => self.item(
                kind,
                page.id.as_str(),
                Some((page.created_time, page.last_edited_time)),
                &page,
                Self::page_properties(&page),
            ),
            Record::PageDetail {
                page,
                blocks_count,
                comments_count,
            } => self.item(
                kind,
                page.id.as_str(),
                Some((page.created_time, page.last_edited_time)),
                &page,
                Self::page_properties(&page)
                    .with("blocks_count", json!(blocks_count))
                    .with("comments_count", json!(comments_count)),
            ),
            Record::Database(database) => self.item(
                kind,
                database.id.as_str(),
                Some((database.created_time, database.last_edited_time)),
                &database,
                authorship(
                    database.archived,
                    &database.created_by,
                    &database.last_edited_by,
                )
                .with("parent_id", json!(database.parent.id()))
                .with("title", json!(database.title())),
            ),
            Record::Block { block, parent_id } => self.item(
                kind,
                block.id.as_str(),
                Some((block.created_time, block.last_edited_time)),
                &block,
                authorship(block.archived, &block.created_by, &block.last_edited_by)
                    .with("parent_id", json!(parent_id.as_str()))
                    .with("block_type", json!(block.block_type()))
                    .with("has_children", json!(block.has_children)),
            ),
            Record::User(user) => self.item(
                kind,
                user.id.as_str(),
                None,
                &user,
                PropertyMap::new()
                    .with("user_type", json!(if user.is_bot() { "bot" } else { "person" }))
                    .with("name", json!(user.name))
                    .with("email", json!(user.email())),
            ),
            Record::Comment(comment) => self.item(
                kind,
                comment.id.as_str(),
                Some((comment.created_time, comment.last_edited_time)),
                &comment,
                PropertyMap::new()
                    .with("parent_id", json!(comment.parent.id()))
                    .with("discussion_id", json!(comment.discussion_id))
                    .with("created_by", json!(user_id(&comment.created_by))),
            ),
        }
    }
}

fn authorship(
    archived: bool,
    created_by: &Option<PartialUser>,
    edited_by: &Option<PartialUser>,
) -> PropertyMap<Value> {
    PropertyMap::new()
        .with("archived", json!(archived))
        .with("created_by", json!(user_id(created_by)))
        .with("edited_by", json!(user_id(edited_by)))
}

fn user_id(user: &Option<PartialUser>) -> Option<&str> {
    user.as_ref().map(|user| user.id.as_str())
}

fn payload<T: DeserializeOwned>(item: &NormalizedItem) -> Result<T, DecodeError> {
    serde_json::from_value(item.payload.clone()).map_err(|source| DecodeError::Payload {
        kind: item.kind,
        source,
    })
}
