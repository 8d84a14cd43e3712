use super::common::{Parent, PartialUser};
use super::rich_text::{plain_text, RichText};
use crate::types::CommentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a page or block. Comments sharing a `discussion_id` form a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub parent: Parent,
    pub discussion_id: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<PartialUser>,
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

impl Comment {
    pub fn text(&self) -> String {
        plain_text(&self.rich_text)
    }
}
