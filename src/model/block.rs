// src/model/block.rs
//! Blocks: the content tree of a page.
//!
//! On the wire a block is a common envelope plus one type-specific body
//! keyed by the block type. The envelope is [`Block`], the body is the
//! internally tagged [`BlockContent`]. Nested blocks are not part of the wire
//! object; traversal fills [`Block::children`].

use super::common::{EmptyObject, FileObject, Icon, Parent, PartialUser};
use super::rich_text::{plain_text, RichText};
use crate::types::{BlockId, Color, DatabaseId, PageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(default)]
    pub parent: Option<Parent>,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<PartialUser>,
    #[serde(default)]
    pub last_edited_by: Option<PartialUser>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(flatten)]
    pub content: BlockContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(id: BlockId, at: DateTime<Utc>, content: BlockContent) -> Self {
        Self {
            id,
            parent: None,
            created_time: at,
            last_edited_time: at,
            created_by: None,
            last_edited_by: None,
            has_children: false,
            archived: false,
            in_trash: false,
            content,
            children: Vec::new(),
        }
    }

    pub fn block_type(&self) -> &'static str {
        self.content.type_name()
    }

    /// Whether traversal should descend into this block's children.
    ///
    /// Child pages and child databases are objects in their own right and
    /// are reached through search, not through their parent page.
    pub fn should_descend(&self) -> bool {
        self.has_children
            && !matches!(
                self.content,
                BlockContent::ChildPage { .. } | BlockContent::ChildDatabase { .. }
            )
    }

    /// Splits off the nested blocks, leaving a flat block behind.
    pub fn into_parts(mut self) -> (Block, Vec<Block>) {
        let children = std::mem::take(&mut self.children);
        (self, children)
    }

    pub fn plain_text(&self) -> String {
        self.content.rich_text().map(plain_text).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Paragraph { paragraph: TextBlock },
    #[serde(rename = "heading_1")]
    Heading1 { heading_1: HeadingBlock },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: HeadingBlock },
    #[serde(rename = "heading_3")]
    Heading3 { heading_3: HeadingBlock },
    BulletedListItem { bulleted_list_item: TextBlock },
    NumberedListItem { numbered_list_item: TextBlock },
    ToDo { to_do: ToDoBlock },
    Toggle { toggle: TextBlock },
    Quote { quote: TextBlock },
    Callout { callout: CalloutBlock },
    Code { code: CodeBlock },
    Equation { equation: EquationBlock },
    Divider { divider: EmptyObject },
    Breadcrumb { breadcrumb: EmptyObject },
    TableOfContents { table_of_contents: ColorBlock },
    Image { image: MediaBlock },
    Video { video: MediaBlock },
    Audio { audio: MediaBlock },
    File { file: MediaBlock },
    Pdf { pdf: MediaBlock },
    Bookmark { bookmark: LinkBlock },
    Embed { embed: LinkBlock },
    LinkPreview { link_preview: LinkBlock },
    ChildPage { child_page: TitleBlock },
    ChildDatabase { child_database: TitleBlock },
    LinkToPage { link_to_page: LinkTarget },
    Table { table: TableBlock },
    TableRow { table_row: TableRowBlock },
    ColumnList { column_list: EmptyObject },
    Column { column: EmptyObject },
    SyncedBlock { synced_block: SyncedBlock },
    Template { template: TemplateBlock },
    #[serde(other)]
    Unsupported,
}

impl BlockContent {
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockContent::Paragraph { .. } => "paragraph",
            BlockContent::Heading1 { .. } => "heading_1",
            BlockContent::Heading2 { .. } => "heading_2",
            BlockContent::Heading3 { .. } => "heading_3",
            BlockContent::BulletedListItem { .. } => "bulleted_list_item",
            BlockContent::NumberedListItem { .. } => "numbered_list_item",
            BlockContent::ToDo { .. } => "to_do",
            BlockContent::Toggle { .. } => "toggle",
            BlockContent::Quote { .. } => "quote",
            BlockContent::Callout { .. } => "callout",
            BlockContent::Code { .. } => "code",
            BlockContent::Equation { .. } => "equation",
            BlockContent::Divider { .. } => "divider",
            BlockContent::Breadcrumb { .. } => "breadcrumb",
            BlockContent::TableOfContents { .. } => "table_of_contents",
            BlockContent::Image { .. } => "image",
            BlockContent::Video { .. } => "video",
            BlockContent::Audio { .. } => "audio",
            BlockContent::File { .. } => "file",
            BlockContent::Pdf { .. } => "pdf",
            BlockContent::Bookmark { .. } => "bookmark",
            BlockContent::Embed { .. } => "embed",
            BlockContent::LinkPreview { .. } => "link_preview",
            BlockContent::ChildPage { .. } => "child_page",
            BlockContent::ChildDatabase { .. } => "child_database",
            BlockContent::LinkToPage { .. } => "link_to_page",
            BlockContent::Table { .. } => "table",
            BlockContent::TableRow { .. } => "table_row",
            BlockContent::ColumnList { .. } => "column_list",
            BlockContent::Column { .. } => "column",
            BlockContent::SyncedBlock { .. } => "synced_block",
            BlockContent::Template { .. } => "template",
            BlockContent::Unsupported => "unsupported",
        }
    }

    /// The primary text runs of text-bearing blocks.
    pub fn rich_text(&self) -> Option<&[RichText]> {
        let runs = match self {
            BlockContent::Paragraph { paragraph: body }
            | BlockContent::BulletedListItem {
                bulleted_list_item: body,
            }
            | BlockContent::NumberedListItem {
                numbered_list_item: body,
            }
            | BlockContent::Toggle { toggle: body }
            | BlockContent::Quote { quote: body } => &body.rich_text,
            BlockContent::Heading1 { heading_1: body }
            | BlockContent::Heading2 { heading_2: body }
            | BlockContent::Heading3 { heading_3: body } => &body.rich_text,
            BlockContent::ToDo { to_do } => &to_do.rich_text,
            BlockContent::Callout { callout } => &callout.rich_text,
            BlockContent::Code { code } => &code.rich_text,
            BlockContent::Template { template } => &template.rich_text,
            _ => return None,
        };
        Some(runs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub color: Color,
}

impl TextBlock {
    pub fn plain(text: &str) -> Self {
        Self {
            rich_text: vec![RichText::plain(text)],
            color: Color::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub is_toggleable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub caption: Vec<RichText>,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationBlock {
    pub expression: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorBlock {
    #[serde(default)]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaBlock {
    #[serde(flatten)]
    pub file: FileObject,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBlock {
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleBlock {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkTarget {
    PageId { page_id: PageId },
    DatabaseId { database_id: DatabaseId },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    pub table_width: u32,
    #[serde(default)]
    pub has_column_header: bool,
    #[serde(default)]
    pub has_row_header: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedBlock {
    #[serde(default)]
    pub synced_from: Option<SyncedFrom>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncedFrom {
    BlockId { block_id: BlockId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}
