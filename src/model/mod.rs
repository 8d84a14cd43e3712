// src/model/mod.rs
//! The Notion wire model.
//!
//! Every polymorphic shape of the API (parents, block bodies, property
//! values, rich text, users, search hits) is a closed serde-tagged enum, so a
//! value can only ever carry the payload that matches its type tag.

mod block;
mod comment;
mod common;
mod page;
mod properties;
mod rich_text;
mod search;
mod user;

pub use block::*;
pub use comment::Comment;
pub use common::*;
pub use page::{Database, Page};
pub use properties::*;
pub use rich_text::*;
pub use search::*;
pub use user::*;
