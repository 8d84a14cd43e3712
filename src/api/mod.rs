// src/api/mod.rs
//! Notion API interaction: the ability to retrieve content from a workspace.
//!
//! Callers depend on [`NotionRepository`], never on HTTP details. List
//! endpoints surface as lazy [`PageStream`]s; pacing, retry and parsing are
//! internal to the implementation.

pub mod client;
mod pacer;
pub mod pagination;
pub mod parser;
mod types;

use crate::error::AppError;
use crate::model::{Block, Comment, Page, SearchRequest, SearchResult, User};
use crate::types::NotionId;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::FutureExt;

pub use client::{ApiResponse, NotionHttpClient};
pub use pacer::RequestPacer;
pub use types::{
    NotionApiErrorResponse, PageDetail, PageDetailOptions, PaginatedResponse, PaginationResult,
    RejectedRecord, ResultPage,
};

/// A lazy sequence of result pages; each element is one request's outcome.
pub type PageStream<T> = BoxStream<'static, Result<ResultPage<T>, AppError>>;

/// The ability to retrieve content from a Notion workspace.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Streams the pages of a search.
    fn search(&self, request: SearchRequest) -> PageStream<SearchResult>;

    /// Streams the pages of the workspace's user list.
    fn list_users(&self, page_size: u32) -> PageStream<User>;

    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError>;

    /// All direct children of a page or block.
    async fn retrieve_children(
        &self,
        parent: &NotionId,
        page_size: u32,
    ) -> Result<PaginationResult<Block>, AppError>;

    /// All comments attached to a page or block.
    async fn list_comments(
        &self,
        block: &NotionId,
        page_size: u32,
    ) -> Result<PaginationResult<Comment>, AppError>;

    /// Fetches a page together with its block tree and comments.
    ///
    /// Any failing call fails the whole detail.
    async fn retrieve_page_detail(
        &self,
        id: &NotionId,
        options: &PageDetailOptions,
    ) -> Result<PageDetail, AppError> {
        let page = self.retrieve_page(id).await?;
        let mut detail = PageDetail::new(page);

        if options.include_blocks {
            let (blocks, rejected) =
                fetch_block_tree(self, id, options.page_size, options.block_levels()).await?;
            detail.blocks = blocks;
            detail.rejected += rejected;
        }

        if options.include_comments {
            let comments = self.list_comments(id, options.page_size).await?;
            detail.comments = comments.items;
            detail.rejected += comments.rejected;
        }

        log::debug!(
            "Fetched page {} with {} blocks and {} comments",
            id,
            detail.block_count(),
            detail.comments.len()
        );
        Ok(detail)
    }
}

/// Walks the block tree below `parent`, `levels` levels deep.
///
/// Child pages and child databases are not descended into.
fn fetch_block_tree<'a, R>(
    repo: &'a R,
    parent: &'a NotionId,
    page_size: u32,
    levels: u8,
) -> BoxFuture<'a, Result<(Vec<Block>, usize), AppError>>
where
    R: NotionRepository + ?Sized,
{
    async move {
        let fetched = repo.retrieve_children(parent, page_size).await?;
        let mut rejected = fetched.rejected;
        let mut blocks = fetched.items;

        if levels > 1 {
            for block in blocks.iter_mut().filter(|block| block.should_descend()) {
                let id = block.id.canonical()?;
                let (children, nested_rejected) =
                    fetch_block_tree(repo, &id, page_size, levels - 1).await?;
                block.children = children;
                rejected += nested_rejected;
            }
        }

        Ok((blocks, rejected))
    }
    .boxed()
}
