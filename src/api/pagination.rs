// src/api/pagination.rs
//! Cursor pagination as a lazy stream of result pages.

use super::types::{PaginationResult, ResultPage};
use super::PageStream;
use crate::error::AppError;
use futures::{stream, StreamExt};
use std::future::Future;

struct Cursor<F> {
    fetch_fn: F,
    next: Option<String>,
    pages: u32,
    done: bool,
}

/// Streams every page of a cursor-paginated endpoint.
///
/// `fetch_fn` receives the cursor to resume from (`None` for the first
/// page). The stream ends after the last page, after `max_pages` pages, or
/// right after the first error.
pub fn paginate<T, F, Fut>(fetch_fn: F, max_pages: Option<u32>) -> PageStream<T>
where
    T: Send + 'static,
    F: FnMut(Option<String>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<ResultPage<T>, AppError>> + Send + 'static,
{
    let start = Cursor {
        fetch_fn,
        next: None,
        pages: 0,
        done: false,
    };

    stream::unfold(start, move |mut cursor| async move {
        if cursor.done {
            return None;
        }
        if let Some(max) = max_pages {
            if cursor.pages >= max {
                log::debug!("Reached maximum page limit: {}", max);
                return None;
            }
        }

        let result = (cursor.fetch_fn)(cursor.next.take()).await;
        cursor.pages += 1;

        match &result {
            Ok(page) => match page.continuation() {
                Some(next) => cursor.next = Some(next.to_string()),
                None => cursor.done = true,
            },
            Err(e) => {
                log::debug!("Pagination stopped after page {}: {}", cursor.pages, e);
                cursor.done = true;
            }
        }

        Some((result, cursor))
    })
    .boxed()
}

/// Drains a page stream, failing on the first error.
pub async fn collect_pages<T>(mut pages: PageStream<T>) -> Result<PaginationResult<T>, AppError> {
    let mut collected = PaginationResult::default();

    while let Some(page) = pages.next().await {
        let page = page?;
        collected.rejected += page.rejected.len();
        collected.items.extend(page.results);
    }

    collected.total_fetched = collected.items.len();
    Ok(collected)
}
