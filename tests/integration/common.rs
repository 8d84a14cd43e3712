// tests/integration/common.rs
//! Shared helpers: an in-memory repository with scripted search results,
//! fixture loading and small object builders.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use futures::StreamExt;
use notion_source::api::pagination::paginate;
use notion_source::api::parser::parse_result_page;
use notion_source::api::ApiResponse;
use notion_source::model::{BlockContent, PartialUser, SearchObject, TextBlock, TitleBlock};
use notion_source::source::ItemMetadata;
use notion_source::*;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// One scripted response of a list endpoint; `Err` holds the failure message.
pub type Scripted<T> = Result<ResultPage<T>, String>;

/// A `NotionRepository` that serves canned data and records how it was used.
#[derive(Default)]
pub struct MockRepository {
    page_search: Vec<Scripted<SearchResult>>,
    database_search: Vec<Scripted<SearchResult>>,
    users: Vec<Scripted<User>>,
    pages: HashMap<NotionId, Page>,
    children: HashMap<NotionId, Vec<Block>>,
    comments: HashMap<NotionId, Vec<Comment>>,
    failing_pages: HashSet<NotionId>,
    failing_children: HashSet<NotionId>,
    detail_delay: Duration,
    unpaged: bool,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    detail_calls: AtomicUsize,
    children_calls: Mutex<Vec<NotionId>>,
    searches: Mutex<Vec<SearchRequest>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the page search; every page hit also becomes retrievable.
    pub fn with_page_search(mut self, script: Vec<Scripted<SearchResult>>) -> Self {
        for page in script.iter().flatten() {
            for hit in &page.results {
                if let SearchResult::Page(page) = hit {
                    let id = page.id.canonical().expect("scripted page ids are valid");
                    self.pages.insert(id, page.clone());
                }
            }
        }
        self.page_search = script;
        self
    }

    /// Scripts the page search from plain pages, `per_response` hits at a time.
    pub fn with_pages(self, pages: Vec<Page>, per_response: usize) -> Self {
        let script = pages
            .chunks(per_response.max(1))
            .map(|chunk| {
                Ok(ResultPage::new(
                    chunk.iter().cloned().map(SearchResult::Page).collect(),
                ))
            })
            .collect();
        self.with_page_search(script)
    }

    pub fn with_database_search(mut self, script: Vec<Scripted<SearchResult>>) -> Self {
        self.database_search = script;
        self
    }

    pub fn with_users(mut self, script: Vec<Scripted<User>>) -> Self {
        self.users = script;
        self
    }

    pub fn with_children(mut self, parent: &NotionId, blocks: Vec<Block>) -> Self {
        self.children.insert(parent.clone(), blocks);
        self
    }

    pub fn with_comments(mut self, parent: &NotionId, comments: Vec<Comment>) -> Self {
        self.comments.insert(parent.clone(), comments);
        self
    }

    pub fn failing_page(mut self, id: &NotionId) -> Self {
        self.failing_pages.insert(id.clone());
        self
    }

    pub fn failing_children(mut self, id: &NotionId) -> Self {
        self.failing_children.insert(id.clone());
        self
    }

    /// Serves every script as a plain sequence of results, so an error does
    /// not end the listing the way a failed cursor request does.
    pub fn unpaged(mut self) -> Self {
        self.unpaged = true;
        self
    }

    /// How long each page retrieval takes.
    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    /// Highest number of page retrievals seen running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Parents whose children were requested, in call order.
    pub fn children_calls(&self) -> Vec<NotionId> {
        self.children_calls.lock().clone()
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.searches.lock().clone()
    }
}

/// Serves `script` through the real cursor pagination; the cursor is the
/// index of the next scripted response.
fn scripted_stream<T>(script: Vec<Scripted<T>>) -> PageStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    let script = Arc::new(script);
    paginate(
        move |cursor: Option<String>| {
            let script = Arc::clone(&script);
            async move {
                let index = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
                let Some(entry) = script.get(index) else {
                    return Ok(ResultPage::new(Vec::new()));
                };
                let mut page = match entry.clone() {
                    Ok(page) => page,
                    Err(message) => return Err(AppError::MalformedResponse(message)),
                };
                page.next_cursor = None;
                page.has_more = false;
                Ok(if index + 1 < script.len() {
                    page.with_cursor((index + 1).to_string())
                } else {
                    page
                })
            }
        },
        None,
    )
}

/// Yields every scripted response in turn, errors included.
fn unpaged_stream<T>(script: Vec<Scripted<T>>) -> PageStream<T>
where
    T: Send + 'static,
{
    futures::stream::iter(
        script
            .into_iter()
            .map(|entry| entry.map_err(AppError::MalformedResponse)),
    )
    .boxed()
}

impl MockRepository {
    fn serve<T>(&self, script: Vec<Scripted<T>>) -> PageStream<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.unpaged {
            unpaged_stream(script)
        } else {
            scripted_stream(script)
        }
    }
}

fn not_found(id: &NotionId) -> AppError {
    AppError::NotionService {
        code: NotionErrorCode::ObjectNotFound,
        message: format!("Could not find object with ID: {}", id),
        status: reqwest::StatusCode::NOT_FOUND,
    }
}

/// Decrements the in-flight counter even when the call is dropped mid-way.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl NotionRepository for MockRepository {
    fn search(&self, request: SearchRequest) -> PageStream<SearchResult> {
        let script = match request.filter.as_ref().map(|filter| filter.value) {
            Some(SearchObject::Database) => self.database_search.clone(),
            _ => self.page_search.clone(),
        };
        self.searches.lock().push(request);
        self.serve(script)
    }

    fn list_users(&self, _page_size: u32) -> PageStream<User> {
        self.serve(self.users.clone())
    }

    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !self.detail_delay.is_zero() {
            tokio::time::sleep(self.detail_delay).await;
        }

        if self.failing_pages.contains(id) {
            return Err(not_found(id));
        }
        self.pages.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn retrieve_children(
        &self,
        parent: &NotionId,
        _page_size: u32,
    ) -> Result<PaginationResult<Block>, AppError> {
        self.children_calls.lock().push(parent.clone());
        if self.failing_children.contains(parent) {
            return Err(not_found(parent));
        }
        Ok(self.children.get(parent).cloned().unwrap_or_default().into())
    }

    async fn list_comments(
        &self,
        block: &NotionId,
        _page_size: u32,
    ) -> Result<PaginationResult<Comment>, AppError> {
        Ok(self.comments.get(block).cloned().unwrap_or_default().into())
    }
}

/// Tags every item with its raw id and nothing else.
pub struct IdentityDecoder;

impl RecordDecoder for IdentityDecoder {
    fn decode(&self, record: Record) -> Result<NormalizedItem, DecodeError> {
        let kind = record.kind();
        let id = match &record {
            Record::Page(page) | Record::PageDetail { page, .. } => page.id.to_string(),
            Record::Database(database) => database.id.to_string(),
            Record::Block { block, .. } => block.id.to_string(),
            Record::User(user) => user.id.to_string(),
            Record::Comment(comment) => comment.id.to_string(),
        };

        Ok(NormalizedItem {
            id: id.clone(),
            kind,
            payload: serde_json::Value::Null,
            metadata: ItemMetadata {
                source_type: "identity".to_string(),
                source_id: id.clone(),
                original_id: id,
                created_at: None,
                modified_at: None,
                processing: Default::default(),
                properties: PropertyMap::new(),
            },
        })
    }
}

pub fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

/// A deterministic, valid Notion id.
pub fn id(n: u64) -> NotionId {
    NotionId::parse(&format!("00000000-0000-4000-8000-{:012x}", n)).unwrap()
}

pub fn page(n: u64) -> Page {
    Page::new(PageId::from(&id(n)), at(), at())
}

pub fn pages(range: std::ops::Range<u64>) -> Vec<Page> {
    range.map(page).collect()
}

pub fn database(n: u64) -> Database {
    Database::new(DatabaseId::from(&id(n)), at(), at())
}

pub fn paragraph(n: u64, children: Vec<Block>) -> Block {
    let mut block = Block::new(
        BlockId::from(&id(n)),
        at(),
        BlockContent::Paragraph {
            paragraph: TextBlock::plain(&format!("paragraph {}", n)),
        },
    );
    block.has_children = !children.is_empty();
    block.children = children;
    block
}

/// A paragraph that reports children without carrying them, as the API does.
pub fn paragraph_with_children(n: u64) -> Block {
    let mut block = paragraph(n, Vec::new());
    block.has_children = true;
    block
}

pub fn child_page(n: u64) -> Block {
    let mut block = Block::new(
        BlockId::from(&id(n)),
        at(),
        BlockContent::ChildPage {
            child_page: TitleBlock {
                title: format!("child {}", n),
            },
        },
    );
    block.has_children = true;
    block
}

pub fn comment(n: u64, on: &NotionId) -> Comment {
    Comment {
        id: CommentId::from(&id(n)),
        parent: Parent::PageId {
            page_id: PageId::from(on),
        },
        discussion_id: format!("discussion-{}", n),
        created_time: at(),
        last_edited_time: at(),
        created_by: Some(PartialUser::new("6794760a-1f15-45cd-9c65-0dfe42f5135a")),
        rich_text: vec![RichText::plain(format!("comment {}", n))],
    }
}

/// Loads a fixture from `tests/fixtures/api_responses`.
pub fn fixture(name: &str) -> String {
    let path = format!(
        "{}/tests/fixtures/api_responses/{}.json",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e))
}

/// Parses a fixture the way the HTTP client parses a 200 response.
pub fn fixture_page<T: DeserializeOwned>(name: &str) -> ResultPage<T> {
    parse_result_page(ApiResponse {
        data: fixture(name),
        status: reqwest::StatusCode::OK,
        url: format!("https://api.notion.com/v1/{}", name),
    })
    .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}

/// Receives until the channel closes, failing the test if that takes too long.
pub async fn drain(mut items: mpsc::Receiver<NormalizedItem>) -> Vec<NormalizedItem> {
    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(item) = items.recv().await {
            received.push(item);
        }
    })
    .await
    .expect("read did not finish in time");
    received
}

pub fn kinds_of(items: &[NormalizedItem]) -> Vec<ObjectKind> {
    items.iter().map(|item| item.kind).collect()
}
