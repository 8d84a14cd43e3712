// src/source/coordinator.rs
//! The streaming read: one worker group per requested kind, merged onto a
//! single bounded channel.
//!
//! Lifecycle of a read: validate, spawn the supervisor, return the receiver.
//! The supervisor runs the groups, waits for all of them, finalizes the
//! metrics, then drops the last sender, which closes the channel.

use super::decoder::{NotionRecordDecoder, Record, RecordDecoder};
use super::gate::{ConcurrencyGate, GatePermit};
use super::item::NormalizedItem;
use super::metrics::{MetricsRecorder, SourceMetrics};
use super::request::{ReadPlan, ReadRequest};
use crate::api::{NotionRepository, PageDetail, PageDetailOptions, PageStream, RejectedRecord, ResultPage};
use crate::config::SourceConfig;
use crate::constants::{SOURCE_NAME, SOURCE_TYPE};
use crate::error::AppError;
use crate::model::{Block, Page, SearchRequest, SearchResult};
use crate::pipeline::{DataSource, SourceDescriptor};
use crate::types::{NotionId, ObjectKind, PropertyMap};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// A Notion workspace exposed as a streaming [`DataSource`].
pub struct NotionSource {
    fetcher: Option<Arc<dyn NotionRepository>>,
    decoder: Arc<dyn RecordDecoder>,
    config: SourceConfig,
    metrics: Arc<MetricsRecorder>,
}

impl NotionSource {
    pub fn new(fetcher: Arc<dyn NotionRepository>, config: SourceConfig) -> Self {
        Self {
            fetcher: Some(fetcher),
            ..Self::unconfigured(config)
        }
    }

    /// A source without a fetcher; every read fails validation.
    pub fn unconfigured(config: SourceConfig) -> Self {
        Self {
            fetcher: None,
            decoder: Arc::new(NotionRecordDecoder::default()),
            config,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn RecordDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }
}

impl DataSource for NotionSource {
    fn describe(&self) -> SourceDescriptor {
        let config = &self.config;
        SourceDescriptor {
            source_type: SOURCE_TYPE.to_string(),
            name: SOURCE_NAME.to_string(),
            properties: PropertyMap::new()
                .with("include_pages", json!(config.include_pages))
                .with("include_databases", json!(config.include_databases))
                .with("include_blocks", json!(config.include_blocks))
                .with("include_comments", json!(config.include_comments))
                .with("include_users", json!(config.include_users))
                .with("max_depth", json!(config.max_depth))
                .with("page_size", json!(config.page_size))
                .with("requests_per_second", json!(config.requests_per_second))
                .with("max_concurrent", json!(config.max_concurrent))
                .with("workspace_id", json!(config.workspace_id)),
        }
    }

    fn supports_kind(&self, kind: ObjectKind) -> bool {
        kind.is_readable()
    }

    fn validate(&self, request: &ReadRequest) -> Result<(), AppError> {
        if self.fetcher.is_none() {
            return Err(AppError::invalid_request("no Notion client is configured"));
        }
        if request.kinds.is_empty() {
            return Err(AppError::invalid_request(
                "at least one object kind must be requested",
            ));
        }
        if let Some(kind) = request.kinds.iter().find(|kind| !self.supports_kind(**kind)) {
            return Err(AppError::invalid_request(format!(
                "unsupported object kind: {}",
                kind
            )));
        }
        ReadPlan::resolve(&self.config, request).check_bounds()
    }

    fn read(
        &self,
        cancel: CancellationToken,
        request: ReadRequest,
    ) -> Result<mpsc::Receiver<NormalizedItem>, AppError> {
        self.validate(&request)?;
        let fetcher = self
            .fetcher
            .clone()
            .ok_or_else(|| AppError::invalid_request("no Notion client is configured"))?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| AppError::InternalError {
            message: "read must be called inside a Tokio runtime".to_string(),
            source: Some(Box::new(e)),
        })?;

        let plan = ReadPlan::resolve(&self.config, &request);
        let (output, receiver) = mpsc::channel(plan.buffer_capacity());

        log::info!(
            "Starting read of {:?} (page size {}, {} concurrent, depth {})",
            request.kinds,
            plan.page_size,
            plan.max_concurrent,
            plan.max_depth
        );

        let context = Arc::new(ReadContext {
            fetcher,
            decoder: Arc::clone(&self.decoder),
            metrics: Arc::clone(&self.metrics),
            plan,
            cancel: cancel.child_token(),
            output,
        });
        runtime.spawn(supervise(context));

        Ok(receiver)
    }

    fn metrics(&self) -> SourceMetrics {
        self.metrics.snapshot()
    }

    fn close(&self) -> Result<(), AppError> {
        self.metrics.finalize();
        log::info!("Closed Notion source: {}", self.metrics.snapshot());
        Ok(())
    }
}

/// Everything the tasks of one read share. The channel closes when the last
/// clone of this context is dropped.
struct ReadContext {
    fetcher: Arc<dyn NotionRepository>,
    decoder: Arc<dyn RecordDecoder>,
    metrics: Arc<MetricsRecorder>,
    plan: ReadPlan,
    cancel: CancellationToken,
    output: mpsc::Sender<NormalizedItem>,
}

impl ReadContext {
    /// The next page of results, skipping (and counting) failed ones.
    ///
    /// `None` when the stream is exhausted or the read was cancelled.
    async fn next_page<T>(
        &self,
        pages: &mut PageStream<T>,
        group: ObjectKind,
    ) -> Option<ResultPage<T>> {
        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                next = pages.next() => next?,
            };
            self.metrics.increment_request();

            match result {
                Ok(page) => {
                    log::debug!(
                        "Received {} {} results (more: {})",
                        page.results.len(),
                        group,
                        page.has_more
                    );
                    self.count_rejected(group, &page.rejected);
                    return Some(page);
                }
                Err(e) => {
                    log::warn!("Failed to fetch {} results: {}", group, e);
                    self.metrics.increment_error();
                }
            }
        }
    }

    fn count_rejected(&self, group: ObjectKind, rejected: &[RejectedRecord]) {
        for record in rejected {
            log::debug!(
                "Dropped unparseable {} {}: {}",
                group,
                record.object_id.as_deref().unwrap_or("<no id>"),
                record.reason
            );
            self.metrics.increment_error();
        }
    }

    /// Decodes a record and sends it, racing the send against cancellation.
    ///
    /// Returns `false` once the read should stop.
    async fn emit(&self, record: Record) -> bool {
        let item = match self.decoder.decode(record) {
            Ok(item) => item,
            Err(e) => {
                log::warn!("Skipping record: {}", e);
                self.metrics.increment_error();
                return true;
            }
        };
        let kind = item.kind;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.output.send(item) => match sent {
                Ok(()) => {
                    self.metrics.increment_kind(kind);
                    true
                }
                Err(_) => {
                    log::debug!("Receiver dropped, stopping read");
                    self.cancel.cancel();
                    false
                }
            },
        }
    }
}

async fn supervise(context: Arc<ReadContext>) {
    let mut groups = JoinSet::new();

    if context.plan.runs_page_group() {
        groups.spawn(read_pages(Arc::clone(&context)));
    }
    if context.plan.want_databases {
        groups.spawn(read_databases(Arc::clone(&context)));
    }
    if context.plan.want_users {
        groups.spawn(read_users(Arc::clone(&context)));
    }
    if groups.is_empty() {
        log::info!("No requested kind is enabled, nothing to read");
    }

    while let Some(joined) = groups.join_next().await {
        report_join(&context, joined);
    }

    context.metrics.finalize();
    log::info!("Read finished: {}", context.metrics.snapshot());
}

fn report_join(context: &ReadContext, joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            log::error!("Read task panicked: {}", e);
            context.metrics.increment_error();
        }
    }
}

async fn read_pages(context: Arc<ReadContext>) {
    log::info!("Reading pages");
    let mut pages = context
        .fetcher
        .search(context.plan.search(SearchRequest::pages()));
    let gate = ConcurrencyGate::new(context.plan.max_concurrent);
    let options = context.plan.detail_options();
    let mut enrichments = JoinSet::new();

    'pages: while let Some(results) = context.next_page(&mut pages, ObjectKind::Page).await {
        for hit in results.results {
            let page = match hit {
                SearchResult::Page(page) => page,
                SearchResult::Database(database) => {
                    log::debug!("Ignoring database {} in page search", database.id);
                    continue;
                }
            };
            if !context.plan.filters.admits_page(&page) {
                continue;
            }

            let Some(permit) = gate.enter(&context.cancel).await else {
                break 'pages;
            };
            enrichments.spawn(enrich_page(Arc::clone(&context), page, options, permit));

            while let Some(joined) = enrichments.try_join_next() {
                report_join(&context, joined);
            }
        }
    }

    while let Some(joined) = enrichments.join_next().await {
        report_join(&context, joined);
    }
    log::info!("Finished reading pages");
}

/// Fetches one page's detail under a gate permit, then emits the page and
/// whatever nested kinds were requested.
async fn enrich_page(
    context: Arc<ReadContext>,
    page: Page,
    options: PageDetailOptions,
    permit: GatePermit,
) {
    let id = match page.id.canonical() {
        Ok(id) => id,
        Err(e) => {
            log::warn!("Skipping page with unusable id '{}': {}", page.id, e);
            context.metrics.increment_error();
            return;
        }
    };

    let detail = tokio::select! {
        biased;
        _ = context.cancel.cancelled() => return,
        detail = context.fetcher.retrieve_page_detail(&id, &options) => detail,
    };
    drop(permit);

    let detail = match detail {
        Ok(detail) => {
            context.metrics.increment_request();
            detail
        }
        Err(e) => {
            log::warn!("Failed to fetch page {}: {}", id, e);
            context.metrics.increment_error();
            return;
        }
    };
    for _ in 0..detail.rejected {
        context.metrics.increment_error();
    }

    let blocks_count = detail.block_count();
    let PageDetail {
        page,
        blocks,
        comments,
        ..
    } = detail;

    if context.plan.want_pages {
        let record = Record::PageDetail {
            page,
            blocks_count,
            comments_count: comments.len(),
        };
        if !context.emit(record).await {
            return;
        }
    }

    if context.plan.want_blocks {
        for (block, parent_id) in flatten_blocks(blocks, &id) {
            if !context.emit(Record::Block { block, parent_id }).await {
                return;
            }
        }
    }

    if context.plan.want_comments {
        for comment in comments {
            if !context.emit(Record::Comment(comment)).await {
                return;
            }
        }
    }
}

/// Flattens a block tree depth-first, pairing each block with its parent.
///
/// Children of a block whose id does not parse are attributed to the
/// nearest ancestor that does.
fn flatten_blocks(blocks: Vec<Block>, parent: &NotionId) -> Vec<(Block, NotionId)> {
    fn walk(blocks: Vec<Block>, parent: &NotionId, out: &mut Vec<(Block, NotionId)>) {
        for block in blocks {
            let (block, children) = block.into_parts();
            let own = block.id.canonical().unwrap_or_else(|_| parent.clone());
            out.push((block, parent.clone()));
            walk(children, &own, out);
        }
    }

    let mut out = Vec::new();
    walk(blocks, parent, &mut out);
    out
}

async fn read_databases(context: Arc<ReadContext>) {
    log::info!("Reading databases");
    let mut pages = context
        .fetcher
        .search(context.plan.search(SearchRequest::databases()));

    while let Some(results) = context
        .next_page(&mut pages, ObjectKind::Database)
        .await
    {
        for hit in results.results {
            let database = match hit {
                SearchResult::Database(database) => database,
                SearchResult::Page(page) => {
                    log::debug!("Ignoring page {} in database search", page.id);
                    continue;
                }
            };
            if !context.plan.filters.admits_database(&database) {
                continue;
            }
            if !context.emit(Record::Database(database)).await {
                return;
            }
        }
    }
    log::info!("Finished reading databases");
}

async fn read_users(context: Arc<ReadContext>) {
    log::info!("Reading users");
    let mut pages = context.fetcher.list_users(context.plan.page_size);

    while let Some(results) = context.next_page(&mut pages, ObjectKind::User).await {
        for user in results.results {
            if !context.emit(Record::User(user)).await {
                return;
            }
        }
    }
    log::info!("Finished reading users");
}
