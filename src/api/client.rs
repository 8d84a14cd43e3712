// src/api/client.rs
//! HTTP implementation of [`NotionRepository`].
//!
//! Every request shares one pacer and is retried with backoff when the
//! failure is transient. Parsing lives in [`super::parser`].

use super::pacer::RequestPacer;
use super::pagination::paginate;
use super::parser::{parse_api_response, parse_result_page};
use super::types::{PaginationResult, ResultPage};
use super::{NotionRepository, PageStream};
use crate::config::ClientConfig;
use crate::constants::NOTION_VERSION;
use crate::error::AppError;
use crate::error_recovery::{retry_with_backoff, RetryPolicy};
use crate::model::{Block, Comment, Page, SearchRequest, SearchResult, User};
use crate::types::{ApiKey, NotionId};
use reqwest::{header, Client, RequestBuilder, Response};
use std::sync::Arc;
use url::Url;

/// A paced, retrying wrapper around reqwest for the Notion API.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: Url,
    pacer: Arc<RequestPacer>,
    retry: RetryPolicy,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(&config.api_key)?)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            pacer: Arc::new(RequestPacer::new(config.requests_per_second)),
            retry: config.retry_policy(),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        Ok(self.base_url.join(path)?)
    }

    /// Sends a request built by `build`, pacing and retrying it, and parses
    /// the response with `parse`.
    ///
    /// `build` runs once per attempt since a sent request cannot be reused.
    async fn execute<T, B, P>(&self, build: B, parse: P) -> Result<T, AppError>
    where
        B: Fn() -> RequestBuilder,
        P: Fn(ApiResponse<String>) -> Result<T, AppError>,
    {
        let (build, parse) = (&build, &parse);
        let pacer = &self.pacer;
        retry_with_backoff(
            move || async move {
                pacer.acquire().await;
                let response = build().send().await?;
                let result = extract_response_text(response).await?;
                parse(result)
            },
            &self.retry,
        )
        .await
    }

    /// Makes a GET request to `url`.
    pub async fn get<T>(
        &self,
        url: Url,
        parse: impl Fn(ApiResponse<String>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        log::debug!("GET {}", url);
        self.execute(|| self.client.get(url.clone()), parse).await
    }

    /// Makes a POST request with a JSON body to `url`.
    pub async fn post<T, S>(
        &self,
        url: Url,
        body: &S,
        parse: impl Fn(ApiResponse<String>) -> Result<T, AppError>,
    ) -> Result<T, AppError>
    where
        S: serde::Serialize + ?Sized,
    {
        log::debug!("POST {}", url);
        self.execute(|| self.client.post(url.clone()).json(body), parse)
            .await
    }

    /// One page of `POST /search`.
    pub async fn search_page(
        &self,
        request: &SearchRequest,
    ) -> Result<ResultPage<SearchResult>, AppError> {
        let url = self.endpoint("search")?;
        self.post(url, request, parse_result_page).await
    }

    /// One page of `GET /users`.
    pub async fn users_page(
        &self,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<ResultPage<User>, AppError> {
        let url = self.paged_endpoint("users", page_size, cursor, &[])?;
        self.get(url, parse_result_page).await
    }

    /// One page of `GET /blocks/{id}/children`.
    pub async fn children_page(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<ResultPage<Block>, AppError> {
        let path = format!("blocks/{}/children", parent);
        let url = self.paged_endpoint(&path, page_size, cursor, &[])?;
        self.get(url, parse_result_page).await
    }

    /// One page of `GET /comments?block_id=`.
    pub async fn comments_page(
        &self,
        block: &NotionId,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<ResultPage<Comment>, AppError> {
        let url =
            self.paged_endpoint("comments", page_size, cursor, &[("block_id", block.as_str())])?;
        self.get(url, parse_result_page).await
    }

    fn paged_endpoint(
        &self,
        path: &str,
        page_size: u32,
        cursor: Option<&str>,
        extra: &[(&str, &str)],
    ) -> Result<Url, AppError> {
        let mut url = self.endpoint(path)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in extra {
                query.append_pair(key, value);
            }
            query.append_pair("page_size", &page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("start_cursor", cursor);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl NotionRepository for NotionHttpClient {
    fn search(&self, request: SearchRequest) -> PageStream<SearchResult> {
        let client = self.clone();
        paginate(
            move |cursor| {
                let client = client.clone();
                let mut request = request.clone();
                request.start_cursor = cursor;
                async move { client.search_page(&request).await }
            },
            None,
        )
    }

    fn list_users(&self, page_size: u32) -> PageStream<User> {
        let client = self.clone();
        paginate(
            move |cursor: Option<String>| {
                let client = client.clone();
                async move { client.users_page(page_size, cursor.as_deref()).await }
            },
            None,
        )
    }

    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError> {
        let url = self.endpoint(&format!("pages/{}", id))?;
        self.get(url, parse_api_response).await
    }

    async fn retrieve_children(
        &self,
        parent: &NotionId,
        page_size: u32,
    ) -> Result<PaginationResult<Block>, AppError> {
        let client = self.clone();
        let parent = parent.clone();
        let pages = paginate(
            move |cursor: Option<String>| {
                let client = client.clone();
                let parent = parent.clone();
                async move {
                    client
                        .children_page(&parent, page_size, cursor.as_deref())
                        .await
                }
            },
            None,
        );
        super::pagination::collect_pages(pages).await
    }

    async fn list_comments(
        &self,
        block: &NotionId,
        page_size: u32,
    ) -> Result<PaginationResult<Comment>, AppError> {
        let client = self.clone();
        let block = block.clone();
        let pages = paginate(
            move |cursor: Option<String>| {
                let client = client.clone();
                let block = block.clone();
                async move {
                    client
                        .comments_page(&block, page_size, cursor.as_deref())
                        .await
                }
            },
            None,
        );
        super::pagination::collect_pages(pages).await
    }
}

impl std::fmt::Debug for NotionHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("pacer", &self.pacer)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
