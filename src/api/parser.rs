// src/api/parser.rs
//! Turns raw HTTP responses into typed results.
//!
//! List endpoints are parsed leniently: the envelope must be valid, but each
//! record is parsed on its own and failures are reported per record.

use super::client::ApiResponse;
use super::types::{NotionApiErrorResponse, PaginatedResponse, RejectedRecord, ResultPage};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse any Notion API response, mapping error bodies to typed errors.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!("{} (body: {})", e, preview(body)))
    })
}

fn parse_error(body: &str, status: StatusCode, url: &str) -> AppError {
    match serde_json::from_str::<NotionApiErrorResponse>(body) {
        Ok(error) => {
            log::debug!(
                "Notion error from {} ({}): {} [request {}]",
                url,
                error.code,
                error.message,
                error.request_id.as_deref().unwrap_or("-")
            );
            AppError::NotionService {
                code: NotionErrorCode::from_api_response(&error.code),
                message: error.message,
                status,
            }
        }
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(status.as_u16()),
            message: format!("HTTP {} from {}: {}", status, url, preview(body)),
            status,
        },
    }
}

/// Parses one page of a list endpoint, record by record.
pub fn parse_result_page<T>(result: ApiResponse<String>) -> Result<ResultPage<T>, AppError>
where
    T: DeserializeOwned,
{
    let envelope: PaginatedResponse<Value> = parse_api_response(result)?;
    Ok(split_records(envelope))
}

/// Separates records that parse as `T` from those that don't.
pub fn split_records<T>(envelope: PaginatedResponse<Value>) -> ResultPage<T>
where
    T: DeserializeOwned,
{
    let mut results = Vec::with_capacity(envelope.results.len());
    let mut rejected = Vec::new();

    for record in envelope.results {
        let object_id = record.get("id").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value::<T>(record) {
            Ok(parsed) => results.push(parsed),
            Err(e) => {
                log::warn!(
                    "Skipping unparseable {} record {}: {}",
                    envelope.object,
                    object_id.as_deref().unwrap_or("<no id>"),
                    e
                );
                rejected.push(RejectedRecord {
                    object_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    ResultPage {
        results,
        rejected,
        next_cursor: envelope.next_cursor,
        has_more: envelope.has_more,
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
