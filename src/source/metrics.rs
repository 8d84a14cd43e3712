// src/source/metrics.rs
//! Counters describing what a source has read.

use crate::types::ObjectKind;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::time::{Duration, Instant};

/// A point-in-time copy of the source counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMetrics {
    pub objects_read: u64,
    pub pages_read: u64,
    pub databases_read: u64,
    pub blocks_read: u64,
    pub users_read: u64,
    pub comments_read: u64,
    pub requests_made: u64,
    pub errors_encountered: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_duration: Option<Duration>,
}

impl SourceMetrics {
    fn started(start_time: DateTime<Utc>) -> Self {
        Self {
            objects_read: 0,
            pages_read: 0,
            databases_read: 0,
            blocks_read: 0,
            users_read: 0,
            comments_read: 0,
            requests_made: 0,
            errors_encountered: 0,
            start_time,
            end_time: None,
            total_duration: None,
        }
    }

    /// Sum of the per-kind counters.
    pub fn kinds_total(&self) -> u64 {
        self.pages_read + self.databases_read + self.blocks_read + self.users_read + self.comments_read
    }
}

impl std::fmt::Display for SourceMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} objects ({} pages, {} databases, {} blocks, {} users, {} comments), {} requests, {} errors",
            self.objects_read,
            self.pages_read,
            self.databases_read,
            self.blocks_read,
            self.users_read,
            self.comments_read,
            self.requests_made,
            self.errors_encountered
        )?;
        if let Some(duration) = self.total_duration {
            write!(f, " in {:.2}s", duration.as_secs_f64())?;
        }
        Ok(())
    }
}

struct MetricsState {
    metrics: SourceMetrics,
    started: Instant,
}

/// Thread-safe recorder behind a single lock; the clock starts at creation.
pub struct MetricsRecorder {
    state: Mutex<MetricsState>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MetricsState {
                metrics: SourceMetrics::started(Utc::now()),
                started: Instant::now(),
            }),
        }
    }

    /// Counts one delivered item of `kind`.
    pub fn increment_kind(&self, kind: ObjectKind) {
        let mut state = self.state.lock();
        let metrics = &mut state.metrics;
        match kind {
            ObjectKind::Page => metrics.pages_read += 1,
            ObjectKind::Database => metrics.databases_read += 1,
            ObjectKind::Block => metrics.blocks_read += 1,
            ObjectKind::User => metrics.users_read += 1,
            ObjectKind::Comment => metrics.comments_read += 1,
            ObjectKind::File | ObjectKind::PropertyItem => {
                log::debug!("No counter for {} items", kind);
                return;
            }
        }
        metrics.objects_read += 1;
    }

    pub fn increment_request(&self) {
        self.state.lock().metrics.requests_made += 1;
    }

    pub fn increment_error(&self) {
        self.state.lock().metrics.errors_encountered += 1;
    }

    pub fn snapshot(&self) -> SourceMetrics {
        self.state.lock().metrics.clone()
    }

    /// Stamps the end time. Only the first call has an effect.
    pub fn finalize(&self) {
        let mut state = self.state.lock();
        if state.metrics.end_time.is_none() {
            state.metrics.end_time = Some(Utc::now());
            state.metrics.total_duration = Some(state.started.elapsed());
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.state.lock().metrics.end_time.is_some()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MetricsRecorder")
            .field(&self.snapshot())
            .finish()
    }
}
