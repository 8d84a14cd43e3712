// src/pipeline.rs
//! Source capability trait: the seam between a connector and the pipeline
//! that drains it.

use crate::error::AppError;
use crate::source::{NormalizedItem, ReadRequest, SourceMetrics};
use crate::types::{ObjectKind, PropertyMap};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Static description of a source and its effective configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDescriptor {
    pub source_type: String,
    pub name: String,
    pub properties: PropertyMap<Value>,
}

/// Something that streams normalized items into a pipeline.
pub trait DataSource: Send + Sync {
    fn describe(&self) -> SourceDescriptor;

    fn supports_kind(&self, kind: ObjectKind) -> bool;

    /// Checks a request without starting any work.
    fn validate(&self, request: &ReadRequest) -> Result<(), AppError>;

    /// Starts a read and returns its output immediately.
    ///
    /// The channel closes once every item has been delivered or `cancel`
    /// fires. Only validation failures are returned here; failures while
    /// reading are counted in [`DataSource::metrics`] instead.
    fn read(
        &self,
        cancel: CancellationToken,
        request: ReadRequest,
    ) -> Result<mpsc::Receiver<NormalizedItem>, AppError>;

    fn metrics(&self) -> SourceMetrics;

    /// Finalizes the metrics. Safe to call more than once.
    fn close(&self) -> Result<(), AppError>;
}
