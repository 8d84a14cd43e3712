// src/source/mod.rs
//! The Notion source connector: validates a read request, fans the work out
//! over concurrent tasks and streams decoded items back.

mod coordinator;
mod decoder;
mod gate;
mod item;
mod metrics;
mod request;

pub use coordinator::NotionSource;
pub use decoder::{NotionRecordDecoder, Record, RecordDecoder};
pub use gate::{ConcurrencyGate, GatePermit};
pub use item::{ItemMetadata, NormalizedItem, ProcessingPhase, ProcessingState, ProcessingStatus};
pub use metrics::{MetricsRecorder, SourceMetrics};
pub use request::{ReadFilters, ReadRequest, ReadTuning};
