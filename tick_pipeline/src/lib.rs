//! Ordered, deduplicating, batching ingestion of market updates.
//!
//! Data flows leaves first:
//! - `decoder` — raw record plus trading date to `MarketUpdate`.
//! - `gate` — `MonotonicGate`, drops updates that do not advance the stream.
//! - `writer` — `BatchWriter`, one worker fed over a rendezvous channel that
//!   flushes every 50 updates and on close.
//! - `point` / `store` — write-batch format and the destination (`InfluxStore`).
//! - `pipeline` — `Pipeline`, the per-run session tying the stages together.
#![warn(missing_docs)]
pub mod decoder;
pub mod gate;
pub mod pipeline;
pub mod point;
pub mod store;
pub mod writer;

pub use gate::MonotonicGate;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary, Step};
pub use point::{Point, WriteBatch};
pub use store::{BatchStore, InfluxStore};
pub use writer::{BATCH_SIZE, BatchWriter, WriterSummary};
