//!
//! Common types and utilities shared by the tick pipeline and its loader.
//!
//! This crate aggregates:
//! - `error` — `DecodeError` for single records and the run-wide `IngestError`.
//! - `result` — handy `Result<T, IngestError>` alias.
//! - `update` — `MarketUpdate`, `PriceSize` and the named row fields.
//! - `record` — raw delimited records as produced by a record source.
//! - `net` — destination defaults.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod update;
pub mod record;
pub mod net;

pub use error::{DecodeError, IngestError};
pub use record::Record;
pub use result::Result;
pub use update::{Field, FieldValue, MarketUpdate, PriceSize, StampPart};
