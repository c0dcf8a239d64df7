//! Error types shared between the pipeline and the loader.
//!
//! `DecodeError` describes why a single record was skipped and never stops a
//! run. `IngestError` unifies the failures that end a run: I/O, connection
//! and write failures, and a stopped writer worker.
use std::io;

use thiserror::Error;

use crate::update::{Field, StampPart};

/// Layout of the time-of-day field.
pub const STAMP_FORMAT: &str = "HH:MM:SS.XXXXXX";

/// Why one record could not be turned into a `MarketUpdate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The record does not have exactly 8 fields.
    #[error("must have 8 fields, found {0}")]
    WrongArity(usize),

    /// The time-of-day field is shorter than `HH:MM:SS.XXXXXX`.
    #[error("timestamp too short, should be {fmt}", fmt = STAMP_FORMAT)]
    TimestampTooShort,

    /// A component of the time of day is not made of digits.
    #[error("cannot parse {0} in {fmt}", fmt = STAMP_FORMAT)]
    Timestamp(StampPart),

    /// Expected `:` or `.` at the given byte offset of the time of day.
    #[error("expected '{expected}' at offset {offset} in {fmt}", fmt = STAMP_FORMAT)]
    TimestampSeparator {
        /// Separator that should have been there.
        expected: char,
        /// Byte offset in the field.
        offset: usize,
    },

    /// Digits parsed but do not form a valid time of day (e.g. hour 25).
    #[error("time of day out of range: {0}")]
    TimeOutOfRange(String),

    /// The wall-clock time does not exist in the local time zone.
    #[error("local time {0} does not exist")]
    NonexistentLocalTime(String),

    /// A price or size field did not parse.
    #[error("cannot parse {0} (field {column})", column = .0.column())]
    Field(Field),
}

/// Unified error type for a pipeline run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// I/O error originating from the standard library or input files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file name does not follow `TICKER_YYYY-MM-DD.csv[.gz]`.
    #[error("filename must be of format CSGN_2010-12-16.csv[.gz]: {0}")]
    Filename(String),

    /// Handshake with the destination store failed.
    #[error("Cannot connect to {host}: {reason}")]
    Connect {
        /// Destination `host:port`.
        host: String,
        /// What went wrong.
        reason: String,
    },

    /// A batch write was refused or failed; fatal for the run.
    #[error("Cannot write batch of {count} to {measurement}: {reason}")]
    Write {
        /// Series the batch was tagged with.
        measurement: String,
        /// Number of updates lost with the batch.
        count: usize,
        /// What went wrong.
        reason: String,
    },

    /// Hand-off to the writer failed (worker gone); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Completion signal from the writer was lost; contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// The writer worker thread panicked.
    #[error("Writer worker panicked: {0}")]
    WorkerPanicked(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),
}
