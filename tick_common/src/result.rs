//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `IngestError`, so functions can simply return `Result<T>`.
use crate::error::IngestError;

/// Workspace-wide `Result` alias with `IngestError` as the default error.
pub type Result<T, E = IngestError> = std::result::Result<T, E>;
