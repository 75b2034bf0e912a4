//! Typed errors raised by the schema model and the variant pipeline.
//!
//! I/O and orchestration code wraps these in `anyhow` with context, the same
//! way file and parse failures are reported elsewhere in the crate.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// A variant handed to the flattener still contains a union node. Variant
    /// discovery only ever emits union-free schemas, so this aborts the run.
    #[error("Union node found in concrete variant {signature}")]
    UnionInVariant { signature: String },

    #[error("Invalid schema at {location}: {message}")]
    InvalidSchema { location: String, message: String },
}

impl ShapeError {
    pub(crate) fn invalid_schema(location: impl Into<String>, message: impl Into<String>) -> Self {
        ShapeError::InvalidSchema {
            location: location.into(),
            message: message.into(),
        }
    }
}
