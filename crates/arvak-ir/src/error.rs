//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur when building IR values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A measurement key name or path component is not acceptable.
    #[error("Invalid measurement key '{key}': {reason}")]
    InvalidKey {
        /// The offending key text.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// A qudit must have at least two levels.
    #[error("Invalid qid dimension {dimension} for index {index}: must be at least 2")]
    InvalidDimension {
        /// Index of the qid.
        index: u32,
        /// The rejected dimension.
        dimension: u32,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
