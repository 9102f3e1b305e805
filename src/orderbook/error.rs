//! Order book error types

use std::fmt;

/// Errors that can occur within the order book layer.
///
/// Domain-level misses (unknown id, empty side) are not errors: the book
/// primitives report them through `Option` returns. This type covers the
/// snapshot serialization surface, where failures are real errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// Error while serializing snapshot data
    SerializationError {
        /// Underlying error message
        message: String,
    },

    /// Error while deserializing snapshot data
    DeserializationError {
        /// Underlying error message
        message: String,
    },

    /// Snapshot integrity check failed
    ChecksumMismatch {
        /// Expected checksum value
        expected: String,
        /// Actual checksum value
        actual: String,
    },

    /// Snapshot carries an unsupported format version
    UnsupportedVersion {
        /// Version found in the package
        found: u32,
        /// Version this build understands
        supported: u32,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::SerializationError { message } => {
                write!(f, "Serialization error: {message}")
            }
            OrderBookError::DeserializationError { message } => {
                write!(f, "Deserialization error: {message}")
            }
            OrderBookError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "Checksum mismatch: expected {expected}, but computed {actual}"
                )
            }
            OrderBookError::UnsupportedVersion { found, supported } => {
                write!(
                    f,
                    "Unsupported snapshot version: found {found}, supported {supported}"
                )
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
