//! Error types for table operations

use std::io;
use thiserror::Error;

/// Table operation result type
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors raised while writing, loading, or querying a table
///
/// A key that is absent from a table is not an error; lookups report it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum TableError {
    /// I/O error while creating, opening, reading, or writing a table file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Footer could not be decoded
    #[error("Footer decode error: {0}")]
    Footer(#[from] binrw::Error),

    /// Footer declares a format version this reader does not understand
    #[error("Unsupported table format version: {0}")]
    UnsupportedVersion(u64),

    /// A length-prefixed field ran past the end of its input
    #[error("Truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Bytes the field declared
        needed: u64,
        /// Bytes actually left in the input
        available: u64,
    },

    /// Varint prefix is unterminated or does not fit in 64 bits
    #[error("Malformed varint at byte {position}")]
    MalformedVarint {
        /// Offset of the first byte of the varint
        position: usize,
    },

    /// Index block or footer is structurally inconsistent
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The table failed to load and cannot answer lookups
    #[error("Table unavailable: {0}")]
    Unavailable(String),

    /// Index loader stopped without publishing a result
    #[error("Index load aborted before completion")]
    LoadAborted,
}

impl TableError {
    /// Check if this error indicates a damaged or foreign table file
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::Footer(_)
                | Self::TruncatedInput { .. }
                | Self::MalformedVarint { .. }
                | Self::CorruptIndex(_)
        )
    }

    /// Check if this error came from the filesystem
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let truncated = TableError::TruncatedInput {
            needed: 10,
            available: 3,
        };
        assert!(truncated.is_corruption());
        assert!(!truncated.is_io());

        let io = TableError::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(io.is_io());
        assert!(!io.is_corruption());

        // Unknown versions are reported apart from corruption
        assert!(!TableError::UnsupportedVersion(3).is_corruption());
    }

    #[test]
    fn test_error_messages() {
        let err = TableError::TruncatedInput {
            needed: 10,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Truncated input: needed 10 bytes, 3 available"
        );
        assert_eq!(
            TableError::UnsupportedVersion(7).to_string(),
            "Unsupported table format version: 7"
        );
    }
}
