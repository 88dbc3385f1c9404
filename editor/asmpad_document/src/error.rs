//! Error type for document operations.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a document operation.
///
/// A read failure leaves the buffer untouched; a write failure never alters
/// the buffer. No variant is fatal to the host — every operation returns
/// control to the caller with a descriptive result.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be read (missing, permission denied, not UTF-8).
    #[error("cannot read '{}': {}", path.display(), source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written (permission denied, disk full).
    #[error("cannot write '{}': {}", path.display(), source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `save` was called on a document that has never been saved.
    #[error("document has no file path yet; use save_as")]
    NoPath,

    /// A line operation addressed a line that does not exist.
    #[error("line {line} is out of range (buffer has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },
}
