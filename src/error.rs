//! Structured error types for xlwrite.
//!
//! One enum covers the whole crate: construction errors (bad arguments caught
//! at the violating call), protocol violations (bugs in the calling layout
//! code), occupancy conflicts, and pass-through errors from the XML/ZIP/IO
//! stack underneath.

/// All errors that can occur while composing and writing a workbook.
#[derive(Debug, thiserror::Error)]
pub enum XlwriteError {
    /// An argument violated a domain invariant (degenerate size, negative
    /// reduction offset, empty sheet name, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The window protocol was violated: writing into an empty viewport,
    /// releasing a reduction out of LIFO order, flushing with a non-empty
    /// reduction stack, or reusing a completed window. Not recoverable.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// A `place`/`merge` targeted cells that are already occupied.
    ///
    /// Carries the address of the offending cell or rectangle. Callers may
    /// treat this as fatal (most do) or retry with an adjusted layout.
    #[error("Cell conflict at {0}")]
    Conflict(String),

    /// Invalid cell reference text.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// XML writing error from quick-xml.
    #[error("XML writing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlwriteError>;
