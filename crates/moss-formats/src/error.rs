//! Error types for format detection and creation.

use moss_core::SampleError;
use moss_file::FileError;
use thiserror::Error;

/// Result type for format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors that can occur in a detector or creator.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Structural violation in a source file.
    #[error("format error: {0}")]
    Malformed(String),

    /// The format has no performance representation.
    #[error("the {0} format does not support performances")]
    PerformanceNotSupported(&'static str),

    /// Error from the file layer.
    #[error(transparent)]
    File(#[from] FileError),

    /// Error while accessing sample data.
    #[error(transparent)]
    Sample(#[from] SampleError),

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required CLI setting is missing or has an invalid value.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// The cancellation flag was observed.
    #[error("operation cancelled")]
    Cancelled,
}

impl FormatError {
    /// Creates a malformed-file error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Creates a settings error.
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }
}
