//! Error types for file parsing and emission.

use std::path::PathBuf;

use moss_core::SampleError;
use thiserror::Error;

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

/// Errors that can occur while reading or writing files.
#[derive(Debug, Error)]
pub enum FileError {
    /// Structural violation in a source file: bad tag, bad length, or an
    /// unexpected ID where none is allowed.
    #[error("format error: {0}")]
    Format(String),

    /// The WAV uses a compression scheme other than PCM or IEEE float.
    #[error("unsupported compression format: 0x{format_tag:04X}")]
    CompressionNotSupported {
        /// The WAV format tag that was encountered.
        format_tag: u16,
    },

    /// The split-stereo pairing preconditions failed.
    #[error("cannot combine into stereo: {0}")]
    CombinationNotPossible(String),

    /// A referenced file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Underlying filesystem or archive error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FileError {
    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Creates a combination error.
    pub fn combination(message: impl Into<String>) -> Self {
        Self::CombinationNotPossible(message.into())
    }
}

impl From<FileError> for SampleError {
    fn from(error: FileError) -> Self {
        match error {
            FileError::NotFound(path) => SampleError::NotFound(path),
            FileError::CompressionNotSupported { format_tag } => {
                SampleError::CompressionNotSupported { format_tag }
            }
            FileError::Io(e) => SampleError::Io(e),
            other => SampleError::Malformed(other.to_string()),
        }
    }
}

impl From<SampleError> for FileError {
    fn from(error: SampleError) -> Self {
        match error {
            SampleError::NotFound(path) => FileError::NotFound(path),
            SampleError::CompressionNotSupported { format_tag } => {
                FileError::CompressionNotSupported { format_tag }
            }
            SampleError::Io(e) => FileError::Io(e),
            other => FileError::Format(other.to_string()),
        }
    }
}
