//! Error types for pipeline configuration.

use thiserror::Error;

/// Result type for pipeline configuration.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while setting up a conversion run.
///
/// Conversion itself reports through the notifier and never surfaces an
/// error past the pipeline boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A rename CSV line did not have exactly two fields.
    #[error("rename table line {line}: expected exactly two comma separated fields")]
    RenameSyntax {
        /// 1-based line number.
        line: usize,
    },

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
