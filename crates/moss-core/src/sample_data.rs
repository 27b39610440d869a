//! Audio-data abstraction shared by all physical backings.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// Result type for sample-data operations.
pub type SampleResult<T> = Result<T, SampleError>;

/// Errors raised while accessing sample audio data.
#[derive(Debug, Error)]
pub enum SampleError {
    /// A referenced sample file does not exist.
    #[error("sample file not found: {0}")]
    NotFound(PathBuf),

    /// The backing bytes are not a readable audio file.
    #[error("malformed sample data: {0}")]
    Malformed(String),

    /// The audio uses a compression scheme we cannot decode.
    #[error("unsupported compression format: 0x{format_tag:04X}")]
    CompressionNotSupported {
        /// The WAV format tag that was encountered.
        format_tag: u16,
    },

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SampleError {
    /// Creates a malformed-data error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Descriptive properties of a sample's audio content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioMetadata {
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Number of sample frames.
    pub frame_count: u64,
}

impl AudioMetadata {
    /// Returns true if the audio is a single channel.
    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }
}

/// Handle to the audio bytes behind a zone.
///
/// Multiple zones may alias the same backing; implementations therefore
/// take `&self` and open any underlying file or archive freshly per call,
/// never retaining handles across calls.
pub trait SampleData: Send + Sync {
    /// Reads the audio properties of the backing data.
    fn audio_metadata(&self) -> SampleResult<AudioMetadata>;

    /// Streams the sample as a well-formed WAV file to `out`.
    fn write_sample(&self, out: &mut dyn Write) -> SampleResult<()>;

    /// A short description of the backing, used in error reports.
    fn describe(&self) -> String;
}

/// Shared, reference-counted sample-data handle.
pub type SampleDataRef = Arc<dyn SampleData>;
