//! File-level building blocks shared by all format plugins.
//!
//! - [`stream`]: endian-aware readers/writers with one-byte pushback,
//!   length-prefixed strings and 7-bit variable-length integers
//! - [`crc32`]: ISO-HDLC CRC-32
//! - [`wav`]: RIFF/WAVE parsing and emission including sampler chunks
//! - [`sample_data`]: file, ZIP and in-memory sample backings
//! - [`split_stereo`]: channel-configuration detection and recombination
//!   of hard-panned mono pairs into stereo zones

pub mod crc32;
pub mod error;
pub mod sample_data;
pub mod split_stereo;
pub mod stream;
pub mod wav;

pub use error::{FileError, FileResult};
pub use sample_data::{FileSampleData, MemorySampleData, ZipSampleData};
pub use split_stereo::{combine_split_stereo_zones, detect_channel_configuration, ChannelConfiguration};
pub use stream::{StreamReader, StreamWriter};
pub use wav::WavFile;
