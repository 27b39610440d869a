//! RIFF/WAVE files with sampler chunks.
//!
//! Beyond `fmt ` and `data`, the sampler-related chunks (`smpl`, `inst`,
//! `cue `), the INFO list and the broadcast extension are decoded into
//! typed values; everything else is preserved byte for byte and re-emitted
//! on write.

mod chunks;
mod format;
mod reader;
mod writer;

pub use chunks::{
    BroadcastChunk, CuePoint, InfoEntry, InstrumentChunk, RawChunk, SampleChunk, WavLoop,
};
pub use format::{FormatChunk, FORMAT_EXTENSIBLE, FORMAT_IEEE_FLOAT, FORMAT_PCM};

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use moss_core::AudioMetadata;

use crate::error::{FileError, FileResult};

/// A parsed WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct WavFile {
    /// Format parameters.
    pub format: FormatChunk,
    /// Raw PCM payload of the `data` chunk.
    pub data: Vec<u8>,
    /// Sampler chunk, if present.
    pub sample_chunk: Option<SampleChunk>,
    /// Instrument chunk, if present.
    pub instrument_chunk: Option<InstrumentChunk>,
    /// Broadcast chunk, if present.
    pub broadcast_chunk: Option<BroadcastChunk>,
    /// Cue points.
    pub cue_points: Vec<CuePoint>,
    /// LIST/INFO entries.
    pub info_entries: Vec<InfoEntry>,
    /// Chunks we do not interpret, preserved byte for byte.
    pub unknown_chunks: Vec<RawChunk>,
}

impl WavFile {
    /// Creates a WAV from format parameters and raw PCM bytes.
    pub fn from_pcm(format: FormatChunk, data: Vec<u8>) -> Self {
        Self {
            format,
            data,
            sample_chunk: None,
            instrument_chunk: None,
            broadcast_chunk: None,
            cue_points: Vec::new(),
            info_entries: Vec::new(),
            unknown_chunks: Vec::new(),
        }
    }

    /// Parses a WAV from any reader.
    pub fn parse<R: Read>(input: R) -> FileResult<Self> {
        reader::parse(input)
    }

    /// Reads a WAV file from disk.
    pub fn read(path: &Path) -> FileResult<Self> {
        if !path.is_file() {
            return Err(FileError::NotFound(path.to_path_buf()));
        }
        Self::parse(BufReader::new(File::open(path)?))
    }

    /// Writes the WAV to any writer.
    pub fn write<W: Write>(&self, out: W) -> FileResult<()> {
        writer::write(self, out)
    }

    /// Writes the WAV to disk.
    pub fn write_file(&self, path: &Path) -> FileResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(&mut out)?;
        Ok(out.flush()?)
    }

    /// Serializes the WAV into a byte vector.
    pub fn to_bytes(&self) -> FileResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(44 + self.data.len());
        self.write(&mut bytes)?;
        Ok(bytes)
    }

    /// The number of sample frames in the data chunk.
    pub fn frame_count(&self) -> u64 {
        if self.format.block_align == 0 {
            return 0;
        }
        self.data.len() as u64 / u64::from(self.format.block_align)
    }

    /// The audio properties of this file.
    pub fn audio_metadata(&self) -> AudioMetadata {
        AudioMetadata {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: self.format.bits_per_sample,
            frame_count: self.frame_count(),
        }
    }

    /// Looks up an INFO entry by id.
    pub fn info_text(&self, id: &[u8; 4]) -> Option<&str> {
        self.info_entries
            .iter()
            .find(|e| &e.id == id)
            .map(|e| e.text.as_str())
    }

    /// Combines two mono files into one interleaved stereo file.
    ///
    /// Both inputs must be mono with identical sample rate, bit depth,
    /// frame count and loop list; anything else fails with
    /// [`FileError::CombinationNotPossible`]. Sampler and instrument
    /// chunks are taken from the left file.
    pub fn combine(left: &WavFile, right: &WavFile) -> FileResult<WavFile> {
        if left.format.channels != 1 || right.format.channels != 1 {
            return Err(FileError::combination("both files must be mono"));
        }
        if left.format.sample_rate != right.format.sample_rate {
            return Err(FileError::combination(format!(
                "sample rates differ: {} vs {}",
                left.format.sample_rate, right.format.sample_rate
            )));
        }
        if left.format.bits_per_sample != right.format.bits_per_sample {
            return Err(FileError::combination(format!(
                "bit depths differ: {} vs {}",
                left.format.bits_per_sample, right.format.bits_per_sample
            )));
        }
        if left.frame_count() != right.frame_count() {
            return Err(FileError::combination(format!(
                "frame counts differ: {} vs {}",
                left.frame_count(),
                right.frame_count()
            )));
        }
        let left_loops = left.sample_chunk.as_ref().map(|s| &s.loops);
        let right_loops = right.sample_chunk.as_ref().map(|s| &s.loops);
        let loops_match = match (left_loops, right_loops) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| {
                        x.loop_type == y.loop_type && x.start == y.start && x.end == y.end
                    })
            }
            _ => false,
        };
        if !loops_match {
            return Err(FileError::combination("loop lists differ"));
        }

        let width = usize::from(left.format.block_align);
        let mut data = Vec::with_capacity(left.data.len() + right.data.len());
        for frame in 0..left.frame_count() as usize {
            let offset = frame * width;
            data.extend_from_slice(&left.data[offset..offset + width]);
            data.extend_from_slice(&right.data[offset..offset + width]);
        }

        let mut format = left.format.clone();
        format.channels = 2;
        format.block_align = left.format.block_align * 2;
        format.avg_bytes_per_sec = format.sample_rate * u32::from(format.block_align);

        Ok(WavFile {
            format,
            data,
            sample_chunk: left.sample_chunk.clone(),
            instrument_chunk: left.instrument_chunk,
            broadcast_chunk: None,
            cue_points: Vec::new(),
            info_entries: Vec::new(),
            unknown_chunks: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mono_wav(frames: u16) -> WavFile {
        let data: Vec<u8> = (0..frames).flat_map(|i| i.to_le_bytes()).collect();
        WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), data)
    }

    #[test]
    fn test_round_trip_plain() {
        let wav = mono_wav(100);
        let bytes = wav.to_bytes().unwrap();
        let parsed = WavFile::parse(bytes.as_slice()).unwrap();
        assert_eq!(parsed, wav);
        assert_eq!(parsed.frame_count(), 100);
    }

    #[test]
    fn test_round_trip_with_sampler_chunks() {
        let mut wav = mono_wav(1000);
        let mut smpl = SampleChunk::new(60, 44_100);
        smpl.loops.push(WavLoop {
            identifier: 0,
            loop_type: 0,
            start: 100,
            end: 900,
            fraction: 0,
            play_count: 0,
        });
        wav.sample_chunk = Some(smpl);
        wav.instrument_chunk = Some(InstrumentChunk::full_range(60));
        wav.info_entries.push(InfoEntry {
            id: *b"INAM",
            text: "Test Sample".into(),
        });

        let bytes = wav.to_bytes().unwrap();
        let parsed = WavFile::parse(bytes.as_slice()).unwrap();
        assert_eq!(parsed.sample_chunk, wav.sample_chunk);
        assert_eq!(parsed.instrument_chunk, wav.instrument_chunk);
        assert_eq!(parsed.info_text(b"INAM"), Some("Test Sample"));
    }

    #[test]
    fn test_unknown_chunks_survive_round_trip() {
        let mut wav = mono_wav(10);
        wav.unknown_chunks.push(RawChunk {
            id: *b"junk",
            data: vec![1, 2, 3],
        });
        let bytes = wav.to_bytes().unwrap();
        let parsed = WavFile::parse(bytes.as_slice()).unwrap();
        assert_eq!(parsed.unknown_chunks, wav.unknown_chunks);
    }

    #[test]
    fn test_odd_chunk_sizes_are_padded() {
        let mut wav = mono_wav(10);
        wav.unknown_chunks.push(RawChunk {
            id: *b"oddc",
            data: vec![9; 3],
        });
        let bytes = wav.to_bytes().unwrap();
        // Everything after an odd chunk still parses, so the pad byte was
        // emitted and skipped consistently.
        let parsed = WavFile::parse(bytes.as_slice()).unwrap();
        assert_eq!(parsed.frame_count(), 10);
        assert_eq!(parsed.unknown_chunks[0].data, vec![9; 3]);
    }

    #[test]
    fn test_combine_interleaves_frames() {
        let left = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![1, 0, 2, 0]);
        let right = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![3, 0, 4, 0]);
        let stereo = WavFile::combine(&left, &right).unwrap();
        assert_eq!(stereo.format.channels, 2);
        assert_eq!(stereo.data, vec![1, 0, 3, 0, 2, 0, 4, 0]);
        assert_eq!(stereo.frame_count(), 2);
    }

    #[test]
    fn test_combine_rejects_mismatched_inputs() {
        let left = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![0; 4]);
        let mut right = WavFile::from_pcm(FormatChunk::pcm(1, 48_000, 16), vec![0; 4]);
        assert!(matches!(
            WavFile::combine(&left, &right),
            Err(FileError::CombinationNotPossible(_))
        ));

        right.format.sample_rate = 44_100;
        right.data = vec![0; 6];
        assert!(matches!(
            WavFile::combine(&left, &right),
            Err(FileError::CombinationNotPossible(_))
        ));

        let stereo = WavFile::from_pcm(FormatChunk::pcm(2, 44_100, 16), vec![0; 8]);
        assert!(matches!(
            WavFile::combine(&stereo, &left),
            Err(FileError::CombinationNotPossible(_))
        ));
    }

    #[test]
    fn test_combine_requires_equal_loops() {
        let mut left = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![0; 8]);
        let mut right = left.clone();
        let mut smpl = SampleChunk::new(60, 44_100);
        smpl.loops.push(WavLoop {
            identifier: 0,
            loop_type: 0,
            start: 0,
            end: 3,
            fraction: 0,
            play_count: 0,
        });
        left.sample_chunk = Some(smpl.clone());
        assert!(WavFile::combine(&left, &right).is_err());

        right.sample_chunk = Some(smpl);
        assert!(WavFile::combine(&left, &right).is_ok());
    }
}
