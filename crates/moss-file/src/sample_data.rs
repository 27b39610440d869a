//! Physical sample-data backings.
//!
//! All backings open their underlying file or archive freshly per call
//! and release it on every exit path; no handles are retained between
//! calls.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use moss_core::{AudioMetadata, SampleData, SampleError};

use crate::error::FileError;
use crate::wav::WavFile;

type SampleResult<T> = Result<T, SampleError>;

/// Sample audio stored in a WAV file on disk.
#[derive(Debug, Clone)]
pub struct FileSampleData {
    path: PathBuf,
}

impl FileSampleData {
    /// Creates a backing for the given WAV file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> SampleResult<File> {
        if !self.path.is_file() {
            return Err(SampleError::NotFound(self.path.clone()));
        }
        Ok(File::open(&self.path)?)
    }
}

impl SampleData for FileSampleData {
    fn audio_metadata(&self) -> SampleResult<AudioMetadata> {
        let wav = WavFile::read(&self.path).map_err(SampleError::from)?;
        Ok(wav.audio_metadata())
    }

    fn write_sample(&self, out: &mut dyn Write) -> SampleResult<()> {
        let mut file = self.open()?;
        std::io::copy(&mut file, out)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Sample audio stored as a WAV entry inside a ZIP archive.
///
/// Only the archive path and the entry name are kept; each access opens
/// a fresh reader.
#[derive(Debug, Clone)]
pub struct ZipSampleData {
    archive_path: PathBuf,
    entry_name: String,
}

impl ZipSampleData {
    /// Creates a backing for an entry of a ZIP archive.
    pub fn new(archive_path: impl Into<PathBuf>, entry_name: impl Into<String>) -> Self {
        Self {
            archive_path: archive_path.into(),
            entry_name: entry_name.into(),
        }
    }

    fn read_entry(&self) -> SampleResult<Vec<u8>> {
        if !self.archive_path.is_file() {
            return Err(SampleError::NotFound(self.archive_path.clone()));
        }
        let file = File::open(&self.archive_path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| SampleError::malformed(format!("cannot open archive: {e}")))?;
        let mut entry = archive.by_name(&self.entry_name).map_err(|e| {
            SampleError::malformed(format!("missing entry {}: {e}", self.entry_name))
        })?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl SampleData for ZipSampleData {
    fn audio_metadata(&self) -> SampleResult<AudioMetadata> {
        let bytes = self.read_entry()?;
        let wav = WavFile::parse(bytes.as_slice()).map_err(SampleError::from)?;
        Ok(wav.audio_metadata())
    }

    fn write_sample(&self, out: &mut dyn Write) -> SampleResult<()> {
        let bytes = self.read_entry()?;
        out.write_all(&bytes)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}!{}", self.archive_path.display(), self.entry_name)
    }
}

/// Sample audio held in memory as a parsed WAV.
#[derive(Debug, Clone)]
pub struct MemorySampleData {
    wav: WavFile,
}

impl MemorySampleData {
    /// Wraps a parsed WAV.
    pub fn new(wav: WavFile) -> Self {
        Self { wav }
    }

    /// The wrapped WAV.
    pub fn wav(&self) -> &WavFile {
        &self.wav
    }
}

impl SampleData for MemorySampleData {
    fn audio_metadata(&self) -> SampleResult<AudioMetadata> {
        Ok(self.wav.audio_metadata())
    }

    fn write_sample(&self, out: &mut dyn Write) -> SampleResult<()> {
        self.wav.write(out).map_err(SampleError::from)
    }

    fn describe(&self) -> String {
        "in-memory sample".to_string()
    }
}

/// Reads a zone's sample bytes into a parsed WAV.
pub fn load_zone_wav(zone: &moss_core::SampleZone) -> Result<WavFile, FileError> {
    let data = zone
        .sample_data
        .as_ref()
        .ok_or_else(|| FileError::format(format!("zone {} has no sample data", zone.name)))?;
    let mut bytes = Vec::new();
    data.write_sample(&mut bytes)?;
    WavFile::parse(bytes.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::FormatChunk;

    fn test_wav() -> WavFile {
        WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![0u8; 200])
    }

    #[test]
    fn test_memory_backing_round_trip() {
        let data = MemorySampleData::new(test_wav());
        let metadata = data.audio_metadata().unwrap();
        assert_eq!(metadata.channels, 1);
        assert_eq!(metadata.frame_count, 100);

        let mut bytes = Vec::new();
        data.write_sample(&mut bytes).unwrap();
        let parsed = WavFile::parse(bytes.as_slice()).unwrap();
        assert_eq!(parsed.frame_count(), 100);
    }

    #[test]
    fn test_file_backing_reads_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.wav");
        test_wav().write_file(&path).unwrap();

        let data = FileSampleData::new(&path);
        assert_eq!(data.audio_metadata().unwrap().sample_rate, 44_100);

        let mut bytes = Vec::new();
        data.write_sample(&mut bytes).unwrap();
        assert_eq!(WavFile::parse(bytes.as_slice()).unwrap().frame_count(), 100);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let data = FileSampleData::new("/does/not/exist.wav");
        assert!(matches!(
            data.audio_metadata(),
            Err(SampleError::NotFound(_))
        ));
    }

    #[test]
    fn test_zip_backing() {
        use std::io::Write as _;
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("bank.zip");
        let wav_bytes = test_wav().to_bytes().unwrap();

        let file = File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("samples/s.wav", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&wav_bytes).unwrap();
        writer.finish().unwrap();

        let data = ZipSampleData::new(&archive_path, "samples/s.wav");
        assert_eq!(data.audio_metadata().unwrap().frame_count, 100);

        let mut bytes = Vec::new();
        data.write_sample(&mut bytes).unwrap();
        assert_eq!(bytes, wav_bytes);
    }
}
