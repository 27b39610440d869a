//! Plain WAV trees as a source and destination "format".
//!
//! The detector turns every folder of WAV files into one multisample,
//! pulling the mapping from `smpl`/`inst` chunks and note names in the
//! filenames, pairing hard-panned mono files back into stereo. The
//! creator writes one WAV per zone with both chunks rebuilt, which any
//! other tool can pick up.

mod detector;

pub use detector::{detect_folder, note_from_name, ChannelPatterns};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use moss_core::math::value_to_db;
use moss_core::naming::sanitize_filename;
use moss_core::{MultisampleSource, SampleZone};
use moss_file::wav::{InstrumentChunk, SampleChunk, WavLoop};
use moss_file::sample_data::load_zone_wav;
use walkdir::WalkDir;

use crate::error::FormatResult;
use crate::notify::{Notifier, IDS_NOTIFY_DETECTING, IDS_NOTIFY_SKIPPED, IDS_NOTIFY_STORING};
use crate::plugin::{sub_path_of, CancelFlag, Creator, Detector, SourceConsumers};
use crate::registry::FormatPlugin;
use crate::settings::{split_list, NoSettings, ParameterDescription, Settings};
use crate::FormatError;

/// The registry entry for this format.
pub fn plugin() -> FormatPlugin {
    FormatPlugin::new(
        "samplefile",
        "WAV sample files",
        || Box::new(SampleFileDetector::new()),
        || Box::new(SampleFileCreator::new()),
    )
}

/// Settings of the WAV detector.
#[derive(Debug, Clone, Default)]
pub struct SampleFileSettings {
    patterns: ChannelPatterns,
}

impl Settings for SampleFileSettings {
    fn describe_parameters(&self) -> Vec<ParameterDescription> {
        vec![
            ParameterDescription {
                key: "leftChannels",
                help: "comma separated name endings of left-channel files (default: _L,-L, L,Left)",
                required: false,
            },
            ParameterDescription {
                key: "rightChannels",
                help: "comma separated name endings of right-channel files (default: _R,-R, R,Right)",
                required: false,
            },
        ]
    }

    fn check_settings_cli(&mut self, params: &mut HashMap<String, String>) -> FormatResult<()> {
        if let Some(value) = params.remove("leftChannels") {
            let list = split_list(&value);
            if list.is_empty() {
                return Err(FormatError::settings("leftChannels must not be empty"));
            }
            self.patterns.left = list;
        }
        if let Some(value) = params.remove("rightChannels") {
            let list = split_list(&value);
            if list.is_empty() {
                return Err(FormatError::settings("rightChannels must not be empty"));
            }
            self.patterns.right = list;
        }
        Ok(())
    }
}

/// Detector that groups WAV folders into multisamples.
pub struct SampleFileDetector {
    cancel: CancelFlag,
    settings: SampleFileSettings,
}

impl SampleFileDetector {
    /// Creates a detector.
    pub fn new() -> Self {
        Self {
            cancel: CancelFlag::new(),
            settings: SampleFileSettings::default(),
        }
    }
}

impl Default for SampleFileDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SampleFileDetector {
    fn name(&self) -> &'static str {
        "WAV sample files"
    }

    fn prefix(&self) -> &'static str {
        "samplefile"
    }

    fn settings_mut(&mut self) -> &mut dyn Settings {
        &mut self.settings
    }

    fn detect(
        &self,
        source_folder: &Path,
        consumers: &mut SourceConsumers<'_>,
        _detect_performances: bool,
        notifier: &dyn Notifier,
    ) {
        let mut folders: Vec<PathBuf> = WalkDir::new(source_folder)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.into_path())
            .collect();
        folders.sort();

        for folder in folders {
            if self.cancel.is_cancelled() {
                return;
            }
            let wav_files = match wav_files_in(&folder) {
                Ok(files) => files,
                Err(error) => {
                    let display = folder.display().to_string();
                    let text = error.to_string();
                    notifier.log_error(IDS_NOTIFY_SKIPPED, &[&display, &text]);
                    continue;
                }
            };
            if wav_files.is_empty() {
                continue;
            }
            let display = folder.display().to_string();
            notifier.log(IDS_NOTIFY_DETECTING, &[&display]);

            match detect_folder(&folder, &wav_files, &self.settings.patterns) {
                Ok(mut source) => {
                    source.sub_path = sub_path_of(source_folder, &folder);
                    (consumers.multisample)(source);
                }
                Err(error) => {
                    let text = error.to_string();
                    notifier.log_error(IDS_NOTIFY_SKIPPED, &[&display, &text]);
                }
            }
        }
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

fn wav_files_in(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Creator that writes one WAV per zone with rebuilt sampler chunks.
pub struct SampleFileCreator {
    cancel: CancelFlag,
    settings: NoSettings,
}

impl SampleFileCreator {
    /// Creates a creator.
    pub fn new() -> Self {
        Self {
            cancel: CancelFlag::new(),
            settings: NoSettings,
        }
    }

    fn write_zone(&self, folder: &Path, zone: &SampleZone) -> FormatResult<()> {
        let mut wav = load_zone_wav(zone)?;

        let mut smpl = SampleChunk::new(
            u32::from(zone.effective_key_root()),
            wav.format.sample_rate,
        );
        let cents = zone.tune * 100.0;
        if cents > 0.0 {
            smpl.set_pitch_fraction_cents(cents);
        }
        smpl.loops = zone
            .loops
            .iter()
            .enumerate()
            .map(|(index, lp)| WavLoop::from_model(lp, index as u32))
            .collect();
        wav.sample_chunk = Some(smpl);

        wav.instrument_chunk = Some(InstrumentChunk {
            unshifted_note: zone.effective_key_root(),
            fine_tune: (zone.tune * 100.0).round().clamp(-128.0, 127.0) as i8,
            gain_db: value_to_db(zone.gain).round().clamp(-128.0, 127.0) as i8,
            low_note: zone.key_low,
            high_note: zone.key_high,
            low_velocity: zone.velocity_low,
            high_velocity: zone.velocity_high,
        });

        let path = moss_core::naming::unique_path(
            folder,
            &sanitize_filename(&zone.name),
            "wav",
        );
        wav.write_file(&path)?;
        Ok(())
    }
}

impl Default for SampleFileCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl Creator for SampleFileCreator {
    fn name(&self) -> &'static str {
        "WAV sample files"
    }

    fn prefix(&self) -> &'static str {
        "samplefile"
    }

    fn settings_mut(&mut self) -> &mut dyn Settings {
        &mut self.settings
    }

    fn create_preset(
        &self,
        out_folder: &Path,
        source: &MultisampleSource,
        notifier: &dyn Notifier,
    ) -> FormatResult<()> {
        let folder = out_folder.join(sanitize_filename(&source.name));
        fs::create_dir_all(&folder)?;
        let display = folder.display().to_string();
        notifier.log(IDS_NOTIFY_STORING, &[&display]);

        for group in source.non_empty_groups() {
            for zone in &group.zones {
                if self.cancel.is_cancelled() {
                    return Err(FormatError::Cancelled);
                }
                self.write_zone(&folder, zone)?;
            }
        }
        Ok(())
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    fn clear_cancelled(&self) {
        self.cancel.clear();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NullNotifier;
    use moss_core::{Group, SampleLoop};
    use moss_file::wav::{FormatChunk, WavFile};
    use moss_file::MemorySampleData;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn write_test_wav(path: &Path, unity_note: Option<u32>) {
        let mut wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![0u8; 400]);
        if let Some(note) = unity_note {
            wav.sample_chunk = Some(SampleChunk::new(note, 44_100));
        }
        wav.write_file(path).unwrap();
    }

    #[test]
    fn test_detect_folder_builds_key_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Piano");
        fs::create_dir_all(&folder).unwrap();
        write_test_wav(&folder.join("Piano C2.wav"), None);
        write_test_wav(&folder.join("Piano C3.wav"), None);
        write_test_wav(&folder.join("Piano C4.wav"), None);

        let files = wav_files_in(&folder).unwrap();
        let source = detect_folder(&folder, &files, &ChannelPatterns::default()).unwrap();

        assert_eq!(source.name, "Piano");
        let zones = &source.groups[0].zones;
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].key_root, Some(48));
        assert_eq!((zones[0].key_low, zones[0].key_high), (0, 48));
        assert_eq!((zones[1].key_low, zones[1].key_high), (49, 60));
        assert_eq!((zones[2].key_low, zones[2].key_high), (61, 127));
        assert_eq!(zones[0].stop, 200);
    }

    #[test]
    fn test_detect_folder_reads_smpl_note() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Bass");
        fs::create_dir_all(&folder).unwrap();
        write_test_wav(&folder.join("Bass.wav"), Some(36));

        let files = wav_files_in(&folder).unwrap();
        let source = detect_folder(&folder, &files, &ChannelPatterns::default()).unwrap();
        assert_eq!(source.groups[0].zones[0].key_root, Some(36));
    }

    #[test]
    fn test_detect_folder_combines_split_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Keys");
        fs::create_dir_all(&folder).unwrap();
        write_test_wav(&folder.join("Keys C3_L.wav"), Some(60));
        write_test_wav(&folder.join("Keys C3_R.wav"), Some(60));

        let files = wav_files_in(&folder).unwrap();
        let source = detect_folder(&folder, &files, &ChannelPatterns::default()).unwrap();

        let zones = &source.groups[0].zones;
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].panorama, 0.0);
        let metadata = zones[0].sample_data.as_ref().unwrap().audio_metadata().unwrap();
        assert_eq!(metadata.channels, 2);
    }

    #[test]
    fn test_creator_rebuilds_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![0u8; 400]);
        let mut zone = moss_core::SampleZone::new("Lead G2");
        zone.key_root = Some(55);
        zone.key_low = 50;
        zone.key_high = 60;
        zone.stop = 200;
        zone.loops.push(SampleLoop::forwards(10, 190));
        zone.sample_data = Some(Arc::new(MemorySampleData::new(wav)));

        let mut group = Group::new("G");
        group.zones.push(zone);
        let mut source = MultisampleSource::new("/tmp/x", "Lead");
        source.groups.push(group);

        let creator = SampleFileCreator::new();
        creator
            .create_preset(dir.path(), &source, &NullNotifier)
            .unwrap();

        let written = WavFile::read(&dir.path().join("Lead/Lead G2.wav")).unwrap();
        let smpl = written.sample_chunk.unwrap();
        assert_eq!(smpl.midi_unity_note, 55);
        assert_eq!(smpl.loops.len(), 1);
        assert_eq!((smpl.loops[0].start, smpl.loops[0].end), (10, 190));
        let inst = written.instrument_chunk.unwrap();
        assert_eq!(inst.unshifted_note, 55);
        assert_eq!((inst.low_note, inst.high_note), (50, 60));
    }
}
