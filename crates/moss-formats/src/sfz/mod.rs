//! The SFZ text format.
//!
//! SFZ is the lingua franca of sampler presets: plain text opcodes in a
//! control/global/master/group/region hierarchy next to a folder of WAV
//! files.

mod opcodes;
mod reader;
mod writer;

pub use reader::read_sfz;
pub use writer::write_sfz;

use std::fs;
use std::path::Path;

use moss_core::naming::{sanitize_filename, unique_path};
use moss_core::MultisampleSource;

use crate::error::FormatResult;
use crate::notify::{Notifier, IDS_NOTIFY_DETECTING, IDS_NOTIFY_STORING};
use crate::plugin::{
    sub_path_of, walk_source_files, write_zone_sample, CancelFlag, Creator, Detector,
    SourceConsumers,
};
use crate::registry::FormatPlugin;
use crate::settings::{NoSettings, Settings};
use crate::FormatError;

/// The registry entry for this format.
pub fn plugin() -> FormatPlugin {
    FormatPlugin::new(
        "sfz",
        "SFZ",
        || Box::new(SfzDetector::new()),
        || Box::new(SfzCreator::new()),
    )
}

/// Detector for `.sfz` files.
pub struct SfzDetector {
    cancel: CancelFlag,
    settings: NoSettings,
}

impl SfzDetector {
    /// Creates a detector.
    pub fn new() -> Self {
        Self {
            cancel: CancelFlag::new(),
            settings: NoSettings,
        }
    }

    fn detect_file(&self, path: &Path, root: &Path) -> FormatResult<MultisampleSource> {
        let text = fs::read_to_string(path)?;
        let folder = path.parent().unwrap_or(root);
        let groups = read_sfz(&text, folder)?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut source = MultisampleSource::new(path, stem);
        source.sub_path = sub_path_of(root, path);
        source.groups = groups;
        Ok(source)
    }
}

impl Default for SfzDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SfzDetector {
    fn name(&self) -> &'static str {
        "SFZ"
    }

    fn prefix(&self) -> &'static str {
        "sfz"
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
        walk_source_files(source_folder, &[".sfz"], &self.cancel, notifier, |path| {
            let display = path.display().to_string();
            notifier.log(IDS_NOTIFY_DETECTING, &[&display]);
            let source = self.detect_file(path, source_folder)?;
            (consumers.multisample)(source);
            Ok(())
        });
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Creator for `.sfz` files.
pub struct SfzCreator {
    cancel: CancelFlag,
    settings: NoSettings,
}

impl SfzCreator {
    /// Creates a creator.
    pub fn new() -> Self {
        Self {
            cancel: CancelFlag::new(),
            settings: NoSettings,
        }
    }
}

impl Default for SfzCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl Creator for SfzCreator {
    fn name(&self) -> &'static str {
        "SFZ"
    }

    fn prefix(&self) -> &'static str {
        "sfz"
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
        if self.cancel.is_cancelled() {
            return Err(FormatError::Cancelled);
        }
        fs::create_dir_all(out_folder)?;
        let base_name = sanitize_filename(&source.name);
        let samples_folder_name = format!("{base_name} Samples");
        let samples_folder = out_folder.join(&samples_folder_name);
        fs::create_dir_all(&samples_folder)?;

        let path = unique_path(out_folder, &base_name, "sfz");
        let display = path.display().to_string();
        notifier.log(IDS_NOTIFY_STORING, &[&display]);

        let text = write_sfz(source, &samples_folder_name);
        fs::write(&path, text)?;

        for group in source.non_empty_groups() {
            for zone in &group.zones {
                if self.cancel.is_cancelled() {
                    return Err(FormatError::Cancelled);
                }
                write_zone_sample(&samples_folder, zone)?;
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
    use moss_core::{Envelope, Group, SampleLoop, SampleZone, Trigger};
    use moss_file::wav::{FormatChunk, WavFile};
    use moss_file::MemorySampleData;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn source_with_zone() -> MultisampleSource {
        let wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![0u8; 2000]);
        let mut zone = SampleZone::new("Piano C3");
        zone.key_low = 48;
        zone.key_high = 72;
        zone.key_root = Some(60);
        zone.stop = 1000;
        zone.gain = 0.5;
        zone.panorama = -0.25;
        zone.tune = 0.05;
        zone.loops.push(SampleLoop::forwards(100, 900));
        zone.amplitude_envelope.envelope = Envelope {
            attack_time: Some(0.01),
            release_time: Some(0.7),
            sustain_level: Some(1.0),
            ..Envelope::default()
        };
        zone.sample_data = Some(Arc::new(MemorySampleData::new(wav)));

        let mut group = Group::new("Main");
        group.zones.push(zone);
        let mut source = MultisampleSource::new("/tmp/in", "Piano");
        source.groups.push(group);
        source
    }

    #[test]
    fn test_write_then_read_preserves_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let creator = SfzCreator::new();
        creator
            .create_preset(dir.path(), &source_with_zone(), &NullNotifier)
            .unwrap();

        let sfz_path = dir.path().join("Piano.sfz");
        assert!(sfz_path.is_file());
        assert!(dir.path().join("Piano Samples/Piano C3.wav").is_file());

        let detector = SfzDetector::new();
        let source = detector.detect_file(&sfz_path, dir.path()).unwrap();
        assert_eq!(source.name, "Piano");
        assert_eq!(source.groups.len(), 1);
        assert_eq!(source.groups[0].name, "Main");

        let zone = &source.groups[0].zones[0];
        assert_eq!(zone.name, "Piano C3");
        assert_eq!((zone.key_low, zone.key_high), (48, 72));
        assert_eq!(zone.key_root, Some(60));
        assert_eq!(zone.stop, 1000);
        assert!((zone.gain - 0.5).abs() < 1e-3);
        assert!((zone.panorama + 0.25).abs() < 1e-6);
        assert!((zone.tune - 0.05).abs() < 1e-6);
        assert_eq!(zone.loops.len(), 1);
        assert_eq!((zone.loops[0].start, zone.loops[0].end), (100, 900));
        assert_eq!(zone.amplitude_envelope.envelope.attack_time, Some(0.01));
        assert_eq!(zone.amplitude_envelope.envelope.release_time, Some(0.7));
        assert_eq!(zone.amplitude_envelope.envelope.sustain_level, Some(1.0));
    }

    #[test]
    fn test_reader_handles_hierarchy_and_note_names() {
        let dir = tempfile::tempdir().unwrap();
        let text = "\
// a piano
<control> default_path=samples/
<global> ampeg_release=0.5
<group> lovel=64 hivel=127 group_label=Loud
<region> sample=C4.wav key=c3
<region> sample=D4.wav lokey=d3 hikey=d#3 pitch_keycenter=d3
";
        let groups = read_sfz(text, dir.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Loud");
        assert_eq!(groups[0].zones.len(), 2);

        let first = &groups[0].zones[0];
        assert_eq!(first.key_root, Some(60));
        assert_eq!((first.key_low, first.key_high), (60, 60));
        assert_eq!((first.velocity_low, first.velocity_high), (64, 127));
        assert_eq!(first.amplitude_envelope.envelope.release_time, Some(0.5));

        let second = &groups[0].zones[1];
        assert_eq!((second.key_low, second.key_high), (62, 63));
        assert_eq!(second.key_root, Some(62));
    }

    #[test]
    fn test_reader_keeps_sample_paths_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let text = "<region> sample=Grand Piano C3.wav key=60";
        let groups = read_sfz(text, dir.path()).unwrap();
        assert_eq!(groups[0].zones[0].name, "Grand Piano C3");
    }

    #[test]
    fn test_reader_rejects_files_without_regions() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_sfz("<global> volume=-3", dir.path()).is_err());
    }

    #[test]
    fn test_trigger_and_round_robin_round_trip() {
        let mut source = source_with_zone();
        {
            let group = &mut source.groups[0];
            group.trigger = Trigger::Release;
            let zone = &mut group.zones[0];
            zone.trigger = Trigger::Release;
            zone.play_logic = moss_core::PlayLogic::RoundRobin;
            zone.sequence_position = Some(2);
        }

        let text = write_sfz(&source, "Samples");
        assert!(text.contains("trigger=release"));
        assert!(text.contains("seq_position=2"));

        let dir = tempfile::tempdir().unwrap();
        let groups = read_sfz(&text, dir.path()).unwrap();
        let zone = &groups[0].zones[0];
        assert_eq!(zone.trigger, Trigger::Release);
        assert_eq!(zone.sequence_position, Some(2));
        assert_eq!(zone.play_logic, moss_core::PlayLogic::RoundRobin);
    }
}
