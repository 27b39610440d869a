//! The Decent Sampler format.
//!
//! `.dspreset` files are XML: a `groups` element holding `group`
//! elements whose `sample` children carry the zone mapping as
//! attributes. The amplitude envelope lives at group level.

mod reader;
mod writer;

pub use reader::{read_dspreset, DsPreset};
pub use writer::write_dspreset;

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
        "decentsampler",
        "Decent Sampler",
        || Box::new(DecentSamplerDetector::new()),
        || Box::new(DecentSamplerCreator::new()),
    )
}

/// Detector for `.dspreset` files.
pub struct DecentSamplerDetector {
    cancel: CancelFlag,
    settings: NoSettings,
}

impl DecentSamplerDetector {
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
        let preset = read_dspreset(&text, folder)?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut source = MultisampleSource::new(path, stem);
        source.sub_path = sub_path_of(root, path);
        source.metadata = preset.metadata;
        source.groups = preset.groups;
        Ok(source)
    }
}

impl Default for DecentSamplerDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for DecentSamplerDetector {
    fn name(&self) -> &'static str {
        "Decent Sampler"
    }

    fn prefix(&self) -> &'static str {
        "decentsampler"
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
        walk_source_files(
            source_folder,
            &[".dspreset"],
            &self.cancel,
            notifier,
            |path| {
                let display = path.display().to_string();
                notifier.log(IDS_NOTIFY_DETECTING, &[&display]);
                let source = self.detect_file(path, source_folder)?;
                (consumers.multisample)(source);
                Ok(())
            },
        );
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Creator for `.dspreset` files.
pub struct DecentSamplerCreator {
    cancel: CancelFlag,
    settings: NoSettings,
}

impl DecentSamplerCreator {
    /// Creates a creator.
    pub fn new() -> Self {
        Self {
            cancel: CancelFlag::new(),
            settings: NoSettings,
        }
    }
}

impl Default for DecentSamplerCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl Creator for DecentSamplerCreator {
    fn name(&self) -> &'static str {
        "Decent Sampler"
    }

    fn prefix(&self) -> &'static str {
        "decentsampler"
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
        let samples_folder = out_folder.join("Samples");
        fs::create_dir_all(&samples_folder)?;

        let path = unique_path(out_folder, &base_name, "dspreset");
        let display = path.display().to_string();
        notifier.log(IDS_NOTIFY_STORING, &[&display]);

        let text = write_dspreset(source, "Samples")?;
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
    use moss_core::{Envelope, Group, SampleLoop, SampleZone};
    use moss_file::wav::{FormatChunk, WavFile};
    use moss_file::MemorySampleData;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn source_with_zone() -> MultisampleSource {
        let wav = WavFile::from_pcm(FormatChunk::pcm(1, 44_100, 16), vec![0u8; 2000]);
        let mut zone = SampleZone::new("Pad A3");
        zone.key_low = 57;
        zone.key_high = 69;
        zone.key_root = Some(57);
        zone.stop = 1000;
        zone.tune = -0.1;
        zone.panorama = 0.5;
        zone.loops.push(SampleLoop::forwards(200, 800));
        zone.loops[0].crossfade = 0.25;
        zone.amplitude_envelope.envelope = Envelope {
            attack_time: Some(0.2),
            release_time: Some(4.0),
            sustain_level: Some(0.8),
            ..Envelope::default()
        };
        zone.sample_data = Some(Arc::new(MemorySampleData::new(wav)));

        let mut group = Group::new("Pads");
        group.zones.push(zone);
        let mut source = MultisampleSource::new("/tmp/in", "Warm Pad");
        source.metadata.creator = "Alice".into();
        source.metadata.category = "Pads".into();
        source.groups.push(group);
        source
    }

    #[test]
    fn test_write_then_read_preserves_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let creator = DecentSamplerCreator::new();
        creator
            .create_preset(dir.path(), &source_with_zone(), &NullNotifier)
            .unwrap();

        let preset_path = dir.path().join("Warm Pad.dspreset");
        assert!(preset_path.is_file());
        assert!(dir.path().join("Samples/Pad A3.wav").is_file());

        let detector = DecentSamplerDetector::new();
        let source = detector.detect_file(&preset_path, dir.path()).unwrap();
        assert_eq!(source.name, "Warm Pad");
        assert_eq!(source.metadata.creator, "Alice");
        assert_eq!(source.metadata.category, "Pads");
        assert_eq!(source.groups.len(), 1);
        assert_eq!(source.groups[0].name, "Pads");

        let zone = &source.groups[0].zones[0];
        assert_eq!(zone.name, "Pad A3");
        assert_eq!((zone.key_low, zone.key_high), (57, 69));
        assert_eq!(zone.key_root, Some(57));
        assert_eq!(zone.stop, 1000);
        assert!((zone.tune + 0.1).abs() < 1e-6);
        assert!((zone.panorama - 0.5).abs() < 1e-6);
        assert_eq!(zone.loops.len(), 1);
        assert_eq!((zone.loops[0].start, zone.loops[0].end), (200, 800));
        assert!((zone.loops[0].crossfade - 0.25).abs() < 0.01);

        let envelope = &zone.amplitude_envelope.envelope;
        assert_eq!(envelope.attack_time, Some(0.2));
        assert_eq!(envelope.release_time, Some(4.0));
        assert_eq!(envelope.sustain_level, Some(0.8));
    }

    #[test]
    fn test_reader_accepts_db_volume() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<DecentSampler minVersion="1.0.0">
  <groups>
    <group>
      <sample path="Samples/a.wav" rootNote="60" loNote="48" hiNote="72" volume="-6dB"/>
    </group>
  </groups>
</DecentSampler>"#;
        let preset = read_dspreset(text, dir.path()).unwrap();
        let zone = &preset.groups[0].zones[0];
        assert!((zone.gain - 0.5012).abs() < 1e-3);
    }

    #[test]
    fn test_reader_rejects_empty_presets() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"<DecentSampler><groups></groups></DecentSampler>"#;
        assert!(read_dspreset(text, dir.path()).is_err());
    }

    #[test]
    fn test_reader_rejects_sample_outside_group() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"<DecentSampler><groups><sample path="x.wav"/></groups></DecentSampler>"#;
        assert!(read_dspreset(text, dir.path()).is_err());
    }
}
