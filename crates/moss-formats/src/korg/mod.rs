//! The Korg korgmultisample format.
//!
//! A compact binary encoding with a framed header, ID-prefixed blocks,
//! 7-bit variable-length integers for sample offsets and float32 key-zone
//! parameters. One file holds a single layer of key zones, so the creator
//! splits a multi-group instrument into one file per group.

mod format;
mod reader;
mod writer;

pub use reader::{read_korgmultisample, KorgFile, KorgZone};
pub use writer::write_korgmultisample;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use moss_core::naming::{sanitize_filename, unique_path};
use moss_core::{Group, MultisampleSource, SampleData};
use moss_file::FileSampleData;

use crate::error::FormatResult;
use crate::notify::{Notifier, IDS_NOTIFY_DETECTING, IDS_NOTIFY_STORING};
use crate::plugin::{walk_source_files, write_zone_sample, CancelFlag, Creator, Detector, SourceConsumers};
use crate::registry::FormatPlugin;
use crate::settings::{NoSettings, Settings};
use crate::FormatError;

use format::FILE_ENDING;

/// The registry entry for this format.
pub fn plugin() -> FormatPlugin {
    FormatPlugin::new(
        "korgmultisample",
        "Korg korgmultisample",
        || Box::new(KorgmultisampleDetector::new()),
        || Box::new(KorgmultisampleCreator::new()),
    )
}

/// Detector for `.korgmultisample` files.
pub struct KorgmultisampleDetector {
    cancel: CancelFlag,
    settings: NoSettings,
}

impl KorgmultisampleDetector {
    /// Creates a detector.
    pub fn new() -> Self {
        Self {
            cancel: CancelFlag::new(),
            settings: NoSettings,
        }
    }

    fn detect_file(&self, path: &Path, root: &Path) -> FormatResult<MultisampleSource> {
        let file = read_korgmultisample(std::io::BufReader::new(fs::File::open(path)?))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let folder = path.parent().unwrap_or(root);

        let KorgFile {
            name,
            metadata,
            zones,
        } = file;
        let mut source = MultisampleSource::new(path, name.unwrap_or(stem));
        source.sub_path = crate::plugin::sub_path_of(root, path);
        source.metadata = metadata;

        let mut group = Group::new("Layer");
        for korg_zone in zones {
            let KorgZone { file_name, mut zone } = korg_zone;
            let data = FileSampleData::new(folder.join(&file_name));
            let audio = data.audio_metadata()?;
            zone.clamp_to_frame_count(audio.frame_count);
            zone.sample_data = Some(Arc::new(data));
            group.zones.push(zone);
        }
        source.groups.push(group);
        Ok(source)
    }
}

impl Default for KorgmultisampleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for KorgmultisampleDetector {
    fn name(&self) -> &'static str {
        "Korg korgmultisample"
    }

    fn prefix(&self) -> &'static str {
        "korgmultisample"
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
            &[FILE_ENDING],
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

/// Creator for `.korgmultisample` files.
pub struct KorgmultisampleCreator {
    cancel: CancelFlag,
    settings: NoSettings,
}

impl KorgmultisampleCreator {
    /// Creates a creator.
    pub fn new() -> Self {
        Self {
            cancel: CancelFlag::new(),
            settings: NoSettings,
        }
    }
}

impl Default for KorgmultisampleCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl Creator for KorgmultisampleCreator {
    fn name(&self) -> &'static str {
        "Korg korgmultisample"
    }

    fn prefix(&self) -> &'static str {
        "korgmultisample"
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
        fs::create_dir_all(out_folder)?;
        let base_name = sanitize_filename(&source.name);
        let creation_time = source.metadata.creation_time.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        });

        let groups: Vec<_> = source.non_empty_groups().collect();
        let multiple = groups.len() > 1;
        for group in groups {
            if self.cancel.is_cancelled() {
                return Err(FormatError::Cancelled);
            }
            // One layer per file; velocity range suffixes keep the files
            // of one instrument distinguishable.
            let stem = if multiple {
                format!(
                    "{} {:03}-{:03}",
                    base_name,
                    group.lowest_velocity(),
                    group.highest_velocity()
                )
            } else {
                base_name.clone()
            };
            let path = unique_path(out_folder, &stem, "korgmultisample");
            let display = path.display().to_string();
            notifier.log(IDS_NOTIFY_STORING, &[&display]);

            let uuid: [u8; 16] = rand::random();
            let bytes =
                write_korgmultisample(&source.name, group, &source.metadata, creation_time, uuid)?;
            fs::write(&path, bytes)?;

            for zone in &group.zones {
                write_zone_sample(out_folder, zone)?;
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
