//! Instrument and performance source types.

use std::path::PathBuf;

use serde::Serialize;

use crate::group::Group;
use crate::metadata::Metadata;

/// One logical instrument detected from a source file or folder.
#[derive(Debug, Clone, Serialize)]
pub struct MultisampleSource {
    /// The file or folder the instrument was detected from.
    pub source_path: PathBuf,
    /// Path segments below the detection root, used for output mirroring.
    pub sub_path: Vec<String>,
    /// Instrument name.
    pub name: String,
    /// Name of the key mapping, usually equal to `name`.
    pub mapping_name: String,
    /// The groups of this instrument, in detection order.
    pub groups: Vec<Group>,
    /// Descriptive metadata.
    pub metadata: Metadata,
}

impl MultisampleSource {
    /// Creates an empty multisample source.
    pub fn new(source_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_path: source_path.into(),
            sub_path: Vec::new(),
            mapping_name: name.clone(),
            name,
            groups: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    /// The groups that contain at least one zone.
    pub fn non_empty_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| !g.zones.is_empty())
    }

    /// Total zone count across all groups.
    pub fn zone_count(&self) -> usize {
        self.groups.iter().map(|g| g.zones.len()).sum()
    }

    /// The lowest key of any zone, 0 when there are no zones.
    pub fn lowest_key(&self) -> u8 {
        self.groups
            .iter()
            .flat_map(|g| g.zones.iter())
            .map(|z| z.key_low)
            .min()
            .unwrap_or(0)
    }

    /// The highest key of any zone, 127 when there are no zones.
    pub fn highest_key(&self) -> u8 {
        self.groups
            .iter()
            .flat_map(|g| g.zones.iter())
            .map(|z| z.key_high)
            .max()
            .unwrap_or(127)
    }
}

/// One instrument slot of a performance.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentSource {
    /// The instrument.
    pub multisample: MultisampleSource,
    /// MIDI channel in `0..=15`, or -1 for omni.
    pub midi_channel: i8,
}

impl InstrumentSource {
    /// Creates an omni instrument slot.
    pub fn omni(multisample: MultisampleSource) -> Self {
        Self {
            multisample,
            midi_channel: -1,
        }
    }
}

/// An ordered collection of instruments keyed to MIDI channels.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSource {
    /// The file or folder the performance was detected from.
    pub source_path: PathBuf,
    /// Path segments below the detection root, used for output mirroring.
    pub sub_path: Vec<String>,
    /// Performance name.
    pub name: String,
    /// The instruments, in slot order.
    pub instruments: Vec<InstrumentSource>,
}

impl PerformanceSource {
    /// Creates an empty performance source.
    pub fn new(source_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            sub_path: Vec::new(),
            name: name.into(),
            instruments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::SampleZone;

    #[test]
    fn test_key_range_is_union_of_zone_ranges() {
        let mut source = MultisampleSource::new("/tmp/a", "A");
        let mut group = Group::new("G");
        let mut low = SampleZone::new("low");
        low.key_low = 12;
        low.key_high = 35;
        let mut high = SampleZone::new("high");
        high.key_low = 36;
        high.key_high = 96;
        group.zones.push(low);
        group.zones.push(high);
        source.groups.push(group);

        assert_eq!(source.lowest_key(), 12);
        assert_eq!(source.highest_key(), 96);
        assert_eq!(source.zone_count(), 2);
    }

    #[test]
    fn test_non_empty_groups_filters_empty() {
        let mut source = MultisampleSource::new("/tmp/a", "A");
        source.groups.push(Group::new("empty"));
        let mut filled = Group::new("filled");
        filled.zones.push(SampleZone::new("z"));
        source.groups.push(filled);
        assert_eq!(source.non_empty_groups().count(), 1);
    }
}
