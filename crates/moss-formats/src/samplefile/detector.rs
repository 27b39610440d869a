//! Building a multisample out of a folder of WAV files.

use std::path::Path;
use std::sync::Arc;

use moss_core::math::db_to_value;
use moss_core::note::parse_note;
use moss_core::{Group, MultisampleSource, SampleZone};
use moss_file::split_stereo::{
    combine_split_stereo_zones, detect_channel_configuration, ChannelConfiguration,
};
use moss_file::{FileSampleData, WavFile};

use crate::error::{FormatError, FormatResult};

/// Channel-naming patterns that mark a mono file as one half of a
/// split-stereo pair.
#[derive(Debug, Clone)]
pub struct ChannelPatterns {
    /// Name endings of left-channel files.
    pub left: Vec<String>,
    /// Name endings of right-channel files.
    pub right: Vec<String>,
}

impl Default for ChannelPatterns {
    fn default() -> Self {
        Self {
            left: ["_L", "-L", " L", "Left"].map(String::from).to_vec(),
            right: ["_R", "-R", " R", "Right"].map(String::from).to_vec(),
        }
    }
}

impl ChannelPatterns {
    fn matches(patterns: &[String], stem: &str) -> bool {
        let lower = stem.to_lowercase();
        patterns.iter().any(|p| lower.ends_with(&p.to_lowercase()))
    }
}

/// Builds one multisample from the WAV files directly inside a folder.
pub fn detect_folder(
    folder: &Path,
    wav_files: &[std::path::PathBuf],
    patterns: &ChannelPatterns,
) -> FormatResult<MultisampleSource> {
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Samples".to_string());

    let mut group = Group::new(name.clone());
    for path in wav_files {
        group.zones.push(build_zone(path, patterns)?);
    }

    match detect_channel_configuration(std::slice::from_ref(&group))? {
        ChannelConfiguration::SplitStereo => combine_split_stereo_zones(&mut group)?,
        ChannelConfiguration::Mixed => {
            return Err(FormatError::malformed(format!(
                "folder {} mixes mono and stereo samples",
                folder.display()
            )))
        }
        _ => {}
    }

    fill_key_ranges(&mut group.zones);

    let mut source = MultisampleSource::new(folder, name);
    source.groups.push(group);
    Ok(source)
}

fn build_zone(path: &Path, patterns: &ChannelPatterns) -> FormatResult<SampleZone> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let wav = WavFile::read(path)?;

    let mut zone = SampleZone::new(stem.clone());
    zone.stop = wav.frame_count();

    if let Some(inst) = &wav.instrument_chunk {
        zone.key_root = Some(inst.unshifted_note.min(127));
        zone.key_low = inst.low_note.min(127);
        zone.key_high = inst.high_note.min(127);
        zone.velocity_low = inst.low_velocity.clamp(1, 127);
        zone.velocity_high = inst.high_velocity.clamp(1, 127);
        zone.tune = f64::from(inst.fine_tune) / 100.0;
        zone.gain = db_to_value(f64::from(inst.gain_db)).clamp(0.125, 24.0);
    }
    if let Some(smpl) = &wav.sample_chunk {
        if zone.key_root.is_none() {
            zone.key_root = Some((smpl.midi_unity_note.min(127)) as u8);
        }
        if zone.tune == 0.0 {
            zone.tune = smpl.pitch_fraction_cents() / 100.0;
        }
        zone.loops = smpl.model_loops();
        zone.clamp_to_frame_count(wav.frame_count());
    }
    // A note in the filename wins over chunk data, it is what the user
    // sees and fixes.
    if let Some(note) = note_from_name(&stem) {
        zone.key_root = Some(note);
    }

    if ChannelPatterns::matches(&patterns.left, &stem) {
        zone.panorama = -1.0;
    } else if ChannelPatterns::matches(&patterns.right, &stem) {
        zone.panorama = 1.0;
    }

    zone.sample_data = Some(Arc::new(FileSampleData::new(path)));
    Ok(zone)
}

/// Finds a MIDI note encoded at the end of a sample name, either as a
/// note name (`Piano C#3`, `Piano-C3`, `PianoC3`) or a number
/// (`Piano 060`).
pub fn note_from_name(stem: &str) -> Option<u8> {
    let trimmed = stem.trim_end();
    // Last separator-delimited token first.
    if let Some(token) = trimmed
        .rsplit([' ', '_', '-'])
        .next()
        .filter(|t| !t.is_empty() && t.len() < trimmed.len())
    {
        if let Some(note) = parse_note(token) {
            return Some(note);
        }
    }
    // Then an undelimited trailing note name like "PianoC3". Without a
    // separator only an uppercase note letter counts, so "Take2" is not
    // read as the note E2.
    let characters: Vec<char> = trimmed.chars().collect();
    for length in (2..=4.min(characters.len().saturating_sub(1))).rev() {
        let suffix: String = characters[characters.len() - length..].iter().collect();
        if !suffix.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            continue;
        }
        if let Some(note) = parse_note(&suffix) {
            return Some(note);
        }
    }
    None
}

/// Distributes key ranges between zones: each zone reaches down to just
/// above the previous root; the first zone reaches key 0 and the last
/// key 127. Zones that brought an explicit range keep it.
fn fill_key_ranges(zones: &mut [SampleZone]) {
    let mut order: Vec<usize> = (0..zones.len()).collect();
    order.sort_by_key(|&i| zones[i].effective_key_root());

    let mut previous_root: Option<u8> = None;
    for (position, &index) in order.iter().enumerate() {
        let root = zones[index].effective_key_root();
        let has_explicit_range =
            zones[index].key_low != 0 || zones[index].key_high != 127;
        if !has_explicit_range {
            zones[index].key_low = match previous_root {
                Some(previous) => previous.saturating_add(1).min(root),
                None => 0,
            };
            zones[index].key_high = if position + 1 == order.len() { 127 } else { root };
        }
        previous_root = Some(root);
    }
}
