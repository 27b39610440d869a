//! `.dspreset` parsing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use moss_core::{Envelope, Group, Metadata, PlayLogic, SampleData, SampleLoop, SampleZone, Trigger};
use moss_file::FileSampleData;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FormatError, FormatResult};

/// The decoded content of a preset file.
#[derive(Debug)]
pub struct DsPreset {
    /// Metadata from the root element.
    pub metadata: Metadata,
    /// All sample groups.
    pub groups: Vec<Group>,
}

/// Parses Decent Sampler preset XML. Sample paths resolve relative to
/// `preset_folder`.
pub fn read_dspreset(text: &str, preset_folder: &Path) -> FormatResult<DsPreset> {
    let mut reader = Reader::from_str(text);
    let mut metadata = Metadata::default();
    let mut groups: Vec<Group> = Vec::new();
    let mut group_envelope = Envelope::default();
    let mut group_trigger = Trigger::Attack;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| FormatError::malformed(format!("XML error: {e}")))?;
        match event {
            Event::Start(element) | Event::Empty(element) => {
                let attributes = read_attributes(&element)?;
                match element.name().as_ref() {
                    b"DecentSampler" => {
                        metadata.creator = attributes.get("author").cloned().unwrap_or_default();
                        metadata.description =
                            attributes.get("description").cloned().unwrap_or_default();
                        metadata.category =
                            attributes.get("category").cloned().unwrap_or_default();
                    }
                    b"group" => {
                        let mut group = Group::new(
                            attributes
                                .get("name")
                                .cloned()
                                .unwrap_or_else(|| format!("Group {}", groups.len() + 1)),
                        );
                        group_trigger = parse_trigger(attributes.get("trigger"));
                        group.trigger = group_trigger;
                        group_envelope = parse_envelope(&attributes);
                        groups.push(group);
                    }
                    b"sample" => {
                        let Some(group) = groups.last_mut() else {
                            return Err(FormatError::malformed("sample outside of a group"));
                        };
                        let zone =
                            build_zone(&attributes, preset_folder, group_envelope, group_trigger)?;
                        group.zones.push(zone);
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    groups.retain(|g| !g.zones.is_empty());
    if groups.is_empty() {
        return Err(FormatError::malformed("no sample group found"));
    }
    Ok(DsPreset { metadata, groups })
}

fn read_attributes(element: &BytesStart<'_>) -> FormatResult<HashMap<String, String>> {
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute =
            attribute.map_err(|e| FormatError::malformed(format!("bad attribute: {e}")))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| FormatError::malformed(format!("bad attribute value: {e}")))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn parse_trigger(value: Option<&String>) -> Trigger {
    match value.map(String::as_str) {
        Some("release") => Trigger::Release,
        Some("first") => Trigger::First,
        Some("legato") => Trigger::Legato,
        _ => Trigger::Attack,
    }
}

fn parse_envelope(attributes: &HashMap<String, String>) -> Envelope {
    let get = |key: &str| attributes.get(key).and_then(|v| v.parse::<f64>().ok());
    Envelope {
        attack_time: get("attack"),
        decay_time: get("decay"),
        release_time: get("release"),
        sustain_level: get("sustain").map(|s| s.clamp(0.0, 1.0)),
        ..Envelope::default()
    }
}

fn build_zone(
    attributes: &HashMap<String, String>,
    preset_folder: &Path,
    envelope: Envelope,
    trigger: Trigger,
) -> FormatResult<SampleZone> {
    let path_text = attributes
        .get("path")
        .ok_or_else(|| FormatError::malformed("sample without a path"))?;
    let path = resolve_path(preset_folder, path_text);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_text.clone());

    let get_f64 = |key: &str| attributes.get(key).and_then(|v| v.parse::<f64>().ok());
    let get_u64 = |key: &str| get_f64(key).map(|v| v.max(0.0) as u64);
    let get_note = |key: &str| {
        attributes
            .get(key)
            .and_then(|v| moss_core::note::parse_note(v))
    };

    let mut zone = SampleZone::new(stem);
    zone.trigger = parse_trigger(attributes.get("trigger")).max_specific(trigger);
    zone.amplitude_envelope.envelope = envelope;

    if let Some(root) = get_note("rootNote") {
        zone.key_root = Some(root);
    }
    if let Some(low) = get_note("loNote") {
        zone.key_low = low;
    }
    if let Some(high) = get_note("hiNote") {
        zone.key_high = high;
    }
    if let Some(low) = get_u64("loVel") {
        zone.velocity_low = (low.clamp(1, 127)) as u8;
    }
    if let Some(high) = get_u64("hiVel") {
        zone.velocity_high = (high.clamp(1, 127)) as u8;
    }
    if let Some(start) = get_u64("start") {
        zone.start = start;
    }
    if let Some(end) = get_u64("end") {
        zone.stop = end + 1;
    }
    if let Some(volume) = attributes.get("volume") {
        zone.gain = parse_volume(volume).clamp(0.125, 24.0);
    }
    if let Some(pan) = get_f64("pan") {
        zone.panorama = (pan / 100.0).clamp(-1.0, 1.0);
    }
    if let Some(tuning) = get_f64("tuning") {
        zone.tune = tuning;
    }
    if get_f64("pitchKeyTrack") == Some(0.0) {
        zone.key_tracking = 0.0;
    }
    if let Some(position) = get_u64("seqPosition") {
        zone.play_logic = PlayLogic::RoundRobin;
        zone.sequence_position = Some(position as u32);
    }

    let loop_enabled = attributes.get("loopEnabled").map(String::as_str) == Some("true");
    if loop_enabled {
        let start = get_u64("loopStart").unwrap_or(0);
        let end = get_u64("loopEnd").unwrap_or_else(|| zone.stop.saturating_sub(1));
        let mut lp = SampleLoop::forwards(start, end);
        if let Some(crossfade) = get_u64("loopCrossfade") {
            lp.set_crossfade_in_frames(crossfade);
        }
        zone.loops.push(lp);
    }

    let data = FileSampleData::new(&path);
    if let Ok(metadata) = data.audio_metadata() {
        zone.clamp_to_frame_count(metadata.frame_count);
    }
    zone.sample_data = Some(Arc::new(data));
    Ok(zone)
}

/// Volume values are linear, or decibels with a `dB` suffix.
fn parse_volume(value: &str) -> f64 {
    let trimmed = value.trim();
    if let Some(db_text) = trimmed
        .strip_suffix("dB")
        .or_else(|| trimmed.strip_suffix("db"))
    {
        db_text
            .trim()
            .parse::<f64>()
            .map(moss_core::math::db_to_value)
            .unwrap_or(1.0)
    } else {
        trimmed.parse().unwrap_or(1.0)
    }
}

fn resolve_path(folder: &Path, relative: &str) -> PathBuf {
    let mut path = folder.to_path_buf();
    for part in relative
        .replace('\\', "/")
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
    {
        path.push(part);
    }
    path
}

trait TriggerExt {
    fn max_specific(self, fallback: Trigger) -> Trigger;
}

impl TriggerExt for Trigger {
    /// Keeps a sample-level trigger, falling back to the group's.
    fn max_specific(self, fallback: Trigger) -> Trigger {
        if self == Trigger::Attack {
            fallback
        } else {
            self
        }
    }
}
