//! SFZ parsing.
//!
//! Opcodes inherit along the section hierarchy: global, then master,
//! then group, then region; the region closest to the sample wins.
//! Unknown opcodes and unparseable values are ignored, as players do.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use moss_core::filter::{Filter, FilterType};
use moss_core::math::db_to_value;
use moss_core::note::parse_note;
use moss_core::{Envelope, Group, LoopType, PlayLogic, SampleData, SampleLoop, SampleZone, Trigger};
use moss_file::FileSampleData;

use crate::error::{FormatError, FormatResult};

use super::opcodes as op;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Control,
    Global,
    Master,
    Group,
    Region,
}

/// Parses SFZ text into groups of zones.
///
/// `sfz_folder` anchors relative sample paths; `default_path` from the
/// control section is honored on top of it.
pub fn read_sfz(text: &str, sfz_folder: &Path) -> FormatResult<Vec<Group>> {
    let mut parser = SfzParser::new(sfz_folder);
    for (key, value) in tokenize(text) {
        parser.handle(&key, value)?;
    }
    parser.finish()
}

/// Splits SFZ text into header and `key=value` events.
///
/// Values run until the next token that contains `=` or opens a header,
/// so sample paths with spaces survive.
fn tokenize(text: &str) -> Vec<(String, Option<String>)> {
    let mut events = Vec::new();
    for raw_line in text.lines() {
        let line = match raw_line.find("//") {
            Some(index) => &raw_line[..index],
            None => raw_line,
        };
        for token in line.split_whitespace() {
            if token.starts_with('<') {
                events.push((token.trim_matches(['<', '>']).to_lowercase(), None));
            } else if let Some((key, value)) = token.split_once('=') {
                events.push((key.to_lowercase(), Some(value.to_string())));
            } else if let Some((_, Some(value))) = events.last_mut() {
                // Continuation of the previous value.
                value.push(' ');
                value.push_str(token);
            }
        }
    }
    events
}

struct SfzParser {
    sfz_folder: PathBuf,
    scope: Scope,
    control: HashMap<String, String>,
    global: HashMap<String, String>,
    master: HashMap<String, String>,
    group: HashMap<String, String>,
    region: HashMap<String, String>,
    groups: Vec<Group>,
    in_region: bool,
}

impl SfzParser {
    fn new(sfz_folder: &Path) -> Self {
        Self {
            sfz_folder: sfz_folder.to_path_buf(),
            scope: Scope::Global,
            control: HashMap::new(),
            global: HashMap::new(),
            master: HashMap::new(),
            group: HashMap::new(),
            region: HashMap::new(),
            groups: Vec::new(),
            in_region: false,
        }
    }

    fn handle(&mut self, key: &str, value: Option<String>) -> FormatResult<()> {
        match value {
            None => self.enter_header(key),
            Some(value) => {
                let map = match self.scope {
                    Scope::Control => &mut self.control,
                    Scope::Global => &mut self.global,
                    Scope::Master => &mut self.master,
                    Scope::Group => &mut self.group,
                    Scope::Region => &mut self.region,
                };
                map.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    fn enter_header(&mut self, header: &str) -> FormatResult<()> {
        self.finalize_region()?;
        match header {
            "control" => self.scope = Scope::Control,
            "global" => {
                self.scope = Scope::Global;
                self.global.clear();
            }
            "master" => {
                self.scope = Scope::Master;
                self.master.clear();
            }
            "group" => {
                self.scope = Scope::Group;
                self.group.clear();
                self.groups.push(Group::new(""));
            }
            "region" => {
                self.scope = Scope::Region;
                self.region.clear();
                self.in_region = true;
            }
            // curve, effect and other sections carry nothing we map.
            _ => self.scope = Scope::Global,
        }
        Ok(())
    }

    fn finish(mut self) -> FormatResult<Vec<Group>> {
        self.finalize_region()?;
        let mut groups: Vec<Group> = self
            .groups
            .into_iter()
            .filter(|g| !g.zones.is_empty())
            .collect();
        for (index, group) in groups.iter_mut().enumerate() {
            if group.name.is_empty() {
                group.name = format!("Group {}", index + 1);
            }
        }
        if groups.is_empty() {
            return Err(FormatError::malformed("no region with a sample found"));
        }
        Ok(groups)
    }

    fn finalize_region(&mut self) -> FormatResult<()> {
        if !self.in_region {
            return Ok(());
        }
        self.in_region = false;

        let Some(sample) = self.lookup(op::SAMPLE).map(str::to_string) else {
            return Ok(());
        };
        let zone = self.build_zone(&sample);
        let label = self.region_lookup_label();

        if self.groups.is_empty() {
            self.groups.push(Group::new(""));
        }
        let group = self.groups.last_mut().expect("group exists");
        if group.name.is_empty() {
            if let Some(label) = label {
                group.name = label;
            }
        }
        if group.zones.is_empty() {
            group.trigger = zone.trigger;
        }
        group.zones.push(zone);
        Ok(())
    }

    fn region_lookup_label(&self) -> Option<String> {
        self.lookup(op::GROUP_LABEL).map(str::to_string)
    }

    /// Region-first lookup through the section hierarchy.
    fn lookup(&self, key: &str) -> Option<&str> {
        self.region
            .get(key)
            .or_else(|| self.group.get(key))
            .or_else(|| self.master.get(key))
            .or_else(|| self.global.get(key))
            .map(String::as_str)
    }

    fn lookup_f64(&self, key: &str) -> Option<f64> {
        self.lookup(key).and_then(|v| v.parse().ok())
    }

    fn lookup_i64(&self, key: &str) -> Option<i64> {
        self.lookup(key).and_then(|v| v.parse::<f64>().ok()).map(|v| v as i64)
    }

    fn lookup_note(&self, key: &str) -> Option<u8> {
        self.lookup(key).and_then(parse_note)
    }

    fn sample_path(&self, sample: &str) -> PathBuf {
        let mut relative = String::new();
        if let Some(default_path) = self.control.get(op::DEFAULT_PATH) {
            relative.push_str(default_path);
        }
        relative.push_str(sample);
        let relative = relative.replace('\\', "/");
        let mut path = self.sfz_folder.clone();
        for part in relative.split('/').filter(|p| !p.is_empty() && *p != ".") {
            path.push(part);
        }
        path
    }

    fn build_zone(&self, sample: &str) -> SampleZone {
        let path = self.sample_path(sample);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| sample.to_string());
        let mut zone = SampleZone::new(stem);

        if let Some(key) = self.lookup_note(op::KEY) {
            zone.key_low = key;
            zone.key_high = key;
            zone.key_root = Some(key);
        }
        if let Some(low) = self.lookup_note(op::LOKEY) {
            zone.key_low = low;
        }
        if let Some(high) = self.lookup_note(op::HIKEY) {
            zone.key_high = high;
        }
        if let Some(root) = self.lookup_note(op::PITCH_KEYCENTER) {
            zone.key_root = Some(root);
        }
        if let (Some(low), Some(high)) = (
            self.lookup_note(op::XFIN_LOKEY),
            self.lookup_note(op::XFIN_HIKEY),
        ) {
            zone.note_crossfade_low = high.saturating_sub(low);
        }
        if let (Some(low), Some(high)) = (
            self.lookup_note(op::XFOUT_LOKEY),
            self.lookup_note(op::XFOUT_HIKEY),
        ) {
            zone.note_crossfade_high = high.saturating_sub(low);
        }

        if let Some(low) = self.lookup_i64(op::LOVEL) {
            zone.velocity_low = low.clamp(1, 127) as u8;
        }
        if let Some(high) = self.lookup_i64(op::HIVEL) {
            zone.velocity_high = high.clamp(1, 127) as u8;
        }
        if let (Some(low), Some(high)) = (
            self.lookup_i64(op::XFIN_LOVEL),
            self.lookup_i64(op::XFIN_HIVEL),
        ) {
            zone.velocity_crossfade_low = (high - low).clamp(0, 127) as u8;
        }
        if let (Some(low), Some(high)) = (
            self.lookup_i64(op::XFOUT_LOVEL),
            self.lookup_i64(op::XFOUT_HIVEL),
        ) {
            zone.velocity_crossfade_high = (high - low).clamp(0, 127) as u8;
        }

        if let Some(offset) = self.lookup_i64(op::OFFSET) {
            zone.start = offset.max(0) as u64;
        }
        if let Some(end) = self.lookup_i64(op::END) {
            zone.stop = (end.max(0) as u64) + 1;
        }
        if self.lookup(op::DIRECTION) == Some("reverse") {
            zone.is_reversed = true;
        }
        if let Some(trigger) = self.lookup(op::TRIGGER) {
            zone.trigger = match trigger {
                "release" => Trigger::Release,
                "first" => Trigger::First,
                "legato" => Trigger::Legato,
                _ => Trigger::Attack,
            };
        }
        if let Some(position) = self.lookup_i64(op::SEQ_POSITION) {
            zone.play_logic = PlayLogic::RoundRobin;
            zone.sequence_position = Some(position.max(0) as u32);
        }

        if let Some(volume) = self.lookup_f64(op::VOLUME) {
            zone.gain = db_to_value(volume).clamp(0.125, 24.0);
        }
        if let Some(pan) = self.lookup_f64(op::PAN) {
            zone.panorama = (pan / 100.0).clamp(-1.0, 1.0);
        }
        let transpose = self.lookup_f64(op::TRANSPOSE).unwrap_or(0.0);
        let tune_cents = self.lookup_f64(op::TUNE).unwrap_or(0.0);
        if transpose != 0.0 || tune_cents != 0.0 {
            zone.tune = transpose + tune_cents / 100.0;
        }
        if let Some(track) = self.lookup_f64(op::PITCH_KEYTRACK) {
            zone.key_tracking = (track / 100.0).clamp(0.0, 1.0);
        }
        if let Some(bend) = self.lookup_i64(op::BEND_UP) {
            zone.bend_up = bend.clamp(-9600, 9600) as i32;
        }
        if let Some(bend) = self.lookup_i64(op::BEND_DOWN) {
            zone.bend_down = bend.clamp(-9600, 9600) as i32;
        }
        if let Some(veltrack) = self.lookup_f64(op::AMP_VELTRACK) {
            zone.amplitude_velocity_depth = (veltrack / 100.0).clamp(-1.0, 1.0);
        }

        let data = FileSampleData::new(&path);
        let sample_rate = match data.audio_metadata() {
            Ok(metadata) => {
                zone.clamp_to_frame_count(metadata.frame_count);
                metadata.sample_rate
            }
            Err(_) => 44_100,
        };
        zone.sample_data = Some(Arc::new(data));

        self.apply_loop(&mut zone, sample_rate);
        zone.amplitude_envelope.envelope = self.read_envelope("ampeg");
        if let Some(depth) = self.lookup_f64(op::PITCHEG_DEPTH) {
            zone.pitch_envelope.depth = (depth / op::PITCH_ENVELOPE_DEPTH_CENTS).clamp(-1.0, 1.0);
            zone.pitch_envelope.envelope = self.read_envelope("pitcheg");
        }
        zone.filter = self.read_filter();
        zone
    }

    fn apply_loop(&self, zone: &mut SampleZone, sample_rate: u32) {
        let mode = self.lookup(op::LOOP_MODE).unwrap_or("no_loop");
        if mode != "loop_continuous" && mode != "loop_sustain" {
            return;
        }
        let start = self.lookup_i64(op::LOOP_START).unwrap_or(0).max(0) as u64;
        let end = self
            .lookup_i64(op::LOOP_END)
            .map(|v| v.max(0) as u64)
            .unwrap_or_else(|| zone.stop.saturating_sub(1));
        let loop_type = match self.lookup(op::LOOP_TYPE) {
            Some("alternate") => LoopType::Alternating,
            Some("backward") => LoopType::Backwards,
            _ => LoopType::Forwards,
        };
        let mut lp = SampleLoop {
            loop_type,
            start,
            end,
            crossfade: 0.0,
        };
        if let Some(seconds) = self.lookup_f64(op::LOOP_CROSSFADE) {
            lp.set_crossfade_in_seconds(seconds, sample_rate);
        }
        zone.loops.push(lp);
    }

    fn read_envelope(&self, prefix: &str) -> Envelope {
        let time = |suffix: &str| self.lookup_f64(&format!("{prefix}_{suffix}"));
        let mut envelope = Envelope {
            delay_time: time("delay"),
            attack_time: time("attack"),
            hold_time: time("hold"),
            decay_time: time("decay"),
            release_time: time("release"),
            ..Envelope::default()
        };
        if let Some(sustain) = time("sustain") {
            envelope.sustain_level = Some((sustain / 100.0).clamp(0.0, 1.0));
        }
        if let Some(start) = time("start") {
            envelope.start_level = Some((start / 100.0).clamp(0.0, 1.0));
        }
        envelope
    }

    fn read_filter(&self) -> Option<Filter> {
        let type_text = self.lookup(op::FIL_TYPE)?;
        let (filter_type, poles) = parse_filter_type(type_text)?;
        let cutoff = self.lookup_f64(op::CUTOFF).unwrap_or(20_000.0);
        let mut filter = Filter::new(filter_type, poles, cutoff, 0.0);
        if let Some(resonance) = self.lookup_f64(op::RESONANCE) {
            filter.resonance = (resonance / 40.0).clamp(0.0, 1.0);
        }
        if let Some(veltrack) = self.lookup_f64(op::FIL_VELTRACK) {
            filter.cutoff_velocity_depth =
                (veltrack / op::FILTER_VELOCITY_DEPTH_CENTS).clamp(-1.0, 1.0);
        }
        if let Some(depth) = self.lookup_f64(op::FILEG_DEPTH) {
            filter.cutoff_envelope.depth =
                (depth / op::FILTER_ENVELOPE_DEPTH_CENTS).clamp(-1.0, 1.0);
            filter.cutoff_envelope.envelope = self.read_envelope("fileg");
        }
        Some(filter)
    }
}

fn parse_filter_type(text: &str) -> Option<(FilterType, u8)> {
    let (prefix, poles_text) = text.split_once('_')?;
    let filter_type = match prefix {
        "lpf" => FilterType::LowPass,
        "hpf" => FilterType::HighPass,
        "bpf" => FilterType::BandPass,
        "brf" => FilterType::BandReject,
        _ => return None,
    };
    let poles = match poles_text {
        "1p" => 1,
        "4p" => 4,
        _ => 2,
    };
    Some((filter_type, poles))
}
