//! SFZ emission.

use std::fmt::Write as _;

use moss_core::filter::FilterType;
use moss_core::math::value_to_db;
use moss_core::{Envelope, LoopType, MultisampleSource, PlayLogic, SampleZone, Trigger};

use super::opcodes as op;

/// Renders a multisample as SFZ text. Sample opcodes point into
/// `samples_folder` with forward slashes.
pub fn write_sfz(source: &MultisampleSource, samples_folder: &str) -> String {
    let mut text = String::new();

    if !source.metadata.description.is_empty() {
        for line in source.metadata.description.lines() {
            let _ = writeln!(text, "// {line}");
        }
    }
    if !source.metadata.creator.is_empty() {
        let _ = writeln!(text, "// Creator: {}", source.metadata.creator);
    }
    let _ = writeln!(text, "\n<control>");
    let _ = writeln!(text, "{}={}/", op::DEFAULT_PATH, samples_folder);

    for group in source.non_empty_groups() {
        text.push_str("\n<group>\n");
        if !group.name.is_empty() {
            let _ = writeln!(text, "{}={}", op::GROUP_LABEL, group.name);
        }
        if group.trigger != Trigger::Attack {
            let _ = writeln!(text, "{}={}", op::TRIGGER, trigger_value(group.trigger));
        }
        if group.is_round_robin() {
            let _ = writeln!(text, "{}={}", op::SEQ_LENGTH, group.zones.len());
        }

        for zone in &group.zones {
            write_region(&mut text, zone);
        }
    }
    text
}

fn write_region(text: &mut String, zone: &SampleZone) {
    let _ = writeln!(text, "\n<region>");
    let _ = writeln!(text, "{}={}.wav", op::SAMPLE, zone.name);

    let _ = writeln!(text, "{}={}", op::LOKEY, zone.key_low);
    let _ = writeln!(text, "{}={}", op::HIKEY, zone.key_high);
    if let Some(root) = zone.key_root {
        let _ = writeln!(text, "{}={}", op::PITCH_KEYCENTER, root);
    }
    if zone.note_crossfade_low > 0 {
        let low = zone.key_low.saturating_sub(zone.note_crossfade_low);
        let _ = writeln!(text, "{}={}", op::XFIN_LOKEY, low);
        let _ = writeln!(text, "{}={}", op::XFIN_HIKEY, zone.key_low);
    }
    if zone.note_crossfade_high > 0 {
        let high = zone.key_high.saturating_add(zone.note_crossfade_high).min(127);
        let _ = writeln!(text, "{}={}", op::XFOUT_LOKEY, zone.key_high);
        let _ = writeln!(text, "{}={}", op::XFOUT_HIKEY, high);
    }

    let _ = writeln!(text, "{}={}", op::LOVEL, zone.velocity_low);
    let _ = writeln!(text, "{}={}", op::HIVEL, zone.velocity_high);
    if zone.velocity_crossfade_low > 0 {
        let low = zone.velocity_low.saturating_sub(zone.velocity_crossfade_low).max(1);
        let _ = writeln!(text, "{}={}", op::XFIN_LOVEL, low);
        let _ = writeln!(text, "{}={}", op::XFIN_HIVEL, zone.velocity_low);
    }
    if zone.velocity_crossfade_high > 0 {
        let high = zone
            .velocity_high
            .saturating_add(zone.velocity_crossfade_high)
            .min(127);
        let _ = writeln!(text, "{}={}", op::XFOUT_LOVEL, zone.velocity_high);
        let _ = writeln!(text, "{}={}", op::XFOUT_HIVEL, high);
    }

    if zone.start > 0 {
        let _ = writeln!(text, "{}={}", op::OFFSET, zone.start);
    }
    if zone.stop > 0 {
        let _ = writeln!(text, "{}={}", op::END, zone.stop - 1);
    }
    if zone.is_reversed {
        let _ = writeln!(text, "{}=reverse", op::DIRECTION);
    }
    if zone.trigger != Trigger::Attack {
        let _ = writeln!(text, "{}={}", op::TRIGGER, trigger_value(zone.trigger));
    }
    if zone.play_logic == PlayLogic::RoundRobin {
        if let Some(position) = zone.sequence_position {
            let _ = writeln!(text, "{}={}", op::SEQ_POSITION, position);
        }
    }

    if zone.gain != 1.0 {
        let _ = writeln!(text, "{}={}", op::VOLUME, round3(value_to_db(zone.gain)));
    }
    if zone.panorama != 0.0 {
        let _ = writeln!(text, "{}={}", op::PAN, round3(zone.panorama * 100.0));
    }
    if zone.tune != 0.0 {
        // Whole semitones go to transpose, the cent remainder to tune.
        let semitones = zone.tune.trunc() as i32;
        let cents = (zone.tune.fract() * 100.0).round() as i32;
        if semitones != 0 {
            let _ = writeln!(text, "{}={}", op::TRANSPOSE, semitones);
        }
        if cents != 0 {
            let _ = writeln!(text, "{}={}", op::TUNE, cents);
        }
    }
    if zone.key_tracking != 1.0 {
        let _ = writeln!(text, "{}={}", op::PITCH_KEYTRACK, round3(zone.key_tracking * 100.0));
    }
    if zone.bend_up != 0 {
        let _ = writeln!(text, "{}={}", op::BEND_UP, zone.bend_up);
    }
    if zone.bend_down != 0 {
        let _ = writeln!(text, "{}={}", op::BEND_DOWN, zone.bend_down);
    }
    if zone.amplitude_velocity_depth != 1.0 {
        let _ = writeln!(
            text,
            "{}={}",
            op::AMP_VELTRACK,
            round3(zone.amplitude_velocity_depth * 100.0)
        );
    }

    if let Some(lp) = zone.loops.first() {
        let _ = writeln!(text, "{}=loop_continuous", op::LOOP_MODE);
        match lp.loop_type {
            LoopType::Forwards => {}
            LoopType::Alternating => {
                let _ = writeln!(text, "{}=alternate", op::LOOP_TYPE);
            }
            LoopType::Backwards => {
                let _ = writeln!(text, "{}=backward", op::LOOP_TYPE);
            }
        }
        let _ = writeln!(text, "{}={}", op::LOOP_START, lp.start);
        let _ = writeln!(text, "{}={}", op::LOOP_END, lp.end);
        if lp.crossfade > 0.0 {
            if let Some(data) = &zone.sample_data {
                if let Ok(metadata) = data.audio_metadata() {
                    let seconds = lp.crossfade_in_seconds(metadata.sample_rate);
                    let _ = writeln!(text, "{}={}", op::LOOP_CROSSFADE, round3(seconds));
                }
            }
        }
    } else {
        let _ = writeln!(text, "{}=no_loop", op::LOOP_MODE);
    }

    write_envelope(text, &zone.amplitude_envelope.envelope, "ampeg");
    if zone.pitch_envelope.depth != 0.0 {
        let _ = writeln!(
            text,
            "{}={}",
            op::PITCHEG_DEPTH,
            (zone.pitch_envelope.depth * op::PITCH_ENVELOPE_DEPTH_CENTS).round()
        );
        write_envelope(text, &zone.pitch_envelope.envelope, "pitcheg");
    }

    if let Some(filter) = &zone.filter {
        let _ = writeln!(text, "{}={}", op::FIL_TYPE, filter_type_value(filter.filter_type, filter.poles));
        let _ = writeln!(text, "{}={}", op::CUTOFF, round3(filter.cutoff));
        if filter.resonance > 0.0 {
            let _ = writeln!(text, "{}={}", op::RESONANCE, round3(filter.resonance * 40.0));
        }
        if filter.cutoff_velocity_depth != 0.0 {
            let _ = writeln!(
                text,
                "{}={}",
                op::FIL_VELTRACK,
                (filter.cutoff_velocity_depth * op::FILTER_VELOCITY_DEPTH_CENTS).round()
            );
        }
        if filter.cutoff_envelope.depth != 0.0 {
            let _ = writeln!(
                text,
                "{}={}",
                op::FILEG_DEPTH,
                (filter.cutoff_envelope.depth * op::FILTER_ENVELOPE_DEPTH_CENTS).round()
            );
            write_envelope(text, &filter.cutoff_envelope.envelope, "fileg");
        }
    }
}

fn write_envelope(text: &mut String, envelope: &Envelope, prefix: &str) {
    let mut write_time = |suffix: &str, value: Option<f64>| {
        if let Some(v) = value {
            let _ = writeln!(text, "{prefix}_{suffix}={}", round3(v));
        }
    };
    write_time("delay", envelope.delay_time);
    write_time("attack", envelope.attack_time);
    write_time("hold", envelope.hold_time);
    write_time("decay", envelope.decay_time);
    write_time("release", envelope.release_time);
    if let Some(sustain) = envelope.sustain_level {
        let _ = writeln!(text, "{prefix}_sustain={}", round3(sustain * 100.0));
    }
    if let Some(start) = envelope.start_level {
        let _ = writeln!(text, "{prefix}_start={}", round3(start * 100.0));
    }
}

fn trigger_value(trigger: Trigger) -> &'static str {
    match trigger {
        Trigger::Attack => "attack",
        Trigger::Release => "release",
        Trigger::First => "first",
        Trigger::Legato => "legato",
    }
}

fn filter_type_value(filter_type: FilterType, poles: u8) -> String {
    let prefix = match filter_type {
        FilterType::LowPass => "lpf",
        FilterType::HighPass => "hpf",
        FilterType::BandPass => "bpf",
        FilterType::BandReject => "brf",
    };
    let poles = match poles {
        1 => 1,
        4 => 4,
        _ => 2,
    };
    format!("{prefix}_{poles}p")
}

/// Formats a float with at most three decimals, trimming trailing zeros.
fn round3(value: f64) -> String {
    let text = format!("{value:.3}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
