//! `.dspreset` emission.

use moss_core::{Group, LoopType, MultisampleSource, PlayLogic, SampleZone, Trigger};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::{FormatError, FormatResult};

/// Renders a multisample as Decent Sampler preset XML. Sample paths
/// point into `samples_folder`.
pub fn write_dspreset(source: &MultisampleSource, samples_folder: &str) -> FormatResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("DecentSampler");
    root.push_attribute(("minVersion", "1.0.0"));
    if !source.metadata.creator.is_empty() {
        root.push_attribute(("author", source.metadata.creator.as_str()));
    }
    if !source.metadata.description.is_empty() {
        root.push_attribute(("description", source.metadata.description.as_str()));
    }
    if !source.metadata.category.is_empty() {
        root.push_attribute(("category", source.metadata.category.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("groups")))
        .map_err(xml_error)?;
    for group in source.non_empty_groups() {
        write_group(&mut writer, group, samples_folder)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("groups")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("DecentSampler")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| FormatError::malformed(format!("generated invalid UTF-8: {e}")))
}

fn write_group<W: std::io::Write>(
    writer: &mut Writer<W>,
    group: &Group,
    samples_folder: &str,
) -> FormatResult<()> {
    let mut element = BytesStart::new("group");
    if !group.name.is_empty() {
        element.push_attribute(("name", group.name.as_str()));
    }
    if group.trigger != Trigger::Attack {
        element.push_attribute(("trigger", trigger_value(group.trigger)));
    }
    if group.is_round_robin() {
        element.push_attribute(("seqMode", "round_robin"));
        element.push_attribute(("seqLength", group.zones.len().to_string().as_str()));
    }

    // The amplitude envelope lives at group level in this format.
    if let Some(zone) = group.zones.first() {
        let envelope = &zone.amplitude_envelope.envelope;
        if let Some(attack) = envelope.attack_time {
            element.push_attribute(("attack", format_value(attack).as_str()));
        }
        if let Some(decay) = envelope.decay_time {
            element.push_attribute(("decay", format_value(decay).as_str()));
        }
        if let Some(sustain) = envelope.sustain_level {
            element.push_attribute(("sustain", format_value(sustain).as_str()));
        }
        if let Some(release) = envelope.release_time {
            element.push_attribute(("release", format_value(release).as_str()));
        }
    }
    writer.write_event(Event::Start(element)).map_err(xml_error)?;

    for zone in &group.zones {
        write_sample(writer, zone, samples_folder)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("group")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_sample<W: std::io::Write>(
    writer: &mut Writer<W>,
    zone: &SampleZone,
    samples_folder: &str,
) -> FormatResult<()> {
    let mut element = BytesStart::new("sample");
    let path = format!("{samples_folder}/{}.wav", zone.name);
    element.push_attribute(("path", path.as_str()));

    element.push_attribute(("rootNote", zone.effective_key_root().to_string().as_str()));
    element.push_attribute(("loNote", zone.key_low.to_string().as_str()));
    element.push_attribute(("hiNote", zone.key_high.to_string().as_str()));
    element.push_attribute(("loVel", zone.velocity_low.to_string().as_str()));
    element.push_attribute(("hiVel", zone.velocity_high.to_string().as_str()));

    if zone.start > 0 {
        element.push_attribute(("start", zone.start.to_string().as_str()));
    }
    if zone.stop > 0 {
        element.push_attribute(("end", (zone.stop - 1).to_string().as_str()));
    }
    if zone.gain != 1.0 {
        element.push_attribute(("volume", format_value(zone.gain).as_str()));
    }
    if zone.panorama != 0.0 {
        element.push_attribute(("pan", format_value(zone.panorama * 100.0).as_str()));
    }
    if zone.tune != 0.0 {
        element.push_attribute(("tuning", format_value(zone.tune).as_str()));
    }
    if zone.key_tracking == 0.0 {
        element.push_attribute(("pitchKeyTrack", "0"));
    }
    if zone.trigger != Trigger::Attack {
        element.push_attribute(("trigger", trigger_value(zone.trigger)));
    }
    if zone.play_logic == PlayLogic::RoundRobin {
        if let Some(position) = zone.sequence_position {
            element.push_attribute(("seqPosition", position.to_string().as_str()));
        }
    }

    if let Some(lp) = zone.loops.first() {
        element.push_attribute(("loopEnabled", "true"));
        element.push_attribute(("loopStart", lp.start.to_string().as_str()));
        element.push_attribute(("loopEnd", lp.end.to_string().as_str()));
        if lp.crossfade > 0.0 {
            element.push_attribute((
                "loopCrossfade",
                lp.crossfade_in_frames().to_string().as_str(),
            ));
        }
        if lp.loop_type != LoopType::Forwards {
            return Err(FormatError::malformed(
                "Decent Sampler supports only forward loops",
            ));
        }
    }

    writer.write_event(Event::Empty(element)).map_err(xml_error)?;
    Ok(())
}

fn trigger_value(trigger: Trigger) -> &'static str {
    match trigger {
        Trigger::Attack => "attack",
        Trigger::Release => "release",
        Trigger::First => "first",
        Trigger::Legato => "legato",
    }
}

/// Formats a float without a trailing `.0` for whole values.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value:.4}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub(super) fn xml_error(error: impl std::fmt::Display) -> FormatError {
    FormatError::malformed(format!("XML error: {error}"))
}
