//! korgmultisample emission.

use moss_core::{Group, Metadata, SampleZone};
use moss_file::{FileResult, StreamWriter};

use super::format::*;

/// Serializes one group as a complete korgmultisample file.
///
/// The format holds a single layer of key zones, so a multi-group
/// instrument is split into one file per group by the creator.
pub fn write_korgmultisample(
    name: &str,
    group: &Group,
    metadata: &Metadata,
    creation_time: i64,
    uuid: [u8; 16],
) -> FileResult<Vec<u8>> {
    let body = write_body(name, group, metadata, uuid)?;

    let mut writer = StreamWriter::new(Vec::new());
    writer.write_bytes(TAG_KORG)?;
    writer.write_bytes(&HEADER_BYTES)?;
    writer.write_ascii_prefixed(TAG_EXTENDED_FILE_INFO)?;
    writer.write_bytes(&EXTENDED_FILE_INFO_BYTES)?;
    writer.write_ascii_prefixed(TAG_MULTI_SAMPLE)?;
    writer.write_bytes(&MULTI_SAMPLE_BYTES)?;
    writer.write_ascii_prefixed(TAG_SINGLE_ITEM)?;
    writer.write_u8(SINGLE_ITEM_BYTE)?;
    writer.write_ascii_prefixed(APPLICATION_NAME)?;
    writer.write_u8(ID_TIME)?;
    writer.write_i64_le(creation_time)?;
    writer.write_u32_le(body.len() as u32)?;
    writer.write_bytes(&body)?;
    Ok(writer.into_inner())
}

fn write_body(
    name: &str,
    group: &Group,
    metadata: &Metadata,
    uuid: [u8; 16],
) -> FileResult<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());

    for zone in &group.zones {
        let block = write_sample_block(zone)?;
        writer.write_u8(ID_SAMPLE_BLOCK)?;
        writer.write_varint(block.len() as u64)?;
        writer.write_bytes(&block)?;
    }

    if !metadata.creator.is_empty() {
        writer.write_u8(ID_AUTHOR)?;
        writer.write_ascii_prefixed(&metadata.creator)?;
    }
    if !metadata.category.is_empty() {
        writer.write_u8(ID_CATEGORY)?;
        writer.write_ascii_prefixed(&metadata.category)?;
    }
    if !metadata.description.is_empty() {
        writer.write_u8(ID_COMMENT)?;
        writer.write_ascii_prefixed(&metadata.description)?;
    }
    writer.write_u8(ID_SAMPLE)?;
    writer.write_ascii_prefixed(name)?;

    writer.write_u8(ID_UUID)?;
    writer.write_u8(16)?;
    writer.write_bytes(&uuid)?;

    Ok(writer.into_inner())
}

fn write_sample_block(zone: &SampleZone) -> FileResult<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());
    writer.write_ascii_prefixed(&format!("{}.wav", zone.name))?;

    // Sample parameters, ascending IDs.
    writer.write_u8(ID_START)?;
    writer.write_varint(zone.start)?;
    let lp = zone.loops.first();
    if let Some(lp) = lp {
        writer.write_u8(ID_LOOP_START)?;
        writer.write_varint(lp.start)?;
    }
    writer.write_u8(ID_END)?;
    writer.write_varint(zone.stop)?;
    if lp.is_none() {
        writer.write_u8(ID_ONE_SHOT)?;
        writer.write_u8(1)?;
    }
    let boost = zone.gain > 1.0;
    if boost {
        writer.write_u8(ID_BOOST_12DB)?;
        writer.write_u8(1)?;
    }

    // Key-zone parameters, ascending IDs; the restart at a lower ID is
    // what delimits the two sections.
    writer.write_u8(ID_KEY_BOTTOM)?;
    writer.write_u8(zone.key_low)?;
    writer.write_u8(ID_KEY_TOP)?;
    writer.write_u8(zone.key_high)?;
    writer.write_u8(ID_KEY_ORIGINAL)?;
    writer.write_u8(zone.effective_key_root())?;
    if zone.key_tracking == 0.0 {
        writer.write_u8(ID_FIXED_PITCH)?;
        writer.write_u8(1)?;
    }
    writer.write_u8(ID_TUNE)?;
    writer.write_f32_le((zone.tune * 1000.0).clamp(-999.0, 999.0) as f32)?;

    let level = if boost {
        zone.gain / BOOST_12DB_FACTOR
    } else {
        zone.gain
    };
    let level_value = (level.clamp(0.0, 1.0) * 1000.0) as f32;
    writer.write_u8(ID_LEVEL_LEFT)?;
    writer.write_f32_le(level_value)?;
    writer.write_u8(ID_LEVEL_RIGHT)?;
    writer.write_f32_le(level_value)?;

    writer.write_u8(ID_COLOR)?;
    writer.write_bytes(&COLOR_BYTES)?;

    Ok(writer.into_inner())
}
