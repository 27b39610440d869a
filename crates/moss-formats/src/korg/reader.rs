//! korgmultisample parsing.

use std::io::Read;

use moss_core::{Metadata, SampleLoop, SampleZone};
use moss_file::{FileError, FileResult, StreamReader};

use super::format::*;

/// The decoded content of one korgmultisample file.
#[derive(Debug)]
pub struct KorgFile {
    /// Multisample name from the body, if present.
    pub name: Option<String>,
    /// Decoded metadata.
    pub metadata: Metadata,
    /// The single group of key zones, with sample filenames in
    /// [`KorgZone::file_name`].
    pub zones: Vec<KorgZone>,
}

/// One decoded key zone plus its referenced sample file.
#[derive(Debug)]
pub struct KorgZone {
    /// Sample filename as stored in the file.
    pub file_name: String,
    /// The zone with all decoded parameters.
    pub zone: SampleZone,
}

/// Parses a korgmultisample file.
pub fn read_korgmultisample<R: Read>(input: R) -> FileResult<KorgFile> {
    let mut reader = StreamReader::new(input);
    reader.read_tag(TAG_KORG)?;
    reader.read_tag(&HEADER_BYTES)?;
    expect_ascii(&mut reader, TAG_EXTENDED_FILE_INFO)?;
    reader.read_tag(&EXTENDED_FILE_INFO_BYTES)?;
    expect_ascii(&mut reader, TAG_MULTI_SAMPLE)?;
    reader.read_tag(&MULTI_SAMPLE_BYTES)?;
    expect_ascii(&mut reader, TAG_SINGLE_ITEM)?;
    reader.read_tag(&[SINGLE_ITEM_BYTE])?;
    // Name of the application that wrote the file; not verified.
    reader.read_ascii_prefixed()?;

    reader.read_tag(&[ID_TIME])?;
    let creation_time = reader.read_i64_le()?;

    let body_size = reader.read_u32_le()? as usize;
    let body = reader.read_bytes(body_size)?;
    let mut file = parse_body(&body)?;
    file.metadata.creation_time = Some(creation_time);
    Ok(file)
}

fn expect_ascii<R: Read>(reader: &mut StreamReader<R>, expected: &str) -> FileResult<()> {
    let actual = reader.read_ascii_prefixed()?;
    if actual != expected {
        return Err(FileError::format(format!(
            "expected tag '{expected}', found '{actual}'"
        )));
    }
    Ok(())
}

fn parse_body(body: &[u8]) -> FileResult<KorgFile> {
    let mut reader = StreamReader::new(body);
    let mut file = KorgFile {
        name: None,
        metadata: Metadata::default(),
        zones: Vec::new(),
    };

    loop {
        let id = match reader.read_u8() {
            Ok(id) => id,
            Err(_) => break,
        };
        match id {
            ID_SAMPLE_BLOCK => {
                let (length, _) = reader.read_varint()?;
                let block = reader.read_bytes(length as usize)?;
                file.zones.push(parse_sample_block(&block)?);
            }
            ID_AUTHOR => file.metadata.creator = reader.read_ascii_prefixed()?,
            ID_CATEGORY => file.metadata.category = reader.read_ascii_prefixed()?,
            ID_COMMENT => file.metadata.description = reader.read_ascii_prefixed()?,
            ID_SAMPLE => file.name = Some(reader.read_ascii_prefixed()?),
            ID_UUID => {
                let length = reader.read_u8()? as usize;
                reader.read_bytes(length)?;
            }
            other => {
                return Err(FileError::format(format!(
                    "unknown block ID 0x{other:02X} in body"
                )))
            }
        }
    }
    Ok(file)
}

fn parse_sample_block(block: &[u8]) -> FileResult<KorgZone> {
    let mut reader = StreamReader::new(block);
    let file_name = reader.read_ascii_prefixed()?;
    let stem = file_name
        .strip_suffix(".wav")
        .or_else(|| file_name.strip_suffix(".WAV"))
        .unwrap_or(&file_name);
    let mut zone = SampleZone::new(stem);

    let mut loop_start: Option<u64> = None;
    let mut one_shot = false;
    let mut boost = false;

    // Sample parameters: IDs ascend; a non-ascending ID belongs to the
    // key-zone section and is pushed back.
    let mut last_id = 0u8;
    loop {
        let Ok(id) = reader.read_u8() else {
            return Err(FileError::format("sample block without key zone"));
        };
        if id <= last_id {
            reader.unread_byte(id);
            break;
        }
        match id {
            ID_START => zone.start = reader.read_varint()?.0,
            ID_LOOP_START => loop_start = Some(reader.read_varint()?.0),
            ID_END => zone.stop = reader.read_varint()?.0,
            ID_LOOP_TUNE => {
                reader.read_bytes(4)?;
            }
            ID_ONE_SHOT => one_shot = reader.read_u8()? != 0,
            ID_BOOST_12DB => boost = reader.read_u8()? != 0,
            other => {
                reader.unread_byte(other);
                break;
            }
        }
        last_id = id;
    }

    // Key-zone parameters, again with ascending IDs until the block ends.
    let mut level: f64 = 1.0;
    let mut last_id = 0u8;
    loop {
        let Ok(id) = reader.read_u8() else {
            break;
        };
        if id <= last_id {
            return Err(FileError::format(format!(
                "non-ascending key-zone parameter ID 0x{id:02X}"
            )));
        }
        match id {
            ID_KEY_BOTTOM => zone.key_low = reader.read_u8()?.min(127),
            ID_KEY_TOP => zone.key_high = reader.read_u8()?.min(127),
            ID_KEY_ORIGINAL => zone.key_root = Some(reader.read_u8()?.min(127)),
            ID_FIXED_PITCH => {
                if reader.read_u8()? != 0 {
                    zone.key_tracking = 0.0;
                }
            }
            ID_TUNE => zone.tune = f64::from(reader.read_f32_le()?) / 1000.0,
            ID_LEVEL_LEFT => level = f64::from(reader.read_f32_le()?) / 1000.0,
            ID_LEVEL_RIGHT => {
                // Mono-compatible files carry the same level on both
                // sides; the right value is redundant.
                reader.read_f32_le()?;
            }
            ID_COLOR => {
                reader.read_bytes(COLOR_BYTES.len())?;
            }
            other => {
                return Err(FileError::format(format!(
                    "unknown key-zone parameter ID 0x{other:02X}"
                )))
            }
        }
        last_id = id;
    }

    zone.gain = (level * if boost { BOOST_12DB_FACTOR } else { 1.0 }).clamp(0.125, 24.0);
    if !one_shot {
        if let Some(start) = loop_start {
            zone.loops.push(SampleLoop::forwards(
                start,
                zone.stop.saturating_sub(1),
            ));
        }
    }
    Ok(KorgZone { file_name, zone })
}
