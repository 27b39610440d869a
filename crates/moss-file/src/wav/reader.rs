//! RIFF/WAVE parsing.

use std::io::Read;

use crate::error::{FileError, FileResult};
use crate::stream::StreamReader;

use super::chunks::{
    BroadcastChunk, CuePoint, InfoEntry, InstrumentChunk, RawChunk, SampleChunk, WavLoop,
};
use super::format::FormatChunk;
use super::WavFile;

/// Parses a complete WAV file from a reader.
pub fn parse<R: Read>(input: R) -> FileResult<WavFile> {
    let mut reader = StreamReader::new(input);
    reader.read_tag(b"RIFF")?;
    let riff_size = reader.read_u32_le()? as u64;
    reader.read_tag(b"WAVE")?;

    let mut format: Option<FormatChunk> = None;
    let mut data: Option<Vec<u8>> = None;
    let mut sample_chunk = None;
    let mut instrument_chunk = None;
    let mut broadcast_chunk = None;
    let mut cue_points = Vec::new();
    let mut info_entries = Vec::new();
    let mut unknown_chunks = Vec::new();

    // Bytes remaining after the WAVE form type.
    let mut remaining = riff_size.saturating_sub(4);
    while remaining >= 8 {
        let id_bytes = reader.read_bytes(4)?;
        let id: [u8; 4] = id_bytes.as_slice().try_into().unwrap();
        let size = reader.read_u32_le()? as usize;
        let payload = reader.read_bytes(size)?;
        let mut consumed = 8 + size as u64;
        // Chunks are word aligned; an odd payload is followed by one pad
        // byte that is not counted in the declared size.
        if size % 2 == 1 {
            reader.read_u8()?;
            consumed += 1;
        }
        remaining = remaining.saturating_sub(consumed);

        match &id {
            b"fmt " => format = Some(parse_format(&payload)?),
            b"data" => data = Some(payload),
            b"smpl" => sample_chunk = Some(parse_sample(&payload)?),
            b"inst" => instrument_chunk = Some(parse_instrument(&payload)?),
            b"bext" => broadcast_chunk = Some(parse_broadcast(&payload)?),
            b"cue " => cue_points = parse_cue(&payload)?,
            b"LIST" if payload.starts_with(b"INFO") => {
                info_entries = parse_info(&payload[4..])?;
            }
            _ => unknown_chunks.push(RawChunk {
                id,
                data: payload,
            }),
        }
    }

    let format = format.ok_or_else(|| FileError::format("missing fmt chunk"))?;
    format.ensure_supported()?;
    let data = data.ok_or_else(|| FileError::format("missing data chunk"))?;

    Ok(WavFile {
        format,
        data,
        sample_chunk,
        instrument_chunk,
        broadcast_chunk,
        cue_points,
        info_entries,
        unknown_chunks,
    })
}

fn parse_format(payload: &[u8]) -> FileResult<FormatChunk> {
    if payload.len() < 16 {
        return Err(FileError::format(format!(
            "fmt chunk too short: {} bytes",
            payload.len()
        )));
    }
    let mut reader = StreamReader::new(payload);
    Ok(FormatChunk {
        format_tag: reader.read_u16_le()?,
        channels: reader.read_u16_le()?,
        sample_rate: reader.read_u32_le()?,
        avg_bytes_per_sec: reader.read_u32_le()?,
        block_align: reader.read_u16_le()?,
        bits_per_sample: reader.read_u16_le()?,
        extension: payload[16..].to_vec(),
    })
}

fn parse_sample(payload: &[u8]) -> FileResult<SampleChunk> {
    if payload.len() < 36 {
        return Err(FileError::format("smpl chunk too short"));
    }
    let mut reader = StreamReader::new(payload);
    let manufacturer = reader.read_u32_le()?;
    let product = reader.read_u32_le()?;
    let sample_period = reader.read_u32_le()?;
    let midi_unity_note = reader.read_u32_le()?;
    let midi_pitch_fraction = reader.read_u32_le()?;
    let smpte_format = reader.read_u32_le()?;
    let smpte_offset = reader.read_u32_le()?;
    let loop_count = reader.read_u32_le()? as usize;
    let sampler_data_size = reader.read_u32_le()? as usize;

    let mut loops = Vec::with_capacity(loop_count.min(1024));
    for _ in 0..loop_count {
        loops.push(WavLoop {
            identifier: reader.read_u32_le()?,
            loop_type: reader.read_u32_le()?,
            start: reader.read_u32_le()?,
            end: reader.read_u32_le()?,
            fraction: reader.read_u32_le()?,
            play_count: reader.read_u32_le()?,
        });
    }
    let sampler_data = reader.read_bytes(sampler_data_size.min(payload.len()))?;

    Ok(SampleChunk {
        manufacturer,
        product,
        sample_period,
        midi_unity_note,
        midi_pitch_fraction,
        smpte_format,
        smpte_offset,
        loops,
        sampler_data,
    })
}

fn parse_instrument(payload: &[u8]) -> FileResult<InstrumentChunk> {
    if payload.len() < 7 {
        return Err(FileError::format("inst chunk too short"));
    }
    Ok(InstrumentChunk {
        unshifted_note: payload[0],
        fine_tune: payload[1] as i8,
        gain_db: payload[2] as i8,
        low_note: payload[3],
        high_note: payload[4],
        low_velocity: payload[5],
        high_velocity: payload[6],
    })
}

fn parse_broadcast(payload: &[u8]) -> FileResult<BroadcastChunk> {
    if payload.len() < 348 {
        return Err(FileError::format("bext chunk too short"));
    }
    let mut reader = StreamReader::new(payload);
    Ok(BroadcastChunk {
        description: reader.read_ascii(256)?,
        originator: reader.read_ascii(32)?,
        originator_reference: reader.read_ascii(32)?,
        origination_date: reader.read_ascii(10)?,
        origination_time: reader.read_ascii(8)?,
        time_reference: reader.read_u64_le()?,
        version: reader.read_u16_le()?,
        rest: payload[348..].to_vec(),
    })
}

fn parse_cue(payload: &[u8]) -> FileResult<Vec<CuePoint>> {
    let mut reader = StreamReader::new(payload);
    let count = reader.read_u32_le()? as usize;
    let mut points = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let identifier = reader.read_u32_le()?;
        let position = reader.read_u32_le()?;
        let id_bytes = reader.read_bytes(4)?;
        points.push(CuePoint {
            identifier,
            position,
            data_chunk_id: id_bytes.as_slice().try_into().unwrap(),
            chunk_start: reader.read_u32_le()?,
            block_start: reader.read_u32_le()?,
            sample_offset: reader.read_u32_le()?,
        });
    }
    Ok(points)
}

fn parse_info(mut payload: &[u8]) -> FileResult<Vec<InfoEntry>> {
    let mut entries = Vec::new();
    while payload.len() >= 8 {
        let id: [u8; 4] = payload[..4].try_into().unwrap();
        let size = u32::from_le_bytes(payload[4..8].try_into().unwrap()) as usize;
        if payload.len() < 8 + size {
            return Err(FileError::format("truncated LIST INFO entry"));
        }
        let raw = &payload[8..8 + size];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        entries.push(InfoEntry {
            id,
            text: String::from_utf8_lossy(&raw[..end]).into_owned(),
        });
        let advance = 8 + size + size % 2;
        payload = &payload[advance.min(payload.len())..];
    }
    Ok(entries)
}
