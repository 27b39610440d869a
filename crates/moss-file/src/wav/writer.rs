//! RIFF/WAVE emission.

use std::io::Write;

use crate::error::FileResult;
use crate::stream::StreamWriter;

use super::chunks::{BroadcastChunk, CuePoint, InfoEntry, InstrumentChunk, SampleChunk};
use super::WavFile;

/// Writes a complete WAV file.
///
/// Chunk order: `fmt `, broadcast, sampler, instrument, cues, INFO list,
/// preserved unknown chunks, then `data` last. Odd-sized chunks are
/// followed by one pad byte that is not counted in their declared size.
pub fn write<W: Write>(wav: &WavFile, out: W) -> FileResult<()> {
    let mut chunks: Vec<([u8; 4], Vec<u8>)> = Vec::new();

    chunks.push((*b"fmt ", format_payload(wav)));
    if let Some(bext) = &wav.broadcast_chunk {
        chunks.push((*b"bext", broadcast_payload(bext)?));
    }
    if let Some(smpl) = &wav.sample_chunk {
        chunks.push((*b"smpl", sample_payload(smpl)?));
    }
    if let Some(inst) = &wav.instrument_chunk {
        chunks.push((*b"inst", instrument_payload(inst)));
    }
    if !wav.cue_points.is_empty() {
        chunks.push((*b"cue ", cue_payload(&wav.cue_points)?));
    }
    if !wav.info_entries.is_empty() {
        chunks.push((*b"LIST", info_payload(&wav.info_entries)?));
    }
    for raw in &wav.unknown_chunks {
        chunks.push((raw.id, raw.data.clone()));
    }
    chunks.push((*b"data", wav.data.clone()));

    let riff_size: u64 = 4 + chunks
        .iter()
        .map(|(_, payload)| 8 + payload.len() as u64 + (payload.len() % 2) as u64)
        .sum::<u64>();

    let mut writer = StreamWriter::new(out);
    writer.write_bytes(b"RIFF")?;
    writer.write_u32_le(riff_size as u32)?;
    writer.write_bytes(b"WAVE")?;
    for (id, payload) in &chunks {
        writer.write_bytes(id)?;
        writer.write_u32_le(payload.len() as u32)?;
        writer.write_bytes(payload)?;
        if payload.len() % 2 == 1 {
            writer.write_u8(0)?;
        }
    }
    Ok(())
}

fn format_payload(wav: &WavFile) -> Vec<u8> {
    let format = &wav.format;
    let mut payload = Vec::with_capacity(16 + format.extension.len());
    payload.extend_from_slice(&format.format_tag.to_le_bytes());
    payload.extend_from_slice(&format.channels.to_le_bytes());
    payload.extend_from_slice(&format.sample_rate.to_le_bytes());
    payload.extend_from_slice(&format.avg_bytes_per_sec.to_le_bytes());
    payload.extend_from_slice(&format.block_align.to_le_bytes());
    payload.extend_from_slice(&format.bits_per_sample.to_le_bytes());
    payload.extend_from_slice(&format.extension);
    payload
}

fn sample_payload(smpl: &SampleChunk) -> FileResult<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());
    writer.write_u32_le(smpl.manufacturer)?;
    writer.write_u32_le(smpl.product)?;
    writer.write_u32_le(smpl.sample_period)?;
    writer.write_u32_le(smpl.midi_unity_note)?;
    writer.write_u32_le(smpl.midi_pitch_fraction)?;
    writer.write_u32_le(smpl.smpte_format)?;
    writer.write_u32_le(smpl.smpte_offset)?;
    writer.write_u32_le(smpl.loops.len() as u32)?;
    writer.write_u32_le(smpl.sampler_data.len() as u32)?;
    for lp in &smpl.loops {
        writer.write_u32_le(lp.identifier)?;
        writer.write_u32_le(lp.loop_type)?;
        writer.write_u32_le(lp.start)?;
        writer.write_u32_le(lp.end)?;
        writer.write_u32_le(lp.fraction)?;
        writer.write_u32_le(lp.play_count)?;
    }
    writer.write_bytes(&smpl.sampler_data)?;
    Ok(writer.into_inner())
}

fn instrument_payload(inst: &InstrumentChunk) -> Vec<u8> {
    vec![
        inst.unshifted_note,
        inst.fine_tune as u8,
        inst.gain_db as u8,
        inst.low_note,
        inst.high_note,
        inst.low_velocity,
        inst.high_velocity,
    ]
}

fn broadcast_payload(bext: &BroadcastChunk) -> FileResult<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());
    writer.write_ascii_padded(&bext.description, 256)?;
    writer.write_ascii_padded(&bext.originator, 32)?;
    writer.write_ascii_padded(&bext.originator_reference, 32)?;
    writer.write_ascii_padded(&bext.origination_date, 10)?;
    writer.write_ascii_padded(&bext.origination_time, 8)?;
    writer.write_u64_le(bext.time_reference)?;
    writer.write_u16_le(bext.version)?;
    if bext.rest.is_empty() {
        // Version 1 reserve: UMID plus reserved bytes.
        writer.write_bytes(&[0u8; 64 + 190])?;
    } else {
        writer.write_bytes(&bext.rest)?;
    }
    Ok(writer.into_inner())
}

fn cue_payload(points: &[CuePoint]) -> FileResult<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());
    writer.write_u32_le(points.len() as u32)?;
    for point in points {
        writer.write_u32_le(point.identifier)?;
        writer.write_u32_le(point.position)?;
        writer.write_bytes(&point.data_chunk_id)?;
        writer.write_u32_le(point.chunk_start)?;
        writer.write_u32_le(point.block_start)?;
        writer.write_u32_le(point.sample_offset)?;
    }
    Ok(writer.into_inner())
}

fn info_payload(entries: &[InfoEntry]) -> FileResult<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());
    writer.write_bytes(b"INFO")?;
    for entry in entries {
        // Entry text is zero terminated and padded to an even length.
        let mut text: Vec<u8> = entry.text.bytes().collect();
        text.push(0);
        if text.len() % 2 == 1 {
            text.push(0);
        }
        writer.write_bytes(&entry.id)?;
        writer.write_u32_le(text.len() as u32)?;
        writer.write_bytes(&text)?;
    }
    Ok(writer.into_inner())
}
