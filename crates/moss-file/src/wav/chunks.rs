//! Sampler-related and descriptive RIFF chunks.

use moss_core::sample_loop::{LoopType, SampleLoop};

/// Scale of the `smpl` pitch-fraction field: 0x80000000 is 50 cents.
const PITCH_FRACTION_SCALE: f64 = 0x8000_0000u32 as f64 / 50.0;

/// One loop record of a `smpl` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavLoop {
    /// Cue identifier of the loop.
    pub identifier: u32,
    /// 0 = forward, 1 = alternating, 2 = backward.
    pub loop_type: u32,
    /// Start frame.
    pub start: u32,
    /// End frame, played inclusively.
    pub end: u32,
    /// Loop fraction scaled to the full u32 range.
    pub fraction: u32,
    /// Repeat count, 0 for infinite.
    pub play_count: u32,
}

impl WavLoop {
    /// Converts to the model loop type.
    pub fn model_loop_type(&self) -> LoopType {
        match self.loop_type {
            1 => LoopType::Alternating,
            2 => LoopType::Backwards,
            _ => LoopType::Forwards,
        }
    }

    /// Converts from the model loop type.
    pub fn type_code(loop_type: LoopType) -> u32 {
        match loop_type {
            LoopType::Forwards => 0,
            LoopType::Alternating => 1,
            LoopType::Backwards => 2,
        }
    }

    /// Converts to a model loop; the fraction becomes the crossfade.
    pub fn to_model(&self) -> SampleLoop {
        SampleLoop {
            loop_type: self.model_loop_type(),
            start: u64::from(self.start),
            end: u64::from(self.end),
            crossfade: f64::from(self.fraction) / 2f64.powi(32),
        }
    }

    /// Converts a model loop into a `smpl` record.
    pub fn from_model(lp: &SampleLoop, identifier: u32) -> Self {
        Self {
            identifier,
            loop_type: Self::type_code(lp.loop_type),
            start: lp.start.min(u32::MAX as u64) as u32,
            end: lp.end.min(u32::MAX as u64) as u32,
            fraction: (lp.crossfade.clamp(0.0, 1.0) * 2f64.powi(32)).min(u32::MAX as f64) as u32,
            play_count: 0,
        }
    }
}

/// The `smpl` chunk: sampler playback hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleChunk {
    /// MMA manufacturer code, 0 when generic.
    pub manufacturer: u32,
    /// Manufacturer product code, 0 when generic.
    pub product: u32,
    /// Period of one sample in nanoseconds.
    pub sample_period: u32,
    /// MIDI note that plays the sample at original pitch.
    pub midi_unity_note: u32,
    /// Fine tune above the unity note; 0x80000000 is 50 cents.
    pub midi_pitch_fraction: u32,
    /// SMPTE format code.
    pub smpte_format: u32,
    /// SMPTE offset.
    pub smpte_offset: u32,
    /// Loop records.
    pub loops: Vec<WavLoop>,
    /// Trailing sampler-specific bytes.
    pub sampler_data: Vec<u8>,
}

impl SampleChunk {
    /// Creates a chunk with the given unity note and sample rate.
    pub fn new(midi_unity_note: u32, sample_rate: u32) -> Self {
        Self {
            manufacturer: 0,
            product: 0,
            sample_period: if sample_rate == 0 {
                0
            } else {
                1_000_000_000 / sample_rate
            },
            midi_unity_note,
            midi_pitch_fraction: 0,
            smpte_format: 0,
            smpte_offset: 0,
            loops: Vec::new(),
            sampler_data: Vec::new(),
        }
    }

    /// The fine tune in cents, `0..=50`.
    pub fn pitch_fraction_cents(&self) -> f64 {
        f64::from(self.midi_pitch_fraction) / PITCH_FRACTION_SCALE
    }

    /// Sets the fine tune from cents, clamped to `0..=50`.
    pub fn set_pitch_fraction_cents(&mut self, cents: f64) {
        self.midi_pitch_fraction = (cents.clamp(0.0, 50.0) * PITCH_FRACTION_SCALE) as u32;
    }

    /// All loops converted to model loops.
    pub fn model_loops(&self) -> Vec<SampleLoop> {
        self.loops.iter().map(WavLoop::to_model).collect()
    }
}

/// The `inst` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentChunk {
    /// MIDI note the sample plays unshifted.
    pub unshifted_note: u8,
    /// Fine tune in cents.
    pub fine_tune: i8,
    /// Gain in dB.
    pub gain_db: i8,
    /// Lowest mapped note.
    pub low_note: u8,
    /// Highest mapped note.
    pub high_note: u8,
    /// Lowest mapped velocity.
    pub low_velocity: u8,
    /// Highest mapped velocity.
    pub high_velocity: u8,
}

impl InstrumentChunk {
    /// An instrument chunk covering the full note and velocity range.
    pub fn full_range(unshifted_note: u8) -> Self {
        Self {
            unshifted_note,
            fine_tune: 0,
            gain_db: 0,
            low_note: 0,
            high_note: 127,
            low_velocity: 1,
            high_velocity: 127,
        }
    }
}

/// The broadcast (`bext`) chunk; only the descriptive head is decoded,
/// the remainder is preserved raw.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BroadcastChunk {
    /// Description, at most 256 ASCII characters.
    pub description: String,
    /// Originator, at most 32 ASCII characters.
    pub originator: String,
    /// Originator reference, at most 32 ASCII characters.
    pub originator_reference: String,
    /// Origination date as `yyyy-mm-dd`.
    pub origination_date: String,
    /// Origination time as `hh:mm:ss`.
    pub origination_time: String,
    /// First sample count since midnight.
    pub time_reference: u64,
    /// BWF version.
    pub version: u16,
    /// Everything after the version field, byte for byte.
    pub rest: Vec<u8>,
}

/// One point of a `cue ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePoint {
    /// Unique identifier.
    pub identifier: u32,
    /// Play-order position.
    pub position: u32,
    /// Chunk the cue refers to, normally `data`.
    pub data_chunk_id: [u8; 4],
    /// Chunk start offset for wave lists.
    pub chunk_start: u32,
    /// Block start offset.
    pub block_start: u32,
    /// Sample offset of the cue.
    pub sample_offset: u32,
}

/// One entry of a `LIST`/`INFO` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    /// Four-character entry id, e.g. `INAM` or `ICMT`.
    pub id: [u8; 4],
    /// Entry text.
    pub text: String,
}

/// An unrecognized chunk, preserved byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Four-character chunk id.
    pub id: [u8; 4],
    /// Chunk payload.
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_fraction_mapping() {
        let mut chunk = SampleChunk::new(60, 44_100);
        chunk.set_pitch_fraction_cents(25.0);
        assert_eq!(chunk.midi_pitch_fraction, 0x4000_0000);
        assert!((chunk.pitch_fraction_cents() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_loop_type_round_trip() {
        for lt in [LoopType::Forwards, LoopType::Alternating, LoopType::Backwards] {
            let wav_loop = WavLoop {
                identifier: 0,
                loop_type: WavLoop::type_code(lt),
                start: 10,
                end: 20,
                fraction: 0,
                play_count: 0,
            };
            assert_eq!(wav_loop.model_loop_type(), lt);
        }
    }

    #[test]
    fn test_loop_fraction_crossfade_round_trip() {
        let mut lp = SampleLoop::forwards(0, 999);
        lp.crossfade = 0.5;
        let wav_loop = WavLoop::from_model(&lp, 0);
        assert_eq!(wav_loop.fraction, 0x8000_0000);
        let back = wav_loop.to_model();
        assert!((back.crossfade - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sample_period_from_rate() {
        assert_eq!(SampleChunk::new(60, 44_100).sample_period, 22_675);
    }
}
