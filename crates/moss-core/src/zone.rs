//! The fundamental key/velocity mapping record.

use serde::Serialize;

use crate::envelope::EnvelopeModulator;
use crate::filter::Filter;
use crate::group::{PlayLogic, Trigger};
use crate::sample_data::SampleDataRef;
use crate::sample_loop::SampleLoop;

/// A key/velocity region mapped to one sample plus playback parameters.
#[derive(Clone, Serialize)]
pub struct SampleZone {
    /// Display name; also the output filename stem.
    pub name: String,
    /// Handle to the audio bytes. Zones may share a backing.
    #[serde(skip)]
    pub sample_data: Option<SampleDataRef>,
    /// Whether the zone always plays or participates in round robin.
    pub play_logic: PlayLogic,
    /// Round-robin slot, `None` when unset.
    pub sequence_position: Option<u32>,
    /// The event that triggers this zone.
    pub trigger: Trigger,
    /// First frame of the playback window.
    pub start: u64,
    /// Frame one past the end of the playback window.
    pub stop: u64,
    /// Lowest MIDI key.
    pub key_low: u8,
    /// Highest MIDI key.
    pub key_high: u8,
    /// Root MIDI key, `None` when unset.
    pub key_root: Option<u8>,
    /// Key-range fade width below `key_low`, in keys.
    pub note_crossfade_low: u8,
    /// Key-range fade width above `key_high`, in keys.
    pub note_crossfade_high: u8,
    /// Lowest velocity, `1..=127`.
    pub velocity_low: u8,
    /// Highest velocity, `1..=127`.
    pub velocity_high: u8,
    /// Velocity fade width below `velocity_low`.
    pub velocity_crossfade_low: u8,
    /// Velocity fade width above `velocity_high`.
    pub velocity_crossfade_high: u8,
    /// Linear gain multiplier, `0.125..=24.0`.
    pub gain: f64,
    /// Panorama in `-1..=1`.
    pub panorama: f64,
    /// Tuning in semitones, 0.01 is one cent.
    pub tune: f64,
    /// Key tracking in `0..=1`: 0 plays at fixed pitch, 1 tracks fully.
    pub key_tracking: f64,
    /// Upwards pitch-bend range in cents.
    pub bend_up: i32,
    /// Downwards pitch-bend range in cents.
    pub bend_down: i32,
    /// Whether the sample plays reversed.
    pub is_reversed: bool,
    /// Loop regions.
    pub loops: Vec<SampleLoop>,
    /// Optional filter.
    pub filter: Option<Filter>,
    /// Amplitude envelope.
    pub amplitude_envelope: EnvelopeModulator,
    /// Pitch envelope.
    pub pitch_envelope: EnvelopeModulator,
    /// Velocity to gain depth in `-1..=1`.
    pub amplitude_velocity_depth: f64,
}

impl SampleZone {
    /// Creates a zone covering the full key and velocity range.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sample_data: None,
            play_logic: PlayLogic::Always,
            sequence_position: None,
            trigger: Trigger::Attack,
            start: 0,
            stop: 0,
            key_low: 0,
            key_high: 127,
            key_root: None,
            note_crossfade_low: 0,
            note_crossfade_high: 0,
            velocity_low: 1,
            velocity_high: 127,
            velocity_crossfade_low: 0,
            velocity_crossfade_high: 0,
            gain: 1.0,
            panorama: 0.0,
            tune: 0.0,
            key_tracking: 1.0,
            bend_up: 0,
            bend_down: 0,
            is_reversed: false,
            loops: Vec::new(),
            filter: None,
            amplitude_envelope: EnvelopeModulator::full(),
            pitch_envelope: EnvelopeModulator::off(),
            amplitude_velocity_depth: 1.0,
        }
    }

    /// The effective root key, falling back to middle C when unset.
    pub fn effective_key_root(&self) -> u8 {
        self.key_root.unwrap_or(60)
    }

    /// The playback window length in frames.
    pub fn window_length(&self) -> u64 {
        self.stop.saturating_sub(self.start)
    }

    /// Clamps playback window and loops to the given frame count.
    pub fn clamp_to_frame_count(&mut self, frame_count: u64) {
        if self.stop == 0 || self.stop > frame_count {
            self.stop = frame_count;
        }
        if self.start >= self.stop {
            self.start = 0;
        }
        for lp in &mut self.loops {
            if frame_count > 0 && lp.end >= frame_count {
                lp.end = frame_count - 1;
            }
            if lp.start > lp.end {
                lp.start = lp.end;
            }
        }
    }

    /// Returns true if the zone key range contains the given key.
    pub fn contains_key(&self, key: u8) -> bool {
        (self.key_low..=self.key_high).contains(&key)
    }
}

impl std::fmt::Debug for SampleZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleZone")
            .field("name", &self.name)
            .field("keys", &(self.key_low, self.key_root, self.key_high))
            .field("velocities", &(self.velocity_low, self.velocity_high))
            .field("window", &(self.start, self.stop))
            .field("loops", &self.loops.len())
            .finish_non_exhaustive()
    }
}
