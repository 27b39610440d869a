//! DAHDSR envelopes and modulators.
//!
//! Envelope fields are optional: a field that no source format supplied
//! stays `None` and creators substitute their own format default. An
//! envelope [`is_set`](Envelope::is_set) as soon as any field carries a
//! value, which is what gates the category-based default envelopes.

use serde::Serialize;

/// A delay/attack/hold/decay/sustain/release envelope with per-phase slope.
///
/// Times are in seconds, levels in `0..=1`. Slopes are in `-1..=1` where
/// -1 is fully logarithmic, 0 linear and 1 fully exponential.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Envelope {
    /// Delay before the attack phase starts, in seconds.
    pub delay_time: Option<f64>,
    /// Attack time in seconds.
    pub attack_time: Option<f64>,
    /// Hold time at the attack peak, in seconds.
    pub hold_time: Option<f64>,
    /// Decay time in seconds.
    pub decay_time: Option<f64>,
    /// Release time in seconds.
    pub release_time: Option<f64>,
    /// Level at the start of the attack phase.
    pub start_level: Option<f64>,
    /// Level held after the attack peak. Unset means equal to the peak.
    pub hold_level: Option<f64>,
    /// Sustain level.
    pub sustain_level: Option<f64>,
    /// Level at the end of the release phase.
    pub end_level: Option<f64>,
    /// Attack phase slope.
    pub attack_slope: f64,
    /// Decay phase slope.
    pub decay_slope: f64,
    /// Release phase slope.
    pub release_slope: f64,
}

impl Envelope {
    /// Returns true if at least one field carries a value.
    pub fn is_set(&self) -> bool {
        self.delay_time.is_some()
            || self.attack_time.is_some()
            || self.hold_time.is_some()
            || self.decay_time.is_some()
            || self.release_time.is_some()
            || self.start_level.is_some()
            || self.hold_level.is_some()
            || self.sustain_level.is_some()
            || self.end_level.is_some()
            || self.attack_slope != 0.0
            || self.decay_slope != 0.0
            || self.release_slope != 0.0
    }

    /// The hold level, falling back to the attack peak when unset.
    pub fn effective_hold_level(&self) -> f64 {
        self.hold_level.unwrap_or(1.0)
    }

    /// Template for percussive material: immediate cutoff on release.
    pub fn percussive() -> Self {
        Self::template(0.003)
    }

    /// Template for plucked material.
    pub fn plucked() -> Self {
        Self::template(0.7)
    }

    /// Template for keyboard material.
    pub fn keys() -> Self {
        Self::template(1.0)
    }

    /// Template for pads and other sustained material.
    pub fn pads() -> Self {
        Self::template(4.0)
    }

    fn template(release: f64) -> Self {
        Self {
            attack_time: Some(0.0),
            sustain_level: Some(1.0),
            release_time: Some(release),
            ..Self::default()
        }
    }
}

/// Category keywords that select the default envelope template.
///
/// Lookup is a case-insensitive substring match; unknown categories fall
/// back to the plucked template.
const PERCUSSIVE_KEYWORDS: &[&str] = &[
    "drum", "percussion", "perc", "kick", "snare", "tom", "hat", "cymbal", "clap", "shaker",
];
const KEYS_KEYWORDS: &[&str] = &[
    "piano", "keys", "keyboard", "organ", "clav", "mallet", "vibraphone", "marimba",
];
const PADS_KEYWORDS: &[&str] = &[
    "pad", "string", "choir", "vocal", "atmosphere", "drone", "ambient", "orchestral",
];

/// Selects the default amplitude envelope for an instrument category.
pub fn default_envelope_for_category(category: &str) -> Envelope {
    let lower = category.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));
    if matches(PERCUSSIVE_KEYWORDS) {
        Envelope::percussive()
    } else if matches(KEYS_KEYWORDS) {
        Envelope::keys()
    } else if matches(PADS_KEYWORDS) {
        Envelope::pads()
    } else {
        Envelope::plucked()
    }
}

/// A depth-scaled envelope connection to a modulation target.
///
/// The depth is normalized to `-1..=1`; the target dimension decides the
/// physical unit (amplitude `0..=1`, filter cutoff ±12000 cents, pitch
/// ±48000 cents).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvelopeModulator {
    /// Modulation depth in `-1..=1`.
    pub depth: f64,
    /// The envelope shaping the modulation.
    pub envelope: Envelope,
}

impl EnvelopeModulator {
    /// A modulator at full positive depth with an unset envelope.
    pub fn full() -> Self {
        Self {
            depth: 1.0,
            envelope: Envelope::default(),
        }
    }

    /// A modulator at zero depth with an unset envelope.
    pub fn off() -> Self {
        Self {
            depth: 0.0,
            envelope: Envelope::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_envelope_is_unset() {
        let envelope = Envelope::default();
        assert!(!envelope.is_set());
    }

    #[test]
    fn test_any_field_marks_envelope_set() {
        let envelope = Envelope {
            release_time: Some(0.5),
            ..Envelope::default()
        };
        assert!(envelope.is_set());

        let envelope = Envelope {
            attack_slope: -0.5,
            ..Envelope::default()
        };
        assert!(envelope.is_set());
    }

    #[test]
    fn test_category_templates() {
        assert_eq!(
            default_envelope_for_category("Drums & Percussion").release_time,
            Some(0.003)
        );
        assert_eq!(default_envelope_for_category("Piano").release_time, Some(1.0));
        assert_eq!(default_envelope_for_category("Synth Pad").release_time, Some(4.0));
        assert_eq!(default_envelope_for_category("Guitar").release_time, Some(0.7));
        // Unknown categories fall back to plucked.
        assert_eq!(default_envelope_for_category("???").release_time, Some(0.7));
    }

    #[test]
    fn test_hold_level_falls_back_to_peak() {
        let envelope = Envelope::default();
        assert_eq!(envelope.effective_hold_level(), 1.0);

        let envelope = Envelope {
            hold_level: Some(0.25),
            ..Envelope::default()
        };
        assert_eq!(envelope.effective_hold_level(), 0.25);
    }
}
