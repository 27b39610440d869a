//! Model invariant checks.
//!
//! Validation gathers every violation instead of failing fast, so a
//! detector author sees all problems of a source at once.

use crate::group::Group;
use crate::multisample::MultisampleSource;
use crate::zone::SampleZone;

/// A single invariant violation with the path to the offending element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Human-readable message.
    pub message: String,
    /// Path to the problematic element (e.g. "groups[0].zones[2]").
    pub path: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {})", self.message, self.path)
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a multisample source.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// All violations found.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the result.
    pub fn add(&mut self, message: impl Into<String>, path: impl Into<String>) {
        self.errors.push(ValidationError::new(message, path));
    }
}

/// Validates every invariant of a multisample source.
pub fn validate_multisample(source: &MultisampleSource) -> ValidationResult {
    let mut result = ValidationResult::default();

    if source.name.is_empty() {
        result.add("multisample has no name", "name");
    }
    if source.non_empty_groups().count() == 0 {
        result.add("multisample has no zones", "groups");
    }

    for (g, group) in source.groups.iter().enumerate() {
        validate_group(group, g, &mut result);
    }
    result
}

fn validate_group(group: &Group, g: usize, result: &mut ValidationResult) {
    for (z, zone) in group.zones.iter().enumerate() {
        validate_zone(zone, &format!("groups[{g}].zones[{z}]"), result);
    }
}

fn validate_zone(zone: &SampleZone, path: &str, result: &mut ValidationResult) {
    if zone.key_low > zone.key_high {
        result.add(
            format!("key range is inverted: {}..{}", zone.key_low, zone.key_high),
            path,
        );
    }
    if let Some(root) = zone.key_root {
        if root < zone.key_low || root > zone.key_high {
            result.add(
                format!(
                    "root key {} outside key range {}..{}",
                    root, zone.key_low, zone.key_high
                ),
                path,
            );
        }
    }
    if zone.velocity_low < 1 {
        result.add("velocity low must be at least 1", path);
    }
    if zone.velocity_low > zone.velocity_high {
        result.add(
            format!(
                "velocity range is inverted: {}..{}",
                zone.velocity_low, zone.velocity_high
            ),
            path,
        );
    }
    if zone.stop > 0 && zone.start >= zone.stop {
        result.add(
            format!("playback window is empty: {}..{}", zone.start, zone.stop),
            path,
        );
    }
    if !(0.125..=24.0).contains(&zone.gain) {
        result.add(format!("gain {} outside 0.125..24", zone.gain), path);
    }
    if !(-1.0..=1.0).contains(&zone.panorama) {
        result.add(format!("panorama {} outside -1..1", zone.panorama), path);
    }
    if !(0.0..=1.0).contains(&zone.key_tracking) {
        result.add(format!("key tracking {} outside 0..1", zone.key_tracking), path);
    }
    for (i, lp) in zone.loops.iter().enumerate() {
        if lp.start > lp.end {
            result.add(
                format!("loop is inverted: {}..{}", lp.start, lp.end),
                format!("{path}.loops[{i}]"),
            );
        }
        if zone.stop > 0 && lp.end >= zone.stop {
            result.add(
                format!("loop end {} beyond sample end {}", lp.end, zone.stop),
                format!("{path}.loops[{i}]"),
            );
        }
        if !(0.0..=1.0).contains(&lp.crossfade) {
            result.add(
                format!("loop crossfade {} outside 0..1", lp.crossfade),
                format!("{path}.loops[{i}]"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_loop::SampleLoop;

    #[test]
    fn test_valid_source_passes() {
        let mut source = MultisampleSource::new("/tmp/x", "X");
        let mut group = Group::new("G");
        let mut zone = SampleZone::new("z");
        zone.stop = 1000;
        zone.key_root = Some(60);
        zone.key_low = 50;
        zone.key_high = 70;
        group.zones.push(zone);
        source.groups.push(group);
        let result = validate_multisample(&source);
        assert!(result.is_ok(), "{:?}", result.errors);
    }

    #[test]
    fn test_empty_source_fails() {
        let source = MultisampleSource::new("/tmp/x", "X");
        assert!(!validate_multisample(&source).is_ok());
    }

    #[test]
    fn test_root_outside_range_reported() {
        let mut source = MultisampleSource::new("/tmp/x", "X");
        let mut group = Group::new("G");
        let mut zone = SampleZone::new("z");
        zone.stop = 100;
        zone.key_low = 60;
        zone.key_high = 70;
        zone.key_root = Some(50);
        group.zones.push(zone);
        source.groups.push(group);
        let result = validate_multisample(&source);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("root key"));
    }

    #[test]
    fn test_loop_errors_reported_with_path() {
        let mut source = MultisampleSource::new("/tmp/x", "X");
        let mut group = Group::new("G");
        let mut zone = SampleZone::new("z");
        zone.stop = 100;
        zone.loops.push(SampleLoop::forwards(50, 200));
        group.zones.push(zone);
        source.groups.push(group);
        let result = validate_multisample(&source);
        assert!(!result.is_ok());
        assert!(result.errors[0].path.ends_with("loops[0]"));
    }
}
