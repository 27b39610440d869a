//! Cross-crate invariant checks on real detector output.

use moss_core::validation::validate_multisample;
use moss_core::{math, note};
use moss_file::{StreamReader, StreamWriter};
use moss_formats::samplefile::{detect_folder, ChannelPatterns};
use moss_tests::{write_mono_wav, write_mono_wav_with_loop};

/// Every zone a detector produces satisfies the model invariants.
#[test]
fn test_detected_sources_validate() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("Kit");
    std::fs::create_dir_all(&folder).unwrap();
    write_mono_wav(&folder.join("Kick C1.wav"), 500, None);
    write_mono_wav_with_loop(&folder.join("Bass C2.wav"), 500, 48, 10, 400);
    write_mono_wav(&folder.join("Hat.wav"), 500, Some(70));

    let files = vec![
        folder.join("Bass C2.wav"),
        folder.join("Hat.wav"),
        folder.join("Kick C1.wav"),
    ];
    let source = detect_folder(&folder, &files, &ChannelPatterns::default()).unwrap();

    let result = validate_multisample(&source);
    assert!(result.is_ok(), "{:?}", result.errors);

    for group in &source.groups {
        for zone in &group.zones {
            assert!(zone.key_low <= zone.key_high);
            assert!((1..=127).contains(&zone.velocity_low));
            assert!(zone.velocity_low <= zone.velocity_high);
            assert!(zone.start < zone.stop);
        }
    }
}

#[test]
fn test_note_round_trip_for_all_midi_notes() {
    for n in 0..=127u8 {
        assert_eq!(note::parse_note(&note::format_note_sharps(n)), Some(n));
    }
}

#[test]
fn test_signed_complement_is_involutive() {
    for v in (-32767..=32767).step_by(37) {
        assert_eq!(
            math::from_signed_complement(math::to_signed_complement(v)),
            v
        );
    }
}

#[test]
fn test_varint_round_trips_across_the_u32_range() {
    let mut values: Vec<u64> = vec![0, 1, 127, 128, 16_383, 16_384, u32::MAX as u64];
    values.extend((0..31).map(|shift| 1u64 << shift));

    for value in values {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_varint(value).unwrap();
        let bytes = writer.into_inner();
        let mut reader = StreamReader::new(bytes.as_slice());
        let (decoded, consumed) = reader.read_varint().unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, bytes.len());
    }
}

#[test]
fn test_db_curve_monotonic_and_floored() {
    assert_eq!(math::value_to_db(0.0), -150.0);
    let mut previous = f64::NEG_INFINITY;
    for step in 0..1000 {
        let x = step as f64 / 100.0 + 1e-9;
        let db = math::value_to_db(x);
        assert!(db >= previous);
        previous = db;
    }
}

#[test]
fn test_time_curve_round_trips() {
    for max in [1.0, 10.0, 38.0] {
        for step in 0..=20 {
            let t = max * step as f64 / 20.0;
            let n = math::normalize_time(t, max);
            assert!((math::denormalize_time(n, max) - t).abs() < 1e-9);
        }
    }
}
