//! MIDI note parsing and formatting.
//!
//! Note names map C3 to MIDI 60; the parseable range is C-2 (0) up to
//! G8 (127). German note names are accepted: `H` is the natural seventh
//! step (MIDI 11 within the octave).

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Parses a note name or a plain MIDI note number.
///
/// Accepts sharps (`C#3`), flats (`Db3`), the German `H`, octave
/// suffixes from -2 to 8, and zero-padded decimal numbers in `0..=127`.
/// Matching is case-insensitive. Returns `None` for anything else.
pub fn parse_note(text: &str) -> Option<u8> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Plain (possibly zero-padded) MIDI note number.
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        let value: u32 = trimmed.parse().ok()?;
        return (value <= 127).then_some(value as u8);
    }

    let mut chars = trimmed.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let mut semitone: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' | 'H' => 11,
        _ => return None,
    };

    let rest: &str = chars.as_str();
    let octave_text = match rest.chars().next() {
        Some('#') => {
            semitone += 1;
            &rest[1..]
        }
        // In the accidental position a `b` cannot be the note letter B.
        Some('b') | Some('B') => {
            semitone -= 1;
            &rest[1..]
        }
        _ => rest,
    };

    let octave: i32 = octave_text.parse().ok()?;
    if !(-2..=8).contains(&octave) {
        return None;
    }

    let note = (octave + 2) * 12 + semitone;
    (0..=127).contains(&note).then_some(note as u8)
}

/// Formats a MIDI note with sharps, e.g. `formatted(61) == "C#3"`.
pub fn format_note_sharps(note: u8) -> String {
    format!(
        "{}{}",
        NOTE_NAMES_SHARP[(note % 12) as usize],
        note as i32 / 12 - 2
    )
}

/// Formats a MIDI note with flats, e.g. `formatted(61) == "Db3"`.
pub fn format_note_flats(note: u8) -> String {
    format!(
        "{}{}",
        NOTE_NAMES_FLAT[(note % 12) as usize],
        note as i32 / 12 - 2
    )
}
