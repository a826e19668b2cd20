//! Note-name ↔ frequency conversion for driving the tone from a note grid.

use serde::Serialize;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// MIDI number for a grid label such as "A4", "F#3" or "Bb-1".
///
/// The octave is an optional `-` followed by ASCII digits; middle C is "C4" (60).
pub fn note_to_midi(note: &str) -> Option<i32> {
    let mut chars = note.chars();
    let pitch_class = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (accidental, octave) = match rest.as_bytes().first() {
        Some(b'#') => (1, &rest[1..]),
        Some(b'b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let digits = octave.strip_prefix('-').unwrap_or(octave);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let octave: i32 = octave.parse().ok()?;

    octave
        .checked_add(1)?
        .checked_mul(12)?
        .checked_add(pitch_class + accidental)
}

/// Equal-tempered frequency of a MIDI note, with A4 (69) at `tuning_pitch` Hz.
pub fn midi_to_frequency(midi: i32, tuning_pitch: f64) -> f64 {
    tuning_pitch * 2f64.powf((midi - 69) as f64 / 12.0)
}

/// Frequency of a grid label at concert pitch (A4 = 440 Hz).
pub fn note_to_frequency(note: &str) -> Option<f64> {
    note_to_frequency_with_tuning(note, 440.0)
}

/// Frequency of a grid label with A4 at `tuning_pitch` Hz (e.g. 432 for a lower reference).
pub fn note_to_frequency_with_tuning(note: &str, tuning_pitch: f64) -> Option<f64> {
    note_to_midi(note).map(|midi| midi_to_frequency(midi, tuning_pitch))
}

/// Sharp-spelled name for a MIDI note number, e.g. 61 → "C#4".
pub fn midi_to_note_name(midi: i32) -> String {
    let octave = midi.div_euclid(12) - 1;
    let name = NOTE_NAMES[midi.rem_euclid(12) as usize];
    format!("{name}{octave}")
}

/// Nearest equal-tempered note to a dialed frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestNote {
    pub name: String,
    pub midi: i32,
    /// Exact frequency of `name` under the tuning used.
    pub frequency: f64,
    /// Offset of the dialed frequency from `name`, in cents.
    pub cents: f64,
}

/// Label a frequency with its nearest note and cent offset.
///
/// Returns `None` for non-positive or non-finite input.
pub fn nearest_note(freq: f64, tuning_pitch: f64) -> Option<NearestNote> {
    if !(freq.is_finite() && freq > 0.0 && tuning_pitch > 0.0) {
        return None;
    }
    let midi_float = 69.0 + 12.0 * (freq / tuning_pitch).log2();
    let midi = midi_float.round() as i32;
    Some(NearestNote {
        name: midi_to_note_name(midi),
        midi,
        frequency: midi_to_frequency(midi, tuning_pitch),
        cents: (midi_float - midi as f64) * 100.0,
    })
}
