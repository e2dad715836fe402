// Pitch naming and scale highlighting for the grid rows
//
//   pitch class   name
//        0         C
//        1         C#/Db
//        ...
//        9         A      (lowest key of a grand piano, A0 = MIDI 21)
//       11         B

/// MIDI note number of middle C (C4)
pub const MIDDLE_C: u8 = 60;

pub const PITCHES_PER_OCTAVE: u8 = 12;

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const IN_MAJOR_SCALE: [bool; 12] = [
    true, false, true, false, true, true, false, true, false, true, false, true,
];

// Tonic, third, fourth and fifth get a stronger line
const EMPHASIZED_IN_MAJOR_SCALE: [bool; 12] = [
    true, false, false, false, true, true, false, true, false, false, false, false,
];

/// How a row is shaded when the C major scale is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleRole {
    /// The middle C row
    MiddleC,
    /// Any other C
    Tonic,
    /// E, F and G
    Emphasized,
    /// Remaining white keys
    InScale,
    /// Black keys
    OutOfScale,
}

/// Name of a pitch class ("C", "C#", ...)
pub fn pitch_class_name(pitch_class: u8) -> &'static str {
    PITCH_CLASS_NAMES[(pitch_class % PITCHES_PER_OCTAVE) as usize]
}

/// Note name with octave for a MIDI note number (e.g. "A0", "C4")
pub fn note_name(midi_note: u8) -> String {
    let octave = (midi_note / PITCHES_PER_OCTAVE) as i32 - 1;
    format!("{}{}", pitch_class_name(midi_note % PITCHES_PER_OCTAVE), octave)
}

/// Classify a row for C major highlighting
pub fn scale_role(midi_note: u8) -> ScaleRole {
    let pitch_class = (midi_note % PITCHES_PER_OCTAVE) as usize;

    if midi_note == MIDDLE_C {
        ScaleRole::MiddleC
    } else if pitch_class == 0 {
        ScaleRole::Tonic
    } else if EMPHASIZED_IN_MAJOR_SCALE[pitch_class] {
        ScaleRole::Emphasized
    } else if IN_MAJOR_SCALE[pitch_class] {
        ScaleRole::InScale
    } else {
        ScaleRole::OutOfScale
    }
}
