// MIDI channel messages understood by the sequence import/export layer

/// Default note-on velocity used for playback and export
pub const DEFAULT_VELOCITY: u8 = 96;

/// Velocity written with exported note-off messages
pub const NOTE_OFF_VELOCITY: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    ControlChange { controller: u8, value: u8 },
    ProgramChange { program: u8 },
}

impl MidiEvent {
    /// Parse a raw channel message
    ///
    /// Returns None for empty, truncated or unsupported messages and for data
    /// bytes with the high bit set. The channel nibble is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if data.iter().take(2).any(|b| b & 0x80 != 0) {
            return None;
        }

        match status & 0xF0 {
            0x90 if data.len() >= 2 => {
                // Velocity 0 = Note Off
                if data[1] == 0 {
                    Some(MidiEvent::NoteOff { note: data[0] })
                } else {
                    Some(MidiEvent::NoteOn {
                        note: data[0],
                        velocity: data[1],
                    })
                }
            }
            0x80 if data.len() >= 2 => Some(MidiEvent::NoteOff { note: data[0] }),
            0xB0 if data.len() >= 2 => Some(MidiEvent::ControlChange {
                controller: data[0],
                value: data[1],
            }),
            0xC0 if !data.is_empty() => Some(MidiEvent::ProgramChange { program: data[0] }),
            _ => None,
        }
    }

    /// Encode as a channel-0 message
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiEvent::NoteOn { note, velocity } => vec![0x90, note & 0x7F, velocity & 0x7F],
            MidiEvent::NoteOff { note } => vec![0x80, note & 0x7F, NOTE_OFF_VELOCITY],
            MidiEvent::ControlChange { controller, value } => {
                vec![0xB0, controller & 0x7F, value & 0x7F]
            }
            MidiEvent::ProgramChange { program } => vec![0xC0, program & 0x7F],
        }
    }

    /// Note number for note messages
    pub fn note(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { note, .. } | MidiEvent::NoteOff { note } => Some(note),
            _ => None,
        }
    }
}
