// Commands sent to the sound thread

use crate::midi::event::MidiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Midi(MidiEvent),
    /// Release every sounding note
    AllNotesOff,
    Quit,
}
