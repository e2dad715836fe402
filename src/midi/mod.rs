// MIDI module - channel messages and grid <-> event list conversion

pub mod event;
pub mod sequence;

pub use event::{DEFAULT_VELOCITY, MidiEvent};
pub use sequence::{SequenceEvent, TICKS_PER_BEAT, from_event_list, load_event_list, to_event_list};
