// Sequence import/export - conversion between the grid and timed note events
//
// The file container (Standard MIDI File chunks, dialogs, paths) is handled
// outside this crate; this module only maps a Timeline to an ordered list of
// timed note messages and back.

use crate::midi::event::{DEFAULT_VELOCITY, MidiEvent};
use crate::sequencer::Timeline;

/// Tick quantum of one grid beat in exported sequences
pub const TICKS_PER_BEAT: u64 = 150;

/// A MIDI message at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEvent {
    pub tick: u64,
    pub event: MidiEvent,
}

impl SequenceEvent {
    pub fn note_on(tick: u64, pitch: u8) -> Self {
        Self {
            tick,
            event: MidiEvent::NoteOn {
                note: pitch,
                velocity: DEFAULT_VELOCITY,
            },
        }
    }

    pub fn note_off(tick: u64, pitch: u8) -> Self {
        Self {
            tick,
            event: MidiEvent::NoteOff { note: pitch },
        }
    }

    /// Note number for note messages
    pub fn pitch(&self) -> Option<u8> {
        self.event.note()
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self.event, MidiEvent::NoteOn { .. })
    }
}

/// Export every note of the grid
///
/// Each cell becomes a note-on at `beat * TICKS_PER_BEAT` and a note-off one
/// beat later. Events are sorted by tick; at equal ticks note-offs come first
/// so a pitch repeated on consecutive beats is released before it restarts.
pub fn to_event_list(timeline: &Timeline) -> Vec<SequenceEvent> {
    let mut events = Vec::with_capacity(timeline.note_count() * 2);

    for cell in timeline.active_cells() {
        let Some(pitch) = timeline.pitch_value(cell.pitch) else {
            continue;
        };
        let tick = cell.beat as u64 * TICKS_PER_BEAT;
        events.push(SequenceEvent::note_on(tick, pitch));
        events.push(SequenceEvent::note_off(tick + TICKS_PER_BEAT, pitch));
    }

    events.sort_by_key(|e| (e.tick, e.is_note_on(), e.pitch()));
    events
}

/// Replace the content of `timeline` with the note-ons of `events`
///
/// Each note-on lands on `beat = tick / TICKS_PER_BEAT`. Non-note messages,
/// note-offs and notes outside the current grid are skipped. Returns the
/// number of cells set.
pub fn load_event_list(timeline: &mut Timeline, events: &[SequenceEvent]) -> usize {
    timeline.clear();

    let mut loaded = 0;
    let mut skipped = 0;
    for event in events {
        let MidiEvent::NoteOn { note, .. } = event.event else {
            continue;
        };

        let beat = event.tick / TICKS_PER_BEAT;
        let target = timeline
            .pitch_index_for_value(note)
            .and_then(|pitch| timeline.target(beat.min(i64::MAX as u64) as i64, pitch as i64));

        match target {
            Some(t) => {
                if timeline.toggle_cell(t.beat, t.pitch, true) {
                    loaded += 1;
                }
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Sequence import skipped {} out-of-range notes", skipped);
    }
    loaded
}

/// Build a timeline shaped like `shape` holding the notes of `events`
pub fn from_event_list(events: &[SequenceEvent], shape: &Timeline) -> Timeline {
    let mut timeline = shape.clone();
    load_event_list(&mut timeline, events);
    timeline
}

/// Parse raw (tick, message bytes) pairs, dropping anything unrecognized
pub fn from_raw_messages(messages: &[(u64, Vec<u8>)]) -> Vec<SequenceEvent> {
    messages
        .iter()
        .filter_map(|(tick, bytes)| {
            MidiEvent::from_bytes(bytes).map(|event| SequenceEvent { tick: *tick, event })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_timeline() -> Timeline {
        Timeline::new(8, 12, 60, 0)
    }

    #[test]
    fn test_export_orders_offs_before_ons() {
        let mut timeline = small_timeline();
        timeline.toggle_cell(0, 0, true);
        timeline.toggle_cell(1, 0, true);

        let events = to_event_list(&timeline);
        assert_eq!(
            events,
            vec![
                SequenceEvent::note_on(0, 60),
                SequenceEvent::note_off(150, 60),
                SequenceEvent::note_on(150, 60),
                SequenceEvent::note_off(300, 60),
            ]
        );
    }

    #[test]
    fn test_roundtrip_reproduces_grid() {
        let mut timeline = small_timeline();
        timeline.toggle_cell(0, 3, true);
        timeline.toggle_cell(5, 11, true);
        timeline.toggle_cell(7, 0, true);

        let restored = from_event_list(&to_event_list(&timeline), &timeline);
        assert_eq!(restored, timeline);
    }

    #[test]
    fn test_import_buckets_ticks_and_skips_out_of_range() {
        let shape = small_timeline();
        let events = vec![
            SequenceEvent::note_on(299, 61),  // beat 1
            SequenceEvent::note_on(300, 62),  // beat 2
            SequenceEvent::note_on(1200, 62), // beat 8: past the end
            SequenceEvent::note_on(0, 59),    // below the lowest row
            SequenceEvent::note_on(0, 72),    // above the highest row
            SequenceEvent::note_off(0, 60),
            SequenceEvent {
                tick: 0,
                event: MidiEvent::ProgramChange { program: 0 },
            },
        ];

        let timeline = from_event_list(&events, &shape);
        assert_eq!(timeline.note_count(), 2);
        assert!(timeline.get(1, 1));
        assert!(timeline.get(2, 2));
    }

    #[test]
    fn test_load_replaces_existing_content() {
        let mut timeline = small_timeline();
        timeline.toggle_cell(4, 4, true);

        let loaded = load_event_list(&mut timeline, &[SequenceEvent::note_on(0, 60)]);
        assert_eq!(loaded, 1);
        assert!(!timeline.get(4, 4));
        assert!(timeline.get(0, 0));
    }

    #[test]
    fn test_raw_messages_skip_garbage() {
        let raw = vec![
            (0, vec![0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7]), // sysex
            (0, vec![0x90, 64, 96]),
            (10, vec![0x90]),
            (20, vec![0x80, 64, 64]),
        ];

        let events = from_raw_messages(&raw);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_note_on());
        assert_eq!(events[1].pitch(), Some(64));
    }
}
