// Sequencer player - one playback tick over the grid
//
// Pure tick logic, independent of threads and timers: the transport calls
// `advance` under the timeline lock once per interval.

use crate::audio::output::{SoundError, SoundOutput};
use crate::midi::event::DEFAULT_VELOCITY;
use crate::sequencer::grid::Timeline;
use std::time::Duration;

/// Interval between ticks at tempo multiplier 1.0
pub const DEFAULT_BASE_INTERVAL_MS: u64 = 200;

/// Playback position and speed
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Beat under the play cursor
    pub current_beat: usize,

    /// Scales the tick interval; 1.0 = base interval, smaller = faster
    pub tempo_multiplier: f64,

    /// The playback loop exists and has not been stopped
    pub running: bool,

    /// The playback loop is parked until resumed
    pub suspended: bool,

    /// Pitch values that received a note-on and no note-off yet
    sounding: Vec<u8>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            current_beat: 0,
            tempo_multiplier: 1.0,
            running: false,
            suspended: false,
            sounding: Vec::new(),
        }
    }

    /// Pitch values currently sounding
    pub fn sounding(&self) -> &[u8] {
        &self.sounding
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a tick or a release
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Beat under the cursor after the operation
    pub beat: usize,
    pub notes_off: Vec<u8>,
    pub notes_on: Vec<u8>,
    /// First sound failure, if any; playback carries on regardless
    pub first_error: Option<SoundError>,
}

impl TickReport {
    fn record(&mut self, result: Result<(), SoundError>) {
        if let Err(e) = result
            && self.first_error.is_none()
        {
            self.first_error = Some(e);
        }
    }
}

/// Turns grid columns into note-on/note-off calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerPlayer {
    base_interval_ms: u64,
    velocity: u8,
}

impl SequencerPlayer {
    pub fn new(base_interval_ms: u64, velocity: u8) -> Self {
        Self {
            base_interval_ms: base_interval_ms.max(1),
            velocity: velocity.min(127),
        }
    }

    pub fn base_interval_ms(&self) -> u64 {
        self.base_interval_ms
    }

    /// `round(base_interval_ms * tempo_multiplier)`, never below 1 ms
    pub fn interval(&self, state: &PlaybackState) -> Duration {
        let ms = (self.base_interval_ms as f64 * state.tempo_multiplier).round();
        let ms = if ms.is_finite() { ms.max(1.0) } else { self.base_interval_ms as f64 };
        Duration::from_millis(ms as u64)
    }

    /// Move the play cursor one beat
    ///
    /// All note-offs for the old beat are emitted before any note-on for the
    /// new beat. The new beat is taken modulo the current beat count, which
    /// also pulls the cursor back into range after the grid shrank.
    pub fn advance(
        &self,
        state: &mut PlaybackState,
        timeline: &Timeline,
        sound: &dyn SoundOutput,
    ) -> TickReport {
        let mut report = self.release_column(state, timeline, sound);

        state.current_beat = (state.current_beat + 1) % timeline.beat_count();
        report.beat = state.current_beat;

        for pitch in timeline.notes_at(state.current_beat) {
            let Some(value) = timeline.pitch_value(pitch) else {
                continue;
            };
            report.record(sound.note_on(value, self.velocity));
            report.notes_on.push(value);
            state.sounding.push(value);
        }

        report
    }

    /// Note-off for every note at the cursor and every note still sounding
    ///
    /// Used by stop so no note-on is left unmatched.
    pub fn release_column(
        &self,
        state: &mut PlaybackState,
        timeline: &Timeline,
        sound: &dyn SoundOutput,
    ) -> TickReport {
        let mut off: Vec<u8> = timeline
            .notes_at(state.current_beat)
            .filter_map(|pitch| timeline.pitch_value(pitch))
            .collect();
        for value in state.sounding.drain(..) {
            if !off.contains(&value) {
                off.push(value);
            }
        }

        let mut report = TickReport {
            beat: state.current_beat,
            ..TickReport::default()
        };
        for &value in &off {
            report.record(sound.note_off(value));
        }
        report.notes_off = off;
        report
    }

    /// Note-off for the notes still sounding, leaving the cursor alone
    pub fn release_sounding(&self, state: &mut PlaybackState, sound: &dyn SoundOutput) -> TickReport {
        let mut report = TickReport {
            beat: state.current_beat,
            ..TickReport::default()
        };
        for value in state.sounding.drain(..) {
            report.record(sound.note_off(value));
            report.notes_off.push(value);
        }
        report
    }
}

impl Default for SequencerPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_INTERVAL_MS, DEFAULT_VELOCITY)
    }
}
