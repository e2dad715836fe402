// Grid timeline - beat x pitch note grid
// The data model behind the piano roll; no rendering or input knowledge.

use crate::view::Rect;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Number of rows on a grand piano keyboard
pub const DEFAULT_PITCH_COUNT: usize = 88;

/// MIDI note number of the lowest row (A0)
pub const DEFAULT_LOWEST_PITCH: u8 = 21;

/// Pitch class of the lowest row (9 = A)
pub const DEFAULT_LOWEST_PITCH_CLASS: u8 = 9;

/// Number of beats of a freshly created timeline
pub const DEFAULT_BEAT_COUNT: usize = 128;

/// Longest timeline the editor will allocate
pub const MAX_BEAT_COUNT: usize = 1 << 16;

/// One row per MIDI note number
pub const MAX_PITCH_COUNT: usize = 128;

/// Timeline shared between the UI thread and the playback thread.
///
/// Every read or write of the grid, by either thread, goes through this lock.
pub type SharedTimeline = Arc<Mutex<Timeline>>;

/// Lock a shared timeline, recovering the data if a holder panicked
pub fn lock_timeline(timeline: &SharedTimeline) -> MutexGuard<'_, Timeline> {
    timeline.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A (beat, pitch index) pair that is known to be inside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridTarget {
    pub beat: usize,
    pub pitch: usize,
}

/// Two-dimensional note grid
///
/// Cells are stored beat-major in a flat vector so lookups are O(1).
/// All accessors are bounds-checked: out-of-range coordinates read as empty
/// and writes to them are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    beat_count: usize,
    pitch_count: usize,
    lowest_pitch: u8,
    lowest_pitch_class: u8,
    cells: Vec<bool>,
}

impl Timeline {
    /// Create an empty timeline
    ///
    /// `beat_count` and `pitch_count` are raised to 1 if zero.
    pub fn new(
        beat_count: usize,
        pitch_count: usize,
        lowest_pitch: u8,
        lowest_pitch_class: u8,
    ) -> Self {
        let beat_count = beat_count.clamp(1, MAX_BEAT_COUNT);
        let pitch_count = pitch_count.clamp(1, MAX_PITCH_COUNT);

        Self {
            beat_count,
            pitch_count,
            lowest_pitch,
            lowest_pitch_class: lowest_pitch_class % 12,
            cells: vec![false; beat_count * pitch_count],
        }
    }

    /// Create a piano-sized timeline (88 rows starting at A0, 128 beats)
    pub fn piano() -> Self {
        Self::new(
            DEFAULT_BEAT_COUNT,
            DEFAULT_PITCH_COUNT,
            DEFAULT_LOWEST_PITCH,
            DEFAULT_LOWEST_PITCH_CLASS,
        )
    }

    /// Wrap this timeline for sharing with the playback thread
    pub fn into_shared(self) -> SharedTimeline {
        Arc::new(Mutex::new(self))
    }

    pub fn beat_count(&self) -> usize {
        self.beat_count
    }

    pub fn pitch_count(&self) -> usize {
        self.pitch_count
    }

    pub fn lowest_pitch(&self) -> u8 {
        self.lowest_pitch
    }

    fn index(&self, beat: usize, pitch: usize) -> Option<usize> {
        if beat < self.beat_count && pitch < self.pitch_count {
            Some(beat * self.pitch_count + pitch)
        } else {
            None
        }
    }

    /// Validate a coordinate pair against the current dimensions
    pub fn target(&self, beat: i64, pitch: i64) -> Option<GridTarget> {
        if beat < 0 || pitch < 0 {
            return None;
        }
        let (beat, pitch) = (beat as usize, pitch as usize);
        self.index(beat, pitch).map(|_| GridTarget { beat, pitch })
    }

    /// Whether a note is present (false when out of range)
    pub fn get(&self, beat: usize, pitch: usize) -> bool {
        self.index(beat, pitch).is_some_and(|i| self.cells[i])
    }

    /// Set a cell to `desired` if it currently differs
    ///
    /// Returns true only when the cell actually changed, so callers can skip
    /// redundant repaints while drag-painting over already painted cells.
    pub fn toggle_cell(&mut self, beat: usize, pitch: usize, desired: bool) -> bool {
        match self.index(beat, pitch) {
            Some(i) if self.cells[i] != desired => {
                self.cells[i] = desired;
                true
            }
            _ => false,
        }
    }

    /// Re-create the grid with a new number of beats
    ///
    /// Existing notes are discarded. Requests for zero or negative sizes, or
    /// beyond `MAX_BEAT_COUNT`, are ignored and return false.
    pub fn resize(&mut self, new_beat_count: i64) -> bool {
        if new_beat_count <= 0 || new_beat_count as u64 > MAX_BEAT_COUNT as u64 {
            return false;
        }
        self.beat_count = new_beat_count as usize;
        self.cells = vec![false; self.beat_count * self.pitch_count];
        true
    }

    /// Remove every note
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// World-space rectangle covered by the grid, used to frame the view
    ///
    /// Beats run along +x, pitch indices along +y (upwards on screen).
    pub fn bounding_extent(&self) -> Rect {
        Rect::from_corners(0.0, 0.0, self.beat_count as f32, self.pitch_count as f32)
    }

    /// Pitch indices with a note at `beat`, lowest first
    pub fn notes_at(&self, beat: usize) -> impl Iterator<Item = usize> + '_ {
        let row = if beat < self.beat_count {
            let start = beat * self.pitch_count;
            &self.cells[start..start + self.pitch_count]
        } else {
            &self.cells[0..0]
        };
        row.iter()
            .enumerate()
            .filter_map(|(pitch, &on)| on.then_some(pitch))
    }

    /// Every set cell, in beat-major order
    pub fn active_cells(&self) -> impl Iterator<Item = GridTarget> + '_ {
        let pitch_count = self.pitch_count;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(move |(i, _)| GridTarget {
                beat: i / pitch_count,
                pitch: i % pitch_count,
            })
    }

    /// Number of notes in the grid
    pub fn note_count(&self) -> usize {
        self.cells.iter().filter(|on| **on).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|on| *on)
    }

    /// MIDI note number of a row, if the row exists and fits in 0..=127
    pub fn pitch_value(&self, pitch: usize) -> Option<u8> {
        if pitch >= self.pitch_count {
            return None;
        }
        let value = self.lowest_pitch as usize + pitch;
        (value <= 127).then_some(value as u8)
    }

    /// Row of a MIDI note number, if it is on the grid
    pub fn pitch_index_for_value(&self, value: u8) -> Option<usize> {
        let index = (value as usize).checked_sub(self.lowest_pitch as usize)?;
        (index < self.pitch_count).then_some(index)
    }

    /// Pitch class (0 = C ... 11 = B) of a row, for display grouping
    pub fn pitch_class(&self, pitch: usize) -> u8 {
        ((pitch + self.lowest_pitch_class as usize) % 12) as u8
    }

    /// Shift every note by `semitones` rows
    ///
    /// Notes pushed past the top or bottom row are dropped. Returns true if the
    /// grid changed.
    pub fn transpose(&mut self, semitones: i32) -> bool {
        if semitones == 0 || self.is_empty() {
            return false;
        }

        let moved: Vec<GridTarget> = self.active_cells().collect();
        self.clear();
        for cell in moved {
            let shifted = cell.pitch as i64 + semitones as i64;
            if let Some(target) = self.target(cell.beat as i64, shifted) {
                self.toggle_cell(target.beat, target.pitch, true);
            }
        }
        true
    }

    /// Set `count` random cells (random song generation)
    ///
    /// Returns the number of cells that changed; already set cells hit twice
    /// do not count.
    pub fn scatter_random<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> usize {
        let mut changed = 0;
        for _ in 0..count {
            let beat = rng.gen_range(0..self.beat_count);
            let pitch = rng.gen_range(0..self.pitch_count);
            if self.toggle_cell(beat, pitch, true) {
                changed += 1;
            }
        }
        changed
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::piano()
    }
}
