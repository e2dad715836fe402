// Intents - what the user asked for, decoupled from how it was asked
//
// The router turns raw pointer and key events into intents; the session
// applies them to the timeline and the playback scheduler.

use serde::{Deserialize, Serialize};

/// Editing tool used when painting on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Draw,
    Erase,
}

impl Tool {
    /// Cell value this tool paints
    pub fn paints(&self) -> bool {
        matches!(self, Tool::Draw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Set one cell to `value`
    ToggleCell { beat: usize, pitch: usize, value: bool },

    /// Replace the tempo multiplier
    SetTempo { multiplier: f64 },

    /// Grow or shrink the timeline by `delta` beats (content is discarded)
    ResizeBeats { delta: i64 },

    /// Shift every note by whole rows
    Transpose { semitones: i32 },

    /// Rewind and play
    Play,
    Pause,
    /// Continue a paused loop from its cursor
    Resume,
    Stop,

    SetTool(Tool),

    /// Audition the pitch row under the cursor
    PreviewNoteOn { pitch: usize },
    PreviewNoteOff { pitch: usize },
}
