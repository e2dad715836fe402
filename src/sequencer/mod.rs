// Sequencer module
// Note grid, playback tick logic, tempo control and the threaded transport

pub mod grid;
pub mod pitch;
pub mod player;
pub mod tempo;
pub mod transport;

pub use grid::{GridTarget, SharedTimeline, Timeline, lock_timeline};
pub use pitch::{ScaleRole, note_name, scale_role};
pub use player::{PlaybackState, SequencerPlayer, TickReport};
pub use tempo::TempoDrag;
pub use transport::{PlaybackScheduler, SchedulerError};
