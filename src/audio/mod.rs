// Audio module - sound output seam for playback and preview

pub mod output;

pub use output::{ChannelOutput, NullOutput, SoundError, SoundOutput};
