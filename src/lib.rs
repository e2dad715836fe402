// gridroll - Library exports for the editor shell, tests and benchmarks

pub mod audio;
pub mod messaging;
pub mod midi;
pub mod project;
pub mod sequencer;
pub mod session;
pub mod ui;
pub mod view;

// Re-export commonly used types for convenience
pub use audio::output::{ChannelOutput, NullOutput, SoundError, SoundOutput};
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use midi::event::MidiEvent;
pub use midi::sequence::{
    SequenceEvent, TICKS_PER_BEAT, from_event_list, from_raw_messages, load_event_list,
    to_event_list,
};
pub use project::config::EditorConfig;
pub use project::{ProjectError, ProjectLoadOptions, ProjectManager};
pub use sequencer::{
    GridTarget, PlaybackScheduler, SchedulerError, SharedTimeline, TempoDrag, Timeline,
};
pub use session::{EditorSession, RenderSnapshot};
pub use ui::input::{Key, Modifiers, PointerButton, PointerEvent, PointerKind};
pub use ui::intent::{Intent, Tool};
pub use ui::menus::{CommandItem, ParameterItem};
pub use ui::pie_menu::{EventStatus, ItemKind, MenuProfile, PieMenu};
pub use ui::router::{InputRouter, RolloverMode};
pub use view::{Point2, Rect, ViewTransform};
