// Editor session - owns the timeline, the playback scheduler and the router
//
// The windowing shell feeds raw events in and draws from `snapshot`; every
// state change goes through `apply`.

use crate::audio::output::SoundOutput;
use crate::messaging::channels::{
    NotificationConsumer, NotificationProducer, create_notification_channel,
};
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::midi::sequence::{SequenceEvent, load_event_list, to_event_list};
use crate::project::config::EditorConfig;
use crate::project::manager::{ProjectError, ProjectLoadOptions, ProjectManager};
use crate::project::serialization::{project_from_timeline, timeline_from_project};
use crate::sequencer::grid::{GridTarget, SharedTimeline, Timeline, lock_timeline};
use crate::sequencer::pitch::{ScaleRole, note_name, scale_role};
use crate::sequencer::tempo::{TempoDrag, interval_label};
use crate::sequencer::transport::{PlaybackScheduler, SchedulerError};
use crate::ui::input::{Key, PointerEvent};
use crate::ui::intent::{Intent, Tool};
use crate::ui::router::InputRouter;
use crate::view::ViewTransform;
use rand::Rng;
use ringbuf::traits::{Consumer, Producer};
use std::path::Path;
use std::sync::{Arc, MutexGuard};

const NOTIFICATION_CAPACITY: usize = 64;

/// Everything a renderer needs for one frame, besides the grid cells
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub beat_count: usize,
    pub pitch_count: usize,
    /// Play cursor, while playback is running
    pub play_cursor: Option<usize>,
    pub is_playing: bool,
    pub tool: Tool,
    pub hover: Option<GridTarget>,
    /// Note name under the cursor, e.g. "C4"
    pub hover_label: Option<String>,
    pub tempo_multiplier: f64,
    /// Current tick interval in milliseconds
    pub tempo_label: u64,
    pub note_count: usize,
}

pub struct EditorSession {
    config: EditorConfig,
    timeline: SharedTimeline,
    scheduler: PlaybackScheduler,
    router: InputRouter,
    sound: Arc<dyn SoundOutput>,
    /// Raised by the playback thread
    notifications: NotificationConsumer,
    /// Raised by the session itself
    local_notifications: NotificationProducer,
    local_inbox: NotificationConsumer,
}

impl EditorSession {
    pub fn new(config: EditorConfig, sound: Arc<dyn SoundOutput>) -> Self {
        let timeline = config.new_timeline().into_shared();
        let scheduler =
            PlaybackScheduler::new(Arc::clone(&timeline), Arc::clone(&sound), config.player());

        let (producer, notifications) = create_notification_channel(NOTIFICATION_CAPACITY);
        scheduler.set_notification_sender(producer);
        let (local_notifications, local_inbox) = create_notification_channel(NOTIFICATION_CAPACITY);

        let transform = ViewTransform::new(config.viewport_width, config.viewport_height);
        let mut router = InputRouter::new(transform, config.router_settings());
        router.set_grid_shape(config.initial_beat_count, config.pitch_count);

        let mut session = Self {
            config,
            timeline,
            scheduler,
            router,
            sound,
            notifications,
            local_notifications,
            local_inbox,
        };
        session.frame_all();
        log::info!(
            "Editor session ready: {} beats x {} pitches",
            session.config.initial_beat_count,
            session.config.pitch_count
        );
        session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Shared handle to the grid
    pub fn timeline(&self) -> SharedTimeline {
        Arc::clone(&self.timeline)
    }

    /// Lock the grid for reading (renderers iterate `active_cells` through this)
    pub fn lock_timeline(&self) -> MutexGuard<'_, Timeline> {
        lock_timeline(&self.timeline)
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn transform(&self) -> &ViewTransform {
        self.router.transform()
    }

    /// Route a pointer event and apply the resulting intents
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Result<Vec<Intent>, SchedulerError> {
        let intents = self.router.handle_pointer(event);
        self.apply_all(&intents)?;
        Ok(intents)
    }

    pub fn key_pressed(&mut self, key: Key) -> Result<Vec<Intent>, SchedulerError> {
        let intents = self.router.key_pressed(key);
        self.apply_all(&intents)?;
        Ok(intents)
    }

    pub fn key_released(&mut self, key: Key) -> Result<Vec<Intent>, SchedulerError> {
        let intents = self.router.key_released(key);
        self.apply_all(&intents)?;
        Ok(intents)
    }

    fn apply_all(&mut self, intents: &[Intent]) -> Result<(), SchedulerError> {
        for intent in intents {
            self.apply(*intent)?;
        }
        Ok(())
    }

    /// Apply one intent; returns whether anything changed
    pub fn apply(&mut self, intent: Intent) -> Result<bool, SchedulerError> {
        let changed = match intent {
            Intent::ToggleCell { beat, pitch, value } => {
                self.lock_timeline().toggle_cell(beat, pitch, value)
            }
            Intent::SetTempo { multiplier } => {
                let Some(multiplier) = TempoDrag::new(self.config.tempo_floor).clamp(multiplier)
                else {
                    return Ok(false);
                };
                self.scheduler.set_tempo_multiplier(multiplier);
                true
            }
            Intent::ResizeBeats { delta } => {
                let (resized, beats, pitches) = {
                    let mut timeline = self.lock_timeline();
                    let target = timeline.beat_count() as i64 + delta;
                    let resized = timeline.resize(target);
                    (resized, timeline.beat_count(), timeline.pitch_count())
                };
                if resized {
                    self.router.set_grid_shape(beats, pitches);
                    log::debug!("Timeline resized to {} beats", beats);
                }
                resized
            }
            Intent::Transpose { semitones } => self.lock_timeline().transpose(semitones),
            Intent::Play => {
                if let Err(e) = self.scheduler.start() {
                    self.notify(Notification::error(
                        NotificationCategory::Playback,
                        format!("Cannot start playback: {}", e),
                    ));
                    return Err(e);
                }
                true
            }
            Intent::Pause => {
                self.scheduler.pause();
                true
            }
            Intent::Resume => {
                self.scheduler.resume();
                true
            }
            Intent::Stop => {
                self.scheduler.stop();
                true
            }
            Intent::SetTool(tool) => {
                let changed = self.router.tool() != tool;
                self.router.set_tool(tool);
                changed
            }
            Intent::PreviewNoteOn { pitch } => {
                let value = self.lock_timeline().pitch_value(pitch);
                if let Some(value) = value
                    && let Err(e) = self.sound.note_on(value, self.config.note_velocity)
                {
                    log::warn!("Preview note {} failed: {}", value, e);
                }
                false
            }
            Intent::PreviewNoteOff { pitch } => {
                let value = self.lock_timeline().pitch_value(pitch);
                if let Some(value) = value
                    && let Err(e) = self.sound.note_off(value)
                {
                    log::warn!("Preview note {} failed: {}", value, e);
                }
                false
            }
        };
        Ok(changed)
    }

    pub fn play(&mut self) -> Result<(), SchedulerError> {
        self.apply(Intent::Play).map(|_| ())
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Fit the whole grid into the viewport
    pub fn frame_all(&mut self) {
        let extent = self.lock_timeline().bounding_extent();
        self.router.transform_mut().frame(extent, false);
    }

    pub fn resize_viewport(&mut self, width: f32, height: f32) {
        self.router.transform_mut().resize_viewport(width, height);
        if self.config.auto_frame {
            self.frame_all();
        }
    }

    /// Remove every note
    pub fn clear(&mut self) {
        self.lock_timeline().clear();
    }

    /// Scatter `count` random notes over the grid, returning how many were added
    pub fn generate_random_song<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> usize {
        let mut timeline = self.lock_timeline();
        timeline.clear();
        timeline.scatter_random(rng, count)
    }

    /// Grid as a note event list for a sequence file writer
    pub fn export_events(&self) -> Vec<SequenceEvent> {
        to_event_list(&self.lock_timeline())
    }

    /// Replace the grid contents with a note event list; returns notes loaded
    pub fn import_events(&mut self, events: &[SequenceEvent]) -> usize {
        let loaded = load_event_list(&mut self.lock_timeline(), events);
        let offered = events.iter().filter(|e| e.is_note_on()).count();

        let notification = if loaded < offered {
            Notification::warning(
                NotificationCategory::Project,
                format!("Loaded {} notes, skipped {} outside the grid", loaded, offered - loaded),
            )
        } else {
            Notification::info(NotificationCategory::Project, format!("Loaded {} notes", loaded))
        };
        self.notify(notification);
        loaded
    }

    pub fn save_project<P: AsRef<Path>>(
        &self,
        manager: &ProjectManager,
        name: &str,
        path: P,
    ) -> Result<(), ProjectError> {
        // Playback state before the timeline, never the other way around
        let tempo = self.scheduler.tempo_multiplier();
        let project = project_from_timeline(name, &self.lock_timeline(), &self.config, tempo);
        manager.save_project(&project, path)
    }

    /// Replace the grid, tempo and config with a saved project
    ///
    /// The loaded config also retunes playback and input; the viewport size
    /// stays the shell's.
    pub fn load_project<P: AsRef<Path>>(
        &mut self,
        manager: &ProjectManager,
        path: P,
        options: &ProjectLoadOptions,
    ) -> Result<(), ProjectError> {
        let project = match manager.load_project(path, options) {
            Ok(project) => project,
            Err(e) => {
                self.notify(Notification::error(
                    NotificationCategory::Project,
                    format!("Failed to load project: {}", e),
                ));
                return Err(e);
            }
        };

        let restored = timeline_from_project(&project);
        let (beats, pitches) = (restored.beat_count(), restored.pitch_count());
        *self.lock_timeline() = restored;

        self.config = project.config;
        self.scheduler.set_player(self.config.player());
        self.scheduler.set_tempo_multiplier(project.tempo_multiplier);
        self.router.set_settings(self.config.router_settings());
        self.router.set_grid_shape(beats, pitches);
        self.frame_all();

        self.notify(Notification::info(
            NotificationCategory::Project,
            format!("Opened '{}'", project.metadata.name),
        ));
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        if self.local_notifications.try_push(notification).is_err() {
            log::warn!("Notification queue full, dropping notification");
        }
    }

    /// Notifications raised since the last call, oldest first
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut drained: Vec<Notification> = self.notifications.pop_iter().collect();
        drained.extend(self.local_inbox.pop_iter());
        drained.sort_by_key(|n| n.timestamp);
        drained
    }

    /// Whether the view should be repainted (edits, menus or a playback tick)
    pub fn take_redraw(&mut self) -> bool {
        let router = self.router.take_redraw();
        let playback = self.scheduler.take_redraw();
        router || playback
    }

    /// Row shading for a grid row, honoring the major-scale highlight setting
    pub fn row_role(&self, pitch: usize) -> Option<ScaleRole> {
        let value = self.lock_timeline().pitch_value(pitch)?;
        if self.config.highlight_major_scale {
            Some(scale_role(value))
        } else {
            Some(ScaleRole::OutOfScale)
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let state = self.scheduler.state();
        let is_playing = state.running && !state.suspended;
        let hover = self.router.hover();

        let timeline = self.lock_timeline();
        let hover_label = hover
            .and_then(|cell| timeline.pitch_value(cell.pitch))
            .map(note_name);

        RenderSnapshot {
            beat_count: timeline.beat_count(),
            pitch_count: timeline.pitch_count(),
            play_cursor: state.running.then_some(state.current_beat),
            is_playing,
            tool: self.router.tool(),
            hover,
            hover_label,
            tempo_multiplier: state.tempo_multiplier,
            tempo_label: interval_label(state.tempo_multiplier, self.config.base_interval_ms),
            note_count: timeline.note_count(),
        }
    }
}
