// Transport - background playback loop
//
// A dedicated thread ticks the player on a wall-clock cadence while the UI
// thread keeps editing the grid. Suspension and shutdown go through a condvar
// so the thread never busy-waits and can be interrupted while sleeping.
//
// Lock order is always: playback state, then player, then timeline.

use crate::audio::output::SoundOutput;
use crate::messaging::channels::NotificationProducer;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::sequencer::grid::{SharedTimeline, lock_timeline};
use crate::sequencer::player::{PlaybackState, SequencerPlayer, TickReport};
use ringbuf::traits::Producer;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Failed to spawn playback thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// State shared between the scheduler handle and its thread
struct Shared {
    state: Mutex<PlaybackState>,
    wake: Condvar,
    timeline: SharedTimeline,
    sound: Arc<dyn SoundOutput>,
    player: Mutex<SequencerPlayer>,
    notifications: Mutex<Option<NotificationProducer>>,
    redraw_pending: AtomicBool,
    tick_count: AtomicU64,
    sound_error_reported: AtomicBool,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn player(&self) -> SequencerPlayer {
        *self.player.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self, state: &mut PlaybackState) -> TickReport {
        let player = self.player();
        let report = {
            let timeline = lock_timeline(&self.timeline);
            player.advance(state, &timeline, self.sound.as_ref())
        };

        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.redraw_pending.store(true, Ordering::Release);
        self.report_sound_failure(&report);
        report
    }

    /// Report the first sound failure once; playback continues silently
    fn report_sound_failure(&self, report: &TickReport) {
        let Some(error) = &report.first_error else {
            return;
        };
        if self.sound_error_reported.swap(true, Ordering::AcqRel) {
            return;
        }

        log::warn!("Sound output failed, playback continues silently: {}", error);
        let mut notifications = self
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(producer) = notifications.as_mut()
            && producer
                .try_push(Notification::error(
                    NotificationCategory::Audio,
                    format!("Sound output failed: {}", error),
                ))
                .is_err()
        {
            log::warn!("Notification queue full, dropping sound failure notification");
        }
    }
}

fn run(shared: Arc<Shared>) {
    log::debug!("Playback loop started");
    let mut state = shared.lock_state();

    loop {
        while state.running && state.suspended {
            state = shared
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if !state.running {
            break;
        }

        shared.tick(&mut state);

        let interval = shared.player().interval(&state);
        let (guard, _) = shared
            .wake
            .wait_timeout_while(state, interval, |s| s.running && !s.suspended)
            .unwrap_or_else(PoisonError::into_inner);
        state = guard;
    }

    log::debug!("Playback loop finished at beat {}", state.current_beat);
}

/// Drives the play cursor through the shared timeline
///
/// `start` spawns the loop (or rewinds a running one), `pause`/`resume`
/// park and wake it without losing the position, `stop` ends it and releases
/// every sounding note. Dropping the scheduler stops it.
pub struct PlaybackScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackScheduler {
    pub fn new(
        timeline: SharedTimeline,
        sound: Arc<dyn SoundOutput>,
        player: SequencerPlayer,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PlaybackState::new()),
                wake: Condvar::new(),
                timeline,
                sound,
                player: Mutex::new(player),
                notifications: Mutex::new(None),
                redraw_pending: AtomicBool::new(false),
                tick_count: AtomicU64::new(0),
                sound_error_reported: AtomicBool::new(false),
            }),
            worker: None,
        }
    }

    /// Route sound failures to the editor's notification channel
    pub fn set_notification_sender(&self, producer: NotificationProducer) {
        *self
            .shared
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(producer);
    }

    pub fn timeline(&self) -> &SharedTimeline {
        &self.shared.timeline
    }

    pub fn player(&self) -> SequencerPlayer {
        self.shared.player()
    }

    /// Swap the tick settings; a running loop picks them up from its next interval
    pub fn set_player(&self, player: SequencerPlayer) {
        let _state = self.shared.lock_state();
        *self
            .shared
            .player
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = player;
    }

    /// Rewind to beat 0 and play
    ///
    /// Spawns the loop if it is not running; otherwise rewinds it and clears
    /// any suspension.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        let mut state = self.shared.lock_state();
        state.current_beat = 0;
        state.suspended = false;

        if state.running && self.worker.is_some() {
            drop(state);
            self.shared.wake.notify_all();
            log::debug!("Playback rewound");
            return Ok(());
        }

        state.running = true;
        drop(state);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("gridroll-playback".into())
            .spawn(move || run(shared));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                log::info!("Playback started");
                Ok(())
            }
            Err(e) => {
                self.shared.lock_state().running = false;
                Err(e.into())
            }
        }
    }

    /// Park the loop before its next tick; the cursor is kept
    ///
    /// Notes that are sounding are released so nothing hangs while paused.
    /// Does nothing unless the loop is running.
    pub fn pause(&self) {
        let mut state = self.shared.lock_state();
        if !state.running || state.suspended {
            return;
        }
        state.suspended = true;
        let report = self
            .shared
            .player()
            .release_sounding(&mut state, self.shared.sound.as_ref());
        drop(state);

        self.shared.wake.notify_all();
        self.shared.report_sound_failure(&report);
        log::debug!("Playback paused at beat {}", report.beat);
    }

    /// Wake a paused loop without rewinding
    pub fn resume(&self) {
        let mut state = self.shared.lock_state();
        if !state.suspended {
            return;
        }
        state.suspended = false;
        drop(state);

        self.shared.wake.notify_all();
        log::debug!("Playback resumed");
    }

    /// End the loop and release every sounding note
    ///
    /// Safe to call while the loop sleeps or is paused; it is woken
    /// immediately rather than finishing its interval.
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.lock_state();
            state.running = false;
            state.suspended = false;
        }
        self.shared.wake.notify_all();

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Playback thread panicked");
            }
            log::info!("Playback stopped");
        }

        let mut state = self.shared.lock_state();
        let player = self.shared.player();
        let timeline = lock_timeline(&self.shared.timeline);
        let report = player.release_column(&mut state, &timeline, self.shared.sound.as_ref());
        drop(timeline);
        drop(state);
        self.shared.report_sound_failure(&report);
    }

    /// Run exactly one tick on the calling thread
    pub fn step(&self) -> TickReport {
        let mut state = self.shared.lock_state();
        self.shared.tick(&mut state)
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock_state().running
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock_state().suspended
    }

    /// Running and not paused
    pub fn is_playing(&self) -> bool {
        let state = self.shared.lock_state();
        state.running && !state.suspended
    }

    pub fn current_beat(&self) -> usize {
        self.shared.lock_state().current_beat
    }

    pub fn tempo_multiplier(&self) -> f64 {
        self.shared.lock_state().tempo_multiplier
    }

    /// Set the interval multiplier; takes effect from the next interval
    ///
    /// Non-finite or non-positive values are ignored.
    pub fn set_tempo_multiplier(&self, multiplier: f64) {
        if multiplier.is_finite() && multiplier > 0.0 {
            self.shared.lock_state().tempo_multiplier = multiplier;
        }
    }

    /// Whether a tick happened since the last call
    pub fn take_redraw(&self) -> bool {
        self.shared.redraw_pending.swap(false, Ordering::AcqRel)
    }

    /// Total ticks since creation
    pub fn tick_count(&self) -> u64 {
        self.shared.tick_count.load(Ordering::Relaxed)
    }

    /// Snapshot of the playback state
    pub fn state(&self) -> PlaybackState {
        self.shared.lock_state().clone()
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::{NullOutput, SoundError};
    use crate::messaging::channels::create_notification_channel;
    use crate::sequencer::grid::Timeline;
    use ringbuf::traits::Consumer;

    struct Broken;

    impl SoundOutput for Broken {
        fn note_on(&self, _pitch: u8, _velocity: u8) -> Result<(), SoundError> {
            Err(SoundError::Unavailable("no synthesizer".into()))
        }
        fn note_off(&self, _pitch: u8) -> Result<(), SoundError> {
            Err(SoundError::Unavailable("no synthesizer".into()))
        }
    }

    fn scheduler_with(sound: Arc<dyn SoundOutput>) -> PlaybackScheduler {
        let mut timeline = Timeline::new(4, 88, 21, 9);
        timeline.toggle_cell(0, 40, true);
        timeline.toggle_cell(1, 40, true);
        PlaybackScheduler::new(timeline.into_shared(), sound, SequencerPlayer::default())
    }

    #[test]
    fn test_step_advances_and_flags_redraw() {
        let scheduler = scheduler_with(Arc::new(NullOutput));
        assert!(!scheduler.take_redraw());

        scheduler.step();
        assert_eq!(scheduler.current_beat(), 1);
        assert_eq!(scheduler.tick_count(), 1);
        assert!(scheduler.take_redraw());
        assert!(!scheduler.take_redraw());
    }

    #[test]
    fn test_sound_failure_is_reported_once() {
        let scheduler = scheduler_with(Arc::new(Broken));
        let (tx, mut rx) = create_notification_channel(8);
        scheduler.set_notification_sender(tx);

        scheduler.step();
        scheduler.step();
        scheduler.step();

        assert_eq!(scheduler.current_beat(), 3);
        assert!(rx.try_pop().is_some());
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_tempo_rejects_invalid_values() {
        let scheduler = scheduler_with(Arc::new(NullOutput));
        scheduler.set_tempo_multiplier(0.0);
        scheduler.set_tempo_multiplier(-1.0);
        scheduler.set_tempo_multiplier(f64::INFINITY);
        assert_eq!(scheduler.tempo_multiplier(), 1.0);

        scheduler.set_tempo_multiplier(0.25);
        assert_eq!(scheduler.tempo_multiplier(), 0.25);
    }

    #[test]
    fn test_pause_without_start_is_ignored() {
        let scheduler = scheduler_with(Arc::new(NullOutput));
        scheduler.pause();
        assert!(!scheduler.is_paused());
    }

    #[test]
    fn test_stop_without_start_is_harmless() {
        let mut scheduler = scheduler_with(Arc::new(NullOutput));
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_set_player_changes_interval() {
        let scheduler = scheduler_with(Arc::new(NullOutput));
        scheduler.set_player(SequencerPlayer::new(50, 100));

        assert_eq!(scheduler.player().base_interval_ms(), 50);
        scheduler.set_tempo_multiplier(0.5);
        assert_eq!(
            scheduler.player().interval(&scheduler.state()),
            std::time::Duration::from_millis(25)
        );
        scheduler.step();
        assert_eq!(scheduler.current_beat(), 1);
    }

    #[test]
    fn test_full_notification_queue_keeps_playing() {
        let scheduler = scheduler_with(Arc::new(Broken));
        let (mut tx, mut rx) = create_notification_channel(1);
        assert!(
            tx.try_push(Notification::info(NotificationCategory::Playback, "queued".to_string()))
                .is_ok()
        );
        scheduler.set_notification_sender(tx);

        scheduler.step();
        scheduler.step();

        assert_eq!(scheduler.current_beat(), 2);
        let queued = rx.try_pop().map(|n| n.message);
        assert_eq!(queued.as_deref(), Some("queued"));
        assert!(rx.try_pop().is_none());
    }
}
