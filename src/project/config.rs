// Editor configuration, stored as RON

use crate::midi::event::DEFAULT_VELOCITY;
use crate::project::ProjectError;
use crate::sequencer::grid::{
    DEFAULT_BEAT_COUNT, DEFAULT_LOWEST_PITCH, DEFAULT_LOWEST_PITCH_CLASS, DEFAULT_PITCH_COUNT,
    MAX_BEAT_COUNT, MAX_PITCH_COUNT, Timeline,
};
use crate::sequencer::player::{DEFAULT_BASE_INTERVAL_MS, SequencerPlayer};
use crate::sequencer::tempo::{DEFAULT_TEMPO_FLOOR, TempoDrag};
use crate::ui::pie_menu::{DEFAULT_DEAD_ZONE_RADIUS, DEFAULT_MENU_RADIUS};
use crate::ui::router::{RolloverMode, RouterSettings};
use crate::view::transform::DEFAULT_ZOOM_FACTOR_PER_PIXEL;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables of the editor; missing fields take their defaults when loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid rows
    pub pitch_count: usize,
    /// MIDI note number of the bottom row
    pub lowest_pitch: u8,
    /// Pitch class of the bottom row (0 = C)
    pub lowest_pitch_class: u8,
    /// Beats of a new timeline
    pub initial_beat_count: usize,

    /// Tick interval at tempo multiplier 1.0
    pub base_interval_ms: u64,
    /// Lowest tempo multiplier a drag can reach
    pub tempo_floor: f64,
    pub note_velocity: u8,

    pub dead_zone_radius: f32,
    pub menu_radius: f32,
    pub zoom_factor_per_pixel: f32,
    pub rollover_mode: RolloverMode,

    /// Shade rows of the C major scale
    pub highlight_major_scale: bool,
    /// Re-frame the whole grid whenever the viewport is resized
    pub auto_frame: bool,

    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pitch_count: DEFAULT_PITCH_COUNT,
            lowest_pitch: DEFAULT_LOWEST_PITCH,
            lowest_pitch_class: DEFAULT_LOWEST_PITCH_CLASS,
            initial_beat_count: DEFAULT_BEAT_COUNT,
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            tempo_floor: DEFAULT_TEMPO_FLOOR,
            note_velocity: DEFAULT_VELOCITY,
            dead_zone_radius: DEFAULT_DEAD_ZONE_RADIUS,
            menu_radius: DEFAULT_MENU_RADIUS,
            zoom_factor_per_pixel: DEFAULT_ZOOM_FACTOR_PER_PIXEL,
            rollover_mode: RolloverMode::DoNothing,
            highlight_major_scale: true,
            auto_frame: true,
            viewport_width: 1024.0,
            viewport_height: 768.0,
        }
    }
}

impl EditorConfig {
    /// Reject values the editor cannot run with
    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.pitch_count == 0 {
            return Err(ProjectError::InvalidStructure(
                "pitch_count must be at least 1".to_string(),
            ));
        }
        let top = (self.lowest_pitch as usize).checked_add(self.pitch_count);
        if top.is_none_or(|top| top > MAX_PITCH_COUNT) {
            return Err(ProjectError::InvalidStructure(format!(
                "{} rows starting at note {} exceed the MIDI range",
                self.pitch_count, self.lowest_pitch
            )));
        }
        if self.lowest_pitch_class > 11 {
            return Err(ProjectError::InvalidStructure(
                "lowest_pitch_class must be between 0 and 11".to_string(),
            ));
        }
        if self.initial_beat_count == 0 || self.initial_beat_count > MAX_BEAT_COUNT {
            return Err(ProjectError::InvalidStructure(format!(
                "initial_beat_count must be between 1 and {}",
                MAX_BEAT_COUNT
            )));
        }
        if self.base_interval_ms == 0 {
            return Err(ProjectError::InvalidStructure(
                "base_interval_ms must be at least 1".to_string(),
            ));
        }
        if !self.tempo_floor.is_finite() || self.tempo_floor <= 0.0 || self.tempo_floor >= 1.0 {
            return Err(ProjectError::InvalidStructure(
                "tempo_floor must be in (0, 1)".to_string(),
            ));
        }
        if self.note_velocity > 127 {
            return Err(ProjectError::InvalidStructure(
                "note_velocity exceeds MIDI range (0-127)".to_string(),
            ));
        }
        if !self.zoom_factor_per_pixel.is_finite() || self.zoom_factor_per_pixel <= 0.0 {
            return Err(ProjectError::InvalidStructure(
                "zoom_factor_per_pixel must be positive".to_string(),
            ));
        }
        if self.dead_zone_radius < 0.0 || self.menu_radius < self.dead_zone_radius {
            return Err(ProjectError::InvalidStructure(
                "menu_radius must be at least dead_zone_radius, both non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_ron_str(data: &str) -> Result<Self, ProjectError> {
        let config: Self = ron::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ProjectError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProjectError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron_str(&data)?;
        log::debug!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ProjectError> {
        if !path.as_ref().exists() {
            log::info!(
                "No config at {}, using defaults",
                path.as_ref().display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Empty timeline with the configured shape
    pub fn new_timeline(&self) -> Timeline {
        Timeline::new(
            self.initial_beat_count,
            self.pitch_count,
            self.lowest_pitch,
            self.lowest_pitch_class,
        )
    }

    pub fn player(&self) -> SequencerPlayer {
        SequencerPlayer::new(self.base_interval_ms, self.note_velocity)
    }

    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings {
            dead_zone_radius: self.dead_zone_radius,
            menu_radius: self.menu_radius,
            zoom_factor_per_pixel: self.zoom_factor_per_pixel,
            tempo: TempoDrag::new(self.tempo_floor),
            rollover_mode: self.rollover_mode,
        }
    }
}
