// Input router - pointer and key events to menus, view and intents
//
// Priority per event: command menu, then parameter menu, then grid editing.
// Pan and zoom only touch the view, so they are applied here; everything
// that changes the timeline or playback leaves as an Intent.

use crate::sequencer::GridTarget;
use crate::sequencer::tempo::TempoDrag;
use crate::ui::input::{Key, PointerEvent, PointerKind};
use crate::ui::intent::{Intent, Tool};
use crate::ui::menus::{CommandItem, ParameterItem, command_menu, parameter_menu};
use crate::ui::pie_menu::{Adjustment, EventStatus, PieMenu};
use crate::view::{Point2, ViewTransform};
use crate::view::transform::DEFAULT_ZOOM_FACTOR_PER_PIXEL;
use serde::{Deserialize, Serialize};

/// What hovering over a pitch row does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RolloverMode {
    #[default]
    DoNothing,
    PlayPitch,
    /// Only while control is held
    PlayPitchWhileModifierHeld,
}

/// Router tuning, usually taken from the editor config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterSettings {
    pub dead_zone_radius: f32,
    pub menu_radius: f32,
    pub zoom_factor_per_pixel: f32,
    pub tempo: TempoDrag,
    pub rollover_mode: RolloverMode,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            dead_zone_radius: crate::ui::pie_menu::DEFAULT_DEAD_ZONE_RADIUS,
            menu_radius: crate::ui::pie_menu::DEFAULT_MENU_RADIUS,
            zoom_factor_per_pixel: DEFAULT_ZOOM_FACTOR_PER_PIXEL,
            tempo: TempoDrag::default(),
            rollover_mode: RolloverMode::DoNothing,
        }
    }
}

pub struct InputRouter {
    command_menu: PieMenu<CommandItem>,
    parameter_menu: PieMenu<ParameterItem>,
    transform: ViewTransform,
    settings: RouterSettings,
    tool: Tool,

    /// Grid shape used for hit-testing (beats, pitches)
    grid_shape: (usize, usize),

    stroke_active: bool,
    last_painted: Option<GridTarget>,
    hover: Option<GridTarget>,
    control_held: bool,
    previewing: Option<usize>,

    transpose_applied: i32,
    duration_residual: f32,
    redraw: bool,
}

impl InputRouter {
    pub fn new(transform: ViewTransform, settings: RouterSettings) -> Self {
        Self {
            command_menu: command_menu(settings.dead_zone_radius, settings.menu_radius),
            parameter_menu: parameter_menu(settings.dead_zone_radius, settings.menu_radius),
            transform,
            settings,
            tool: Tool::Draw,
            grid_shape: (0, 0),
            stroke_active: false,
            last_painted: None,
            hover: None,
            control_held: false,
            previewing: None,
            transpose_applied: 0,
            duration_residual: 0.0,
            redraw: false,
        }
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut ViewTransform {
        self.redraw = true;
        &mut self.transform
    }

    pub fn command_menu(&self) -> &PieMenu<CommandItem> {
        &self.command_menu
    }

    pub fn parameter_menu(&self) -> &PieMenu<ParameterItem> {
        &self.parameter_menu
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Replace the tuning, rebuilding both menus for the new radii
    ///
    /// Any open menu or gesture is dropped.
    pub fn set_settings(&mut self, settings: RouterSettings) {
        self.command_menu = command_menu(settings.dead_zone_radius, settings.menu_radius);
        self.parameter_menu = parameter_menu(settings.dead_zone_radius, settings.menu_radius);
        self.settings = settings;
        self.stroke_active = false;
        self.last_painted = None;
        self.transpose_applied = 0;
        self.duration_residual = 0.0;
        self.redraw = true;
    }

    pub fn rollover_mode(&self) -> RolloverMode {
        self.settings.rollover_mode
    }

    pub fn set_rollover_mode(&mut self, mode: RolloverMode) {
        self.settings.rollover_mode = mode;
    }

    /// Cell under the pointer, for cursor lines and the datatip
    pub fn hover(&self) -> Option<GridTarget> {
        self.hover
    }

    pub fn set_grid_shape(&mut self, beat_count: usize, pitch_count: usize) {
        self.grid_shape = (beat_count, pitch_count);
        self.last_painted = None;
    }

    /// Whether anything visual changed since the last call
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn mark(&mut self, status: EventStatus) -> EventStatus {
        if status.needs_redraw() {
            self.redraw = true;
        }
        status
    }

    /// Route one pointer event, returning the intents it produced
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<Intent> {
        let mut intents = Vec::new();
        self.control_held = event.modifiers.control;

        match event.kind {
            PointerKind::Press => self.on_press(event, &mut intents),
            PointerKind::Drag => self.on_drag(event, &mut intents),
            PointerKind::Release => self.on_release(event, &mut intents),
            PointerKind::Move => self.on_move(event, &mut intents),
        }
        intents
    }

    fn on_press(&mut self, event: &PointerEvent, intents: &mut Vec<Intent>) {
        let pos = event.position;
        let primary = event.is_primary();

        if self.command_menu.is_visible() || (primary && event.modifiers.control) {
            let status = self.command_menu.press(pos, primary && event.modifiers.control);
            if self.mark(status).is_consumed() {
                return;
            }
        }
        if self.parameter_menu.is_visible() || (primary && event.modifiers.shift) {
            let status = self.parameter_menu.press(pos, primary && event.modifiers.shift);
            if self.mark(status).is_consumed() {
                return;
            }
        }

        if primary {
            self.stroke_active = true;
            self.last_painted = None;
            self.paint(pos, intents);
        }
    }

    fn on_drag(&mut self, event: &PointerEvent, intents: &mut Vec<Intent>) {
        let pos = event.position;

        if self.command_menu.is_visible() {
            let status = self.command_menu.drag(pos);
            if self.mark(status).is_consumed() {
                return;
            }
        }
        if self.parameter_menu.is_visible() {
            let status = self.parameter_menu.drag(pos);
            if let Some(adjustment) = self.parameter_menu.take_adjustment() {
                self.apply_adjustment(adjustment, intents);
            }
            if self.mark(status).is_consumed() {
                return;
            }
        }

        if self.stroke_active {
            self.paint(pos, intents);
        }
    }

    fn on_release(&mut self, event: &PointerEvent, intents: &mut Vec<Intent>) {
        let pos = event.position;
        self.stroke_active = false;
        self.last_painted = None;

        if self.command_menu.is_visible() {
            let status = self.command_menu.release(pos);
            if let Some(id) = self.command_menu.take_committed() {
                intents.push(match id {
                    CommandItem::Play => Intent::Play,
                    CommandItem::Stop => Intent::Pause,
                    CommandItem::Draw => Intent::SetTool(Tool::Draw),
                    CommandItem::Erase => Intent::SetTool(Tool::Erase),
                });
            }
            if self.mark(status).is_consumed() {
                return;
            }
        }
        if self.parameter_menu.is_visible() {
            let status = self.parameter_menu.release(pos);
            if let Some(id) = self.parameter_menu.take_committed() {
                log::debug!("Adjusting {:?}", id);
                self.transpose_applied = 0;
                self.duration_residual = 0.0;
            }
            self.mark(status);
        }
    }

    fn on_move(&mut self, event: &PointerEvent, intents: &mut Vec<Intent>) {
        let pos = event.position;

        if self.command_menu.is_visible() {
            let status = self.command_menu.hover(pos);
            if self.mark(status).is_consumed() {
                return;
            }
        }
        if self.parameter_menu.is_visible() {
            let status = self.parameter_menu.hover(pos);
            if self.mark(status).is_consumed() {
                return;
            }
        }

        self.update_hover(pos, intents);
    }

    /// Apply the active tool to the cell under the pointer once per cell
    fn paint(&mut self, pos: Point2, intents: &mut Vec<Intent>) {
        self.update_hover(pos, intents);

        let target = self.target_at(pos);
        if target != self.last_painted
            && let Some(cell) = target
        {
            intents.push(Intent::ToggleCell {
                beat: cell.beat,
                pitch: cell.pitch,
                value: self.tool.paints(),
            });
        }
        self.last_painted = target;
    }

    fn target_at(&self, pos: Point2) -> Option<GridTarget> {
        let (beats, pitches) = self.grid_shape;
        self.transform.grid_target(pos.x, pos.y, beats, pitches)
    }

    fn update_hover(&mut self, pos: Point2, intents: &mut Vec<Intent>) {
        let target = self.target_at(pos);
        if target == self.hover {
            return;
        }

        let old_pitch = self.hover.map(|cell| cell.pitch);
        let new_pitch = target.map(|cell| cell.pitch);
        self.hover = target;
        self.redraw = true;

        if old_pitch != new_pitch {
            self.stop_preview(intents);
            if self.rollover_plays()
                && let Some(pitch) = new_pitch
            {
                self.start_preview(pitch, intents);
            }
        }
    }

    fn rollover_plays(&self) -> bool {
        match self.settings.rollover_mode {
            RolloverMode::DoNothing => false,
            RolloverMode::PlayPitch => true,
            RolloverMode::PlayPitchWhileModifierHeld => self.control_held,
        }
    }

    fn start_preview(&mut self, pitch: usize, intents: &mut Vec<Intent>) {
        self.previewing = Some(pitch);
        intents.push(Intent::PreviewNoteOn { pitch });
    }

    fn stop_preview(&mut self, intents: &mut Vec<Intent>) {
        if let Some(pitch) = self.previewing.take() {
            intents.push(Intent::PreviewNoteOff { pitch });
        }
    }

    pub fn key_pressed(&mut self, key: Key) -> Vec<Intent> {
        let mut intents = Vec::new();
        match key {
            Key::Control => {
                self.control_held = true;
                if self.settings.rollover_mode == RolloverMode::PlayPitchWhileModifierHeld
                    && self.previewing.is_none()
                    && let Some(cell) = self.hover
                {
                    self.start_preview(cell.pitch, &mut intents);
                }
            }
            Key::Space => intents.push(Intent::Resume),
            Key::Other => {}
        }
        intents
    }

    pub fn key_released(&mut self, key: Key) -> Vec<Intent> {
        let mut intents = Vec::new();
        if key == Key::Control {
            self.control_held = false;
            self.stop_preview(&mut intents);
        }
        intents
    }

    fn apply_adjustment(&mut self, adjustment: Adjustment<ParameterItem>, intents: &mut Vec<Intent>) {
        let Adjustment {
            id,
            from_anchor,
            step,
        } = adjustment;

        match id {
            ParameterItem::Pan => {
                self.transform.pan(step.x, step.y);
            }
            ParameterItem::Zoom => {
                let factor = ViewTransform::zoom_factor_for_drag(
                    self.settings.zoom_factor_per_pixel,
                    step.x,
                    step.y,
                );
                self.transform.zoom_about_center(factor);
            }
            ParameterItem::Tempo => {
                let multiplier = self
                    .settings
                    .tempo
                    .multiplier(from_anchor.x, self.transform.viewport_width());
                intents.push(Intent::SetTempo { multiplier });
            }
            ParameterItem::TotalDuration => {
                self.duration_residual += step.x;
                let delta = self.duration_residual.trunc();
                if delta != 0.0 {
                    self.duration_residual -= delta;
                    intents.push(Intent::ResizeBeats {
                        delta: delta as i64,
                    });
                }
            }
            ParameterItem::Transpose => {
                let row_height = self.transform.scale().y;
                let rows = (-from_anchor.y / row_height).round() as i32;
                let semitones = rows - self.transpose_applied;
                if semitones != 0 {
                    self.transpose_applied = rows;
                    intents.push(Intent::Transpose { semitones });
                }
            }
        }
        self.redraw = true;
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(ViewTransform::default(), RouterSettings::default())
    }
}
