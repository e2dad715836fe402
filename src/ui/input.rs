// Device-independent input events fed to the router

use crate::view::Point2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    /// Any other button; it never paints or opens a menu
    Secondary,
}

/// Modifier keys held while the event happened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        control: false,
        shift: false,
    };

    pub const CONTROL: Self = Self {
        control: true,
        shift: false,
    };

    pub const SHIFT: Self = Self {
        control: false,
        shift: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    /// Movement with a button held
    Drag,
    Release,
    /// Movement with no button held
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Pixel position, y growing downward
    pub position: Point2,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            position: Point2::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn press(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Press, x, y)
    }

    pub fn drag(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Drag, x, y)
    }

    pub fn release(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Release, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.button == PointerButton::Primary
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Control,
    /// Resumes a paused playback
    Space,
    Other,
}
