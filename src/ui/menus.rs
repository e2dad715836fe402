// The editor's two pie menus and their layouts

use crate::ui::pie_menu::{DEFAULT_SECTOR_COUNT, ItemKind, MenuProfile, PieMenu};

/// Transport and tool commands (summoned with control + primary press)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandItem {
    Play,
    /// Pauses playback; the cursor stays where it is
    Stop,
    Draw,
    Erase,
}

/// Parameters adjusted by dragging (summoned with shift + primary press)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterItem {
    Tempo,
    Pan,
    Zoom,
    TotalDuration,
    Transpose,
}

impl ParameterItem {
    pub fn label(&self) -> &'static str {
        match self {
            ParameterItem::Tempo => "Tempo ↑",
            ParameterItem::Pan => "Pan",
            ParameterItem::Zoom => "Zoom →",
            ParameterItem::TotalDuration => "Total Duration ↓",
            ParameterItem::Transpose => "← Transpose",
        }
    }
}

/// Command menu; the dead zone also stops playback
pub fn command_menu(dead_zone_radius: f32, radius: f32) -> PieMenu<CommandItem> {
    let mut menu = PieMenu::new(MenuProfile::Momentary, DEFAULT_SECTOR_COUNT)
        .with_dead_zone_radius(dead_zone_radius)
        .with_radius(radius);

    menu.set_central_item("", CommandItem::Stop, ItemKind::Instant);
    menu.set_item(1, "STOP ◼", CommandItem::Stop, ItemKind::Instant);
    menu.set_item(3, "Draw ♪", CommandItem::Draw, ItemKind::Instant);
    menu.set_item(5, "PLAY ►", CommandItem::Play, ItemKind::Instant);
    menu.set_item(7, "Erase ○", CommandItem::Erase, ItemKind::Instant);
    menu
}

/// Parameter menu; the dead zone is inert
pub fn parameter_menu(dead_zone_radius: f32, radius: f32) -> PieMenu<ParameterItem> {
    let mut menu = PieMenu::new(MenuProfile::ContinuousParameter, DEFAULT_SECTOR_COUNT)
        .with_dead_zone_radius(dead_zone_radius)
        .with_radius(radius);

    for (sector, item) in [
        (1, ParameterItem::Tempo),
        (2, ParameterItem::Pan),
        (3, ParameterItem::Zoom),
        (5, ParameterItem::TotalDuration),
        (7, ParameterItem::Transpose),
    ] {
        menu.set_item(sector, item.label(), item, ItemKind::Continuous);
    }
    menu
}
