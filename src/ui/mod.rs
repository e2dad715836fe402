// UI module - input routing and pie menus, independent of any windowing toolkit

pub mod input;
pub mod intent;
pub mod menus;
pub mod pie_menu;
pub mod router;

pub use input::{Key, Modifiers, PointerButton, PointerEvent, PointerKind};
pub use intent::{Intent, Tool};
pub use menus::{CommandItem, ParameterItem};
pub use pie_menu::{Adjustment, EventStatus, Hover, ItemKind, MenuMode, MenuProfile, PieMenu};
pub use router::{InputRouter, RolloverMode, RouterSettings};
