// Pie menu - radial selector driven by press/drag/release
//
// One state machine serves both profiles. Items are classified as Instant or
// Continuous; a Continuous item committed on a ContinuousParameter menu keeps
// the menu in Adjusting mode and turns further drags into adjustments.

use crate::view::Point2;
use std::fmt;

/// Sector count used by the editor's menus
pub const DEFAULT_SECTOR_COUNT: usize = 8;

/// Radius in pixels of the central region that always selects the central item
pub const DEFAULT_DEAD_ZONE_RADIUS: f32 = 20.0;

/// Outer radius in pixels, used by renderers only
pub const DEFAULT_MENU_RADIUS: f32 = 100.0;

/// Tolerance for angles that land on a sector boundary after float rounding
const BOUNDARY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuProfile {
    /// Commit fires the item and hides the menu
    Momentary,
    /// Committing a Continuous item starts a parameter adjustment
    ContinuousParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Instant,
    Continuous,
}

/// Result of feeding one event to a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Consumed and the menu's visual state changed
    Redraw,
    /// Consumed, nothing to repaint
    Consumed,
    /// Not for this menu; the caller should route it elsewhere
    NotConsumed,
}

impl EventStatus {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, EventStatus::NotConsumed)
    }

    pub fn needs_redraw(&self) -> bool {
        matches!(self, EventStatus::Redraw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuMode {
    Idle,
    Tracking,
    Adjusting,
}

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hover {
    Nothing,
    Central,
    Sector(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem<I> {
    pub label: String,
    pub id: I,
    pub kind: ItemKind,
}

/// Pointer travel reported while adjusting a Continuous item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment<I> {
    pub id: I,
    /// Offset of the pointer from the anchor sample
    pub from_anchor: Point2,
    /// Offset from the previous sample
    pub step: Point2,
}

/// Sector containing `degrees`, measured clockwise from straight up
///
/// Sectors are half-open: an angle on a boundary belongs to the sector that
/// starts there.
pub fn sector_for_angle(degrees: f64, sector_count: usize) -> usize {
    if sector_count == 0 {
        return 0;
    }
    let span = 360.0 / sector_count as f64;
    let normalized = degrees.rem_euclid(360.0);
    ((normalized / span + BOUNDARY_EPSILON).floor() as usize) % sector_count
}

/// Clockwise angle in degrees from straight up, in pixel space (y down)
pub fn angle_from_center(center: Point2, pointer: Point2) -> f64 {
    let dx = (pointer.x - center.x) as f64;
    let dy = (pointer.y - center.y) as f64;
    dx.atan2(-dy).to_degrees().rem_euclid(360.0)
}

pub struct PieMenu<I> {
    profile: MenuProfile,
    sector_count: usize,
    items: Vec<Option<MenuItem<I>>>,
    central_item: Option<MenuItem<I>>,
    dead_zone_radius: f32,
    radius: f32,

    visible: bool,
    mode: MenuMode,
    center: Point2,
    hovered: Hover,
    selected_id: Option<I>,
    committed: Option<I>,

    anchor: Option<Point2>,
    last_sample: Point2,
    adjustment: Option<Adjustment<I>>,
}

impl<I: Copy + PartialEq + fmt::Debug> PieMenu<I> {
    pub fn new(profile: MenuProfile, sector_count: usize) -> Self {
        let sector_count = sector_count.max(1);
        Self {
            profile,
            sector_count,
            items: (0..sector_count).map(|_| None).collect(),
            central_item: None,
            dead_zone_radius: DEFAULT_DEAD_ZONE_RADIUS,
            radius: DEFAULT_MENU_RADIUS,
            visible: false,
            mode: MenuMode::Idle,
            center: Point2::default(),
            hovered: Hover::Nothing,
            selected_id: None,
            committed: None,
            anchor: None,
            last_sample: Point2::default(),
            adjustment: None,
        }
    }

    pub fn with_dead_zone_radius(mut self, radius: f32) -> Self {
        self.dead_zone_radius = radius.max(0.0);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(self.dead_zone_radius);
        self
    }

    /// Bind a sector; indices past the sector count are ignored
    pub fn set_item(&mut self, sector: usize, label: &str, id: I, kind: ItemKind) {
        if let Some(slot) = self.items.get_mut(sector) {
            *slot = Some(MenuItem {
                label: label.to_string(),
                id,
                kind,
            });
        }
    }

    pub fn set_central_item(&mut self, label: &str, id: I, kind: ItemKind) {
        self.central_item = Some(MenuItem {
            label: label.to_string(),
            id,
            kind,
        });
    }

    pub fn profile(&self) -> MenuProfile {
        self.profile
    }

    pub fn sector_count(&self) -> usize {
        self.sector_count
    }

    /// Sector bindings, indexed by sector; `None` sectors are inert
    pub fn items(&self) -> &[Option<MenuItem<I>>] {
        &self.items
    }

    pub fn central_item(&self) -> Option<&MenuItem<I>> {
        self.central_item.as_ref()
    }

    pub fn dead_zone_radius(&self) -> f32 {
        self.dead_zone_radius
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    pub fn is_in_adjusting_mode(&self) -> bool {
        self.mode == MenuMode::Adjusting
    }

    /// Last committed id; kept after the menu hides
    pub fn selected_id(&self) -> Option<I> {
        self.selected_id
    }

    pub fn center(&self) -> Point2 {
        self.center
    }

    pub fn hovered(&self) -> Hover {
        self.hovered
    }

    pub fn hovered_sector(&self) -> Option<usize> {
        match self.hovered {
            Hover::Sector(sector) => Some(sector),
            _ => None,
        }
    }

    /// Item under the pointer, if that region is bound
    pub fn hovered_item(&self) -> Option<&MenuItem<I>> {
        self.item_for(self.hovered)
    }

    /// Id committed by the last release, yielded once
    pub fn take_committed(&mut self) -> Option<I> {
        self.committed.take()
    }

    /// Adjustment produced by the last drag, yielded once
    pub fn take_adjustment(&mut self) -> Option<Adjustment<I>> {
        self.adjustment.take()
    }

    /// Region under `pointer` relative to the current center
    pub fn hit_test(&self, pointer: Point2) -> Hover {
        if pointer.distance(self.center) < self.dead_zone_radius {
            return Hover::Central;
        }
        let angle = angle_from_center(self.center, pointer);
        Hover::Sector(sector_for_angle(angle, self.sector_count))
    }

    fn item_for(&self, hover: Hover) -> Option<&MenuItem<I>> {
        match hover {
            Hover::Nothing => None,
            Hover::Central => self.central_item.as_ref(),
            Hover::Sector(sector) => self.items.get(sector).and_then(Option::as_ref),
        }
    }

    fn update_hover(&mut self, pointer: Point2) -> EventStatus {
        let hovered = self.hit_test(pointer);
        if hovered != self.hovered {
            self.hovered = hovered;
            EventStatus::Redraw
        } else {
            EventStatus::Consumed
        }
    }

    /// Pointer pressed; `summon` is true when the summoning gesture is held
    ///
    /// A hidden menu only reacts to a summoning press, which centers it on the
    /// pointer.
    pub fn press(&mut self, pointer: Point2, summon: bool) -> EventStatus {
        match self.mode {
            MenuMode::Adjusting => {
                // New drag of the same adjustment: re-anchor on its first sample
                self.anchor = None;
                EventStatus::Consumed
            }
            MenuMode::Tracking => self.update_hover(pointer),
            MenuMode::Idle => {
                if !self.visible {
                    if !summon {
                        return EventStatus::NotConsumed;
                    }
                    self.center = pointer;
                    self.visible = true;
                }
                self.mode = MenuMode::Tracking;
                self.hovered = self.hit_test(pointer);
                EventStatus::Redraw
            }
        }
    }

    pub fn drag(&mut self, pointer: Point2) -> EventStatus {
        match self.mode {
            MenuMode::Idle => EventStatus::NotConsumed,
            MenuMode::Tracking => self.update_hover(pointer),
            MenuMode::Adjusting => {
                let Some(anchor) = self.anchor else {
                    self.anchor = Some(pointer);
                    self.last_sample = pointer;
                    return EventStatus::Consumed;
                };
                let Some(id) = self.selected_id else {
                    return EventStatus::Consumed;
                };

                self.adjustment = Some(Adjustment {
                    id,
                    from_anchor: pointer.delta_from(anchor),
                    step: pointer.delta_from(self.last_sample),
                });
                self.last_sample = pointer;
                EventStatus::Redraw
            }
        }
    }

    /// Pointer moved with no button held
    pub fn hover(&mut self, pointer: Point2) -> EventStatus {
        match self.mode {
            MenuMode::Idle => EventStatus::NotConsumed,
            MenuMode::Tracking => self.update_hover(pointer),
            MenuMode::Adjusting => EventStatus::Consumed,
        }
    }

    pub fn release(&mut self, pointer: Point2) -> EventStatus {
        match self.mode {
            MenuMode::Idle => EventStatus::NotConsumed,
            MenuMode::Adjusting => {
                self.finish();
                EventStatus::Redraw
            }
            MenuMode::Tracking => {
                self.hovered = self.hit_test(pointer);
                let item = self.item_for(self.hovered).map(|item| (item.id, item.kind));

                self.selected_id = item.map(|(id, _)| id);
                self.committed = self.selected_id;

                let adjusts = self.profile == MenuProfile::ContinuousParameter
                    && matches!(item, Some((_, ItemKind::Continuous)));
                if adjusts {
                    self.mode = MenuMode::Adjusting;
                    self.anchor = None;
                    self.adjustment = None;
                } else {
                    self.finish();
                }
                EventStatus::Redraw
            }
        }
    }

    /// Hide and return to Idle, keeping `selected_id`
    pub fn hide(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.visible = false;
        self.mode = MenuMode::Idle;
        self.hovered = Hover::Nothing;
        self.anchor = None;
        self.adjustment = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Id {
        A,
        B,
        C,
        D,
        Center,
    }

    fn odd_sectors(profile: MenuProfile) -> PieMenu<Id> {
        let mut menu = PieMenu::new(profile, 8);
        menu.set_item(1, "A", Id::A, ItemKind::Instant);
        menu.set_item(3, "B", Id::B, ItemKind::Continuous);
        menu.set_item(5, "C", Id::C, ItemKind::Instant);
        menu.set_item(7, "D", Id::D, ItemKind::Continuous);
        menu.set_central_item("", Id::Center, ItemKind::Instant);
        menu
    }

    #[test]
    fn test_sector_boundaries_are_half_open() {
        assert_eq!(sector_for_angle(0.0, 8), 0);
        assert_eq!(sector_for_angle(44.999, 8), 0);
        assert_eq!(sector_for_angle(45.0, 8), 1);
        assert_eq!(sector_for_angle(90.0, 8), 2);
        assert_eq!(sector_for_angle(359.999, 8), 7);
        assert_eq!(sector_for_angle(360.0, 8), 0);
        assert_eq!(sector_for_angle(-45.0, 8), 7);
    }

    #[test]
    fn test_angle_is_clockwise_from_up() {
        let center = Point2::new(100.0, 100.0);
        assert!(angle_from_center(center, Point2::new(100.0, 0.0)).abs() < 1e-9);
        assert!((angle_from_center(center, Point2::new(200.0, 100.0)) - 90.0).abs() < 1e-9);
        assert!((angle_from_center(center, Point2::new(100.0, 200.0)) - 180.0).abs() < 1e-9);
        assert!((angle_from_center(center, Point2::new(0.0, 100.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_between_one_and_two_resolves_to_two() {
        let mut menu = odd_sectors(MenuProfile::Momentary);
        menu.press(Point2::new(100.0, 100.0), true);

        // 90 degrees: the boundary between sector 1 and sector 2
        menu.drag(Point2::new(180.0, 100.0));
        assert_eq!(menu.hovered_sector(), Some(2));
        assert!(menu.hovered_item().is_none());

        menu.release(Point2::new(180.0, 100.0));
        assert_eq!(menu.take_committed(), None);
        assert_eq!(menu.selected_id(), None);
    }

    #[test]
    fn test_dead_zone_selects_central_item() {
        let mut menu = odd_sectors(MenuProfile::Momentary);
        menu.press(Point2::new(100.0, 100.0), true);

        for (x, y) in [(105.0, 100.0), (100.0, 90.0), (88.0, 110.0)] {
            menu.drag(Point2::new(x, y));
            assert_eq!(menu.hovered(), Hover::Central);
        }

        menu.release(Point2::new(101.0, 101.0));
        assert_eq!(menu.take_committed(), Some(Id::Center));
    }

    #[test]
    fn test_press_without_summon_is_not_consumed() {
        let mut menu = odd_sectors(MenuProfile::Momentary);
        assert_eq!(menu.press(Point2::new(10.0, 10.0), false), EventStatus::NotConsumed);
        assert_eq!(menu.drag(Point2::new(20.0, 20.0)), EventStatus::NotConsumed);
        assert_eq!(menu.release(Point2::new(20.0, 20.0)), EventStatus::NotConsumed);
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_momentary_commit_hides_and_yields_once() {
        let mut menu = odd_sectors(MenuProfile::Momentary);
        assert_eq!(menu.press(Point2::new(100.0, 100.0), true), EventStatus::Redraw);
        assert!(menu.is_visible());
        assert_eq!(menu.center(), Point2::new(100.0, 100.0));

        // Sector 1 spans 45..90 degrees: up and to the right
        menu.drag(Point2::new(160.0, 70.0));
        assert_eq!(menu.hovered_sector(), Some(1));
        assert_eq!(menu.drag(Point2::new(161.0, 70.0)), EventStatus::Consumed);

        menu.release(Point2::new(161.0, 70.0));
        assert!(!menu.is_visible());
        assert_eq!(menu.mode(), MenuMode::Idle);
        assert_eq!(menu.take_committed(), Some(Id::A));
        assert_eq!(menu.take_committed(), None);
        assert_eq!(menu.selected_id(), Some(Id::A));
    }

    #[test]
    fn test_continuous_item_on_momentary_menu_does_not_adjust() {
        let mut menu = odd_sectors(MenuProfile::Momentary);
        menu.press(Point2::new(100.0, 100.0), true);
        // Sector 3 spans 135..180 degrees: down and to the right
        menu.release(Point2::new(140.0, 160.0));
        assert_eq!(menu.take_committed(), Some(Id::B));
        assert!(!menu.is_in_adjusting_mode());
    }

    #[test]
    fn test_adjusting_anchors_on_first_drag() {
        let mut menu = odd_sectors(MenuProfile::ContinuousParameter);
        menu.press(Point2::new(100.0, 100.0), true);
        menu.release(Point2::new(140.0, 160.0));
        assert!(menu.is_in_adjusting_mode());
        assert_eq!(menu.take_committed(), Some(Id::B));

        assert_eq!(menu.drag(Point2::new(300.0, 300.0)), EventStatus::Consumed);
        assert!(menu.take_adjustment().is_none());

        menu.drag(Point2::new(310.0, 295.0));
        menu.drag(Point2::new(330.0, 290.0));
        let adjustment = menu.take_adjustment().unwrap();
        assert_eq!(adjustment.id, Id::B);
        assert_eq!(adjustment.from_anchor, Point2::new(30.0, -10.0));
        assert_eq!(adjustment.step, Point2::new(20.0, -5.0));

        assert_eq!(menu.release(Point2::new(330.0, 290.0)), EventStatus::Redraw);
        assert_eq!(menu.mode(), MenuMode::Idle);
        assert!(!menu.is_visible());
        assert_eq!(menu.selected_id(), Some(Id::B));
    }

    #[test]
    fn test_instant_item_on_parameter_menu_hides() {
        let mut menu = odd_sectors(MenuProfile::ContinuousParameter);
        menu.press(Point2::new(100.0, 100.0), true);
        menu.release(Point2::new(160.0, 70.0));
        assert!(!menu.is_in_adjusting_mode());
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_out_of_range_sector_binding_is_ignored() {
        let mut menu: PieMenu<Id> = PieMenu::new(MenuProfile::Momentary, 4);
        menu.set_item(4, "X", Id::A, ItemKind::Instant);
        assert!(menu.items().iter().all(Option::is_none));
    }
}
