// ViewTransform - maps device pixels to timeline world units
//
// World space is measured in beats along x and pitch rows along y. Pixel y
// grows downwards while world y grows upwards, so higher pitches sit higher on
// screen.

use crate::sequencer::GridTarget;
use crate::view::geometry::{Point2, Rect};

/// Smallest allowed zoom (pixels per world unit)
pub const MIN_SCALE: f32 = 0.01;

/// Largest allowed zoom (pixels per world unit)
pub const MAX_SCALE: f32 = 10_000.0;

/// Default zoom base for drag-to-zoom gestures
pub const DEFAULT_ZOOM_FACTOR_PER_PIXEL: f32 = 1.005;

/// Pan/zoom state of the editor viewport
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    viewport_width: f32,
    viewport_height: f32,

    /// World point shown at pixel (0, 0), the top-left corner
    origin: Point2,

    /// Pixels per world unit, per axis
    scale: Point2,
}

impl ViewTransform {
    /// Create an identity-like view (one pixel per unit) for a viewport
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport_width: viewport_width.max(0.0),
            viewport_height: viewport_height.max(0.0),
            origin: Point2::new(0.0, viewport_height.max(0.0)),
            scale: Point2::new(1.0, 1.0),
        }
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn viewport_center(&self) -> Point2 {
        Point2::new(self.viewport_width * 0.5, self.viewport_height * 0.5)
    }

    pub fn origin(&self) -> Point2 {
        self.origin
    }

    /// Pixels per world unit along (x, y)
    pub fn scale(&self) -> Point2 {
        self.scale
    }

    /// Update the viewport size; the world point at the top-left stays put
    pub fn resize_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
    }

    pub fn pixel_to_world(&self, px: f32, py: f32) -> Point2 {
        Point2::new(
            self.origin.x + px / self.scale.x,
            self.origin.y - py / self.scale.y,
        )
    }

    pub fn world_to_pixel(&self, wx: f32, wy: f32) -> Point2 {
        Point2::new(
            (wx - self.origin.x) * self.scale.x,
            (self.origin.y - wy) * self.scale.y,
        )
    }

    /// Move the content along with a pointer drag of (dpx, dpy) pixels
    pub fn pan(&mut self, dpx: f32, dpy: f32) {
        self.origin.x -= dpx / self.scale.x;
        self.origin.y += dpy / self.scale.y;
    }

    /// Multiply the zoom by `factor`, keeping the world point under
    /// `about_pixel` fixed on screen
    ///
    /// The resulting scale is clamped to [MIN_SCALE, MAX_SCALE]. Non-finite or
    /// non-positive factors are ignored.
    pub fn zoom(&mut self, factor: f32, about_pixel: Point2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let anchor = self.pixel_to_world(about_pixel.x, about_pixel.y);
        self.scale = Point2::new(
            (self.scale.x * factor).clamp(MIN_SCALE, MAX_SCALE),
            (self.scale.y * factor).clamp(MIN_SCALE, MAX_SCALE),
        );
        self.origin = Point2::new(
            anchor.x - about_pixel.x / self.scale.x,
            anchor.y + about_pixel.y / self.scale.y,
        );
    }

    /// Zoom about the viewport center
    pub fn zoom_about_center(&mut self, factor: f32) {
        self.zoom(factor, self.viewport_center());
    }

    /// Zoom factor for a drag gesture: `base^(dx - dy)`
    ///
    /// Dragging right or up zooms in, left or down zooms out.
    pub fn zoom_factor_for_drag(base: f32, dx: f32, dy: f32) -> f32 {
        base.powf(dx - dy)
    }

    /// Fit `rect` to the viewport
    ///
    /// Without `preserve_aspect` the rectangle exactly fills the viewport. With
    /// it, both axes share the smaller scale and the rectangle is centered,
    /// leaving bands on the longer axis. Degenerate viewports or rectangles
    /// leave the view unchanged.
    pub fn frame(&mut self, rect: Rect, preserve_aspect: bool) {
        if self.viewport_width <= 0.0
            || self.viewport_height <= 0.0
            || rect.width() <= 0.0
            || rect.height() <= 0.0
        {
            return;
        }

        let mut sx = self.viewport_width / rect.width();
        let mut sy = self.viewport_height / rect.height();
        if preserve_aspect {
            let s = sx.min(sy);
            sx = s;
            sy = s;
        }
        self.scale = Point2::new(sx.clamp(MIN_SCALE, MAX_SCALE), sy.clamp(MIN_SCALE, MAX_SCALE));

        let center = rect.center();
        self.origin = Point2::new(
            center.x - self.viewport_width * 0.5 / self.scale.x,
            center.y + self.viewport_height * 0.5 / self.scale.y,
        );
    }

    /// World rectangle currently visible
    pub fn visible_world_rect(&self) -> Rect {
        let top_left = self.pixel_to_world(0.0, 0.0);
        let bottom_right = self.pixel_to_world(self.viewport_width, self.viewport_height);
        Rect::from_corners(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    /// Grid cell under a pixel, or None when the pixel is off the grid
    pub fn grid_target(
        &self,
        px: f32,
        py: f32,
        beat_count: usize,
        pitch_count: usize,
    ) -> Option<GridTarget> {
        let world = self.pixel_to_world(px, py);
        if !world.x.is_finite() || !world.y.is_finite() {
            return None;
        }

        let beat = world.x.floor();
        let pitch = world.y.floor();
        if beat < 0.0 || pitch < 0.0 || beat >= beat_count as f32 || pitch >= pitch_count as f32 {
            return None;
        }

        Some(GridTarget {
            beat: beat as usize,
            pitch: pitch as usize,
        })
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_pixel_world_roundtrip() {
        let mut view = ViewTransform::new(800.0, 600.0);
        view.frame(Rect::from_corners(0.0, 0.0, 16.0, 88.0), false);
        view.pan(13.0, -7.0);

        let world = view.pixel_to_world(123.0, 456.0);
        let pixel = view.world_to_pixel(world.x, world.y);
        assert!(approx(pixel.x, 123.0));
        assert!(approx(pixel.y, 456.0));
    }

    #[test]
    fn test_y_axis_is_inverted() {
        let mut view = ViewTransform::new(100.0, 100.0);
        view.frame(Rect::from_corners(0.0, 0.0, 10.0, 10.0), false);

        let top = view.pixel_to_world(50.0, 0.0);
        let bottom = view.pixel_to_world(50.0, 100.0);
        assert!(approx(top.y, 10.0));
        assert!(approx(bottom.y, 0.0));
    }

    #[test]
    fn test_frame_fills_viewport() {
        let mut view = ViewTransform::new(640.0, 480.0);
        let rect = Rect::from_corners(0.0, 0.0, 128.0, 88.0);
        view.frame(rect, false);

        let visible = view.visible_world_rect();
        assert!(approx(visible.min.x, 0.0));
        assert!(approx(visible.max.x, 128.0));
        assert!(approx(visible.min.y, 0.0));
        assert!(approx(visible.max.y, 88.0));
    }

    #[test]
    fn test_frame_preserving_aspect_letterboxes() {
        let mut view = ViewTransform::new(200.0, 100.0);
        view.frame(Rect::from_corners(0.0, 0.0, 10.0, 10.0), true);

        assert!(approx(view.scale().x, 10.0));
        assert!(approx(view.scale().y, 10.0));

        // 10x10 square centered in a 200x100 viewport: 50px bands left and right
        let left = view.world_to_pixel(0.0, 0.0);
        let right = view.world_to_pixel(10.0, 10.0);
        assert!(approx(left.x, 50.0));
        assert!(approx(right.x, 150.0));
        assert!(approx(left.y, 100.0));
        assert!(approx(right.y, 0.0));
    }

    #[test]
    fn test_frame_ignores_degenerate_input() {
        let mut view = ViewTransform::new(0.0, 100.0);
        let before = view.clone();
        view.frame(Rect::from_corners(0.0, 0.0, 10.0, 10.0), false);
        assert_eq!(view, before);

        let mut view = ViewTransform::new(100.0, 100.0);
        let before = view.clone();
        view.frame(Rect::from_corners(3.0, 0.0, 3.0, 10.0), false);
        assert_eq!(view, before);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut view = ViewTransform::new(800.0, 600.0);
        view.frame(Rect::from_corners(0.0, 0.0, 32.0, 88.0), false);

        let anchor = Point2::new(200.0, 150.0);
        let before = view.pixel_to_world(anchor.x, anchor.y);
        view.zoom(2.5, anchor);
        let after = view.pixel_to_world(anchor.x, anchor.y);

        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = ViewTransform::new(800.0, 600.0);
        view.zoom(1e9, Point2::new(0.0, 0.0));
        assert_eq!(view.scale().x, MAX_SCALE);

        view.zoom(1e-12, Point2::new(0.0, 0.0));
        assert_eq!(view.scale().y, MIN_SCALE);

        let before = view.clone();
        view.zoom(0.0, Point2::new(0.0, 0.0));
        view.zoom(f32::NAN, Point2::new(0.0, 0.0));
        assert_eq!(view, before);
    }

    #[test]
    fn test_drag_zoom_factor() {
        assert_eq!(ViewTransform::zoom_factor_for_drag(1.005, 0.0, 0.0), 1.0);
        assert!(ViewTransform::zoom_factor_for_drag(1.005, 10.0, 0.0) > 1.0);
        assert!(ViewTransform::zoom_factor_for_drag(1.005, 0.0, 10.0) < 1.0);
        let a = ViewTransform::zoom_factor_for_drag(1.005, 10.0, -10.0);
        let b = ViewTransform::zoom_factor_for_drag(1.005, 20.0, 0.0);
        assert!(approx(a, b));
    }

    #[test]
    fn test_pan_moves_content_with_pointer() {
        let mut view = ViewTransform::new(800.0, 600.0);
        view.frame(Rect::from_corners(0.0, 0.0, 80.0, 60.0), false);

        let world = view.pixel_to_world(100.0, 100.0);
        view.pan(25.0, -40.0);
        let moved = view.world_to_pixel(world.x, world.y);
        assert!(approx(moved.x, 125.0));
        assert!(approx(moved.y, 60.0));
    }

    #[test]
    fn test_grid_target_and_sentinel() {
        let mut view = ViewTransform::new(160.0, 880.0);
        view.frame(Rect::from_corners(0.0, 0.0, 16.0, 88.0), false);

        // 10 px per beat, 10 px per pitch row; bottom row is pitch 0
        assert_eq!(
            view.grid_target(15.0, 875.0, 16, 88),
            Some(GridTarget { beat: 1, pitch: 0 })
        );
        assert_eq!(
            view.grid_target(155.0, 5.0, 16, 88),
            Some(GridTarget { beat: 15, pitch: 87 })
        );

        view.pan(50.0, 0.0);
        assert_eq!(view.grid_target(10.0, 400.0, 16, 88), None);
        assert_eq!(view.grid_target(10.0, 400.0, 0, 88), None);
    }
}
