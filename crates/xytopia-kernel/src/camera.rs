//! 2D camera for viewing the world.
//!
//! Pans, zooms and follows, with coordinate transforms between screen and
//! world space. When bounds are set the view never shows anything outside
//! them.

use xytopia_common::{Rect, Vec2};

/// Hard lower zoom limit; callers usually apply a tighter range.
pub const MIN_ZOOM: f32 = 0.1;

/// Hard upper zoom limit.
pub const MAX_ZOOM: f32 = 20.0;

/// Default zoom level.
pub const DEFAULT_ZOOM: f32 = 1.0;

/// 2D camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Center of view in world coordinates.
    pub position: Vec2,
    /// Zoom level (1.0 = 1:1 pixel mapping).
    zoom: f32,
    /// Viewport size in pixels (width, height).
    viewport_size: (u32, u32),
    /// Region the view is kept inside.
    bounds: Option<Rect>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Camera {
    /// Creates a camera with the given viewport size.
    #[must_use]
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            viewport_size: (viewport_width, viewport_height),
            bounds: None,
        }
    }

    /// Current zoom.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set absolute zoom level (clamped to the hard limits).
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.clamp_to_bounds();
    }

    /// Center camera on a world position.
    pub fn center_on(&mut self, target: Vec2) {
        self.position = target;
        self.clamp_to_bounds();
    }

    /// Move a fraction `t` of the way toward `target`.
    pub fn lerp_to(&mut self, target: Vec2, t: f32) {
        self.position = self.position.lerp(target, t);
        self.clamp_to_bounds();
    }

    /// Keeps the view inside `bounds` from now on.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.clamp_to_bounds();
    }

    fn clamp_to_bounds(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let (view_w, view_h) = self.visible_size();
        self.position.x = clamp_axis(self.position.x, bounds.min_x, bounds.max_x, view_w);
        self.position.y = clamp_axis(self.position.y, bounds.min_y, bounds.max_y, view_h);
    }

    /// Visible world region.
    #[must_use]
    pub fn visible_bounds(&self) -> Rect {
        let (width, height) = self.visible_size();
        Rect::from_center(self.position, width / 2.0, height / 2.0)
    }

    /// Visible world size (width, height) in world units.
    #[must_use]
    pub fn visible_size(&self) -> (f32, f32) {
        (
            self.viewport_size.0 as f32 / self.zoom,
            self.viewport_size.1 as f32 / self.zoom,
        )
    }

    /// Check if a world rectangle intersects the visible area.
    #[must_use]
    pub fn is_rect_visible(&self, rect: &Rect) -> bool {
        self.visible_bounds().overlaps(rect)
    }
}

/// Clamps one axis of the view center. A view wider than the bounds is
/// centred on them.
fn clamp_axis(center: f32, min: f32, max: f32, view: f32) -> f32 {
    let half = view / 2.0;
    if max - min <= view {
        (min + max) / 2.0
    } else {
        center.clamp(min + half, max - half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_default() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec2::ZERO);
        assert!((camera.zoom() - DEFAULT_ZOOM).abs() < f32::EPSILON);
        assert_eq!(camera.visible_size(), (1280.0, 720.0));
    }

    #[test]
    fn test_zoom_hard_limits() {
        let mut camera = Camera::default();
        camera.set_zoom(100.0);
        assert!((camera.zoom() - MAX_ZOOM).abs() < f32::EPSILON);
        camera.set_zoom(0.0);
        assert!((camera.zoom() - MIN_ZOOM).abs() < f32::EPSILON);
    }

    #[test]
    fn test_visible_bounds() {
        let mut camera = Camera::new(800, 600);
        camera.set_zoom(2.0);
        let view = camera.visible_bounds();
        assert!((view.width() - 400.0).abs() < 0.001);
        assert!((view.height() - 300.0).abs() < 0.001);
        assert!(camera.is_rect_visible(&Rect::new(150.0, 100.0, 300.0, 200.0)));
        assert!(!camera.is_rect_visible(&Rect::new(250.0, 0.0, 300.0, 10.0)));
        // Touching the edge is not visible.
        assert!(!camera.is_rect_visible(&Rect::new(200.0, 0.0, 232.0, 32.0)));
    }

    #[test]
    fn test_bounds_keep_view_inside() {
        let mut camera = Camera::new(800, 600);
        camera.set_bounds(Rect::new(0.0, 0.0, 3200.0, 1600.0));
        camera.center_on(Vec2::new(-500.0, 5000.0));
        let view = camera.visible_bounds();
        assert!((view.min_x - 0.0).abs() < 0.001);
        assert!((view.max_y - 1600.0).abs() < 0.001);

        camera.lerp_to(Vec2::new(1600.0, 800.0), 1.0);
        assert_eq!(camera.position, Vec2::new(1600.0, 800.0));
    }

    #[test]
    fn test_bounds_smaller_than_view_centre() {
        let mut camera = Camera::new(800, 600);
        camera.set_bounds(Rect::new(0.0, 0.0, 320.0, 2000.0));
        camera.center_on(Vec2::new(900.0, 0.0));
        assert!((camera.position.x - 160.0).abs() < 0.001);
        assert!((camera.position.y - 300.0).abs() < 0.001);
    }

    #[test]
    fn test_lerp_moves_partially() {
        let mut camera = Camera::default();
        camera.lerp_to(Vec2::new(100.0, -50.0), 0.1);
        assert!((camera.position.x - 10.0).abs() < 0.001);
        assert!((camera.position.y + 5.0).abs() < 0.001);
    }
}
