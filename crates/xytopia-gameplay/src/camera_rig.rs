//! Follow camera with clamped zoom and world bounds.

use serde::{Deserialize, Serialize};
use tracing::debug;
use xytopia_common::{Rect, Vec2};
use xytopia_kernel::Camera;

use crate::input::Input;

/// Camera tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Zoom on entering the world
    pub initial_zoom: f32,
    /// Furthest out the visitor can zoom
    pub min_zoom: f32,
    /// Furthest in the visitor can zoom
    pub max_zoom: f32,
    /// Fraction of the distance to the target covered per tick
    pub follow_lerp: f32,
    /// Zoom change per key press
    pub zoom_step: f32,
    /// Zoom change per unit of wheel movement
    pub wheel_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_zoom: 1.5,
            min_zoom: 1.2,
            max_zoom: 2.0,
            follow_lerp: 0.1,
            zoom_step: 0.1,
            wheel_factor: -0.001,
        }
    }
}

/// Camera controller for the world scene.
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    camera: Camera,
    world_bounds: Rect,
}

impl CameraController {
    /// Creates a controller for a world covering `world_bounds`.
    ///
    /// An inverted zoom range is reordered.
    #[must_use]
    pub fn new(mut config: CameraConfig, viewport: (u32, u32), world_bounds: Rect) -> Self {
        if config.min_zoom > config.max_zoom {
            std::mem::swap(&mut config.min_zoom, &mut config.max_zoom);
        }
        let mut camera = Camera::new(viewport.0, viewport.1);
        camera.set_zoom(config.initial_zoom.clamp(config.min_zoom, config.max_zoom));
        camera.set_bounds(world_bounds);
        Self {
            config,
            camera,
            world_bounds,
        }
    }

    /// The camera, for rendering and coordinate transforms.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current zoom.
    #[must_use]
    pub const fn zoom_level(&self) -> f32 {
        self.camera.zoom()
    }

    /// Changes zoom by `delta`, clamped to the configured range. Returns
    /// whether the zoom changed.
    pub fn zoom(&mut self, delta: f32) -> bool {
        let current = self.camera.zoom();
        let next = (current + delta).clamp(self.config.min_zoom, self.config.max_zoom);
        if (next - current).abs() <= f32::EPSILON {
            return false;
        }
        self.camera.set_zoom(next);
        self.camera.set_bounds(self.world_bounds);
        debug!(from = current, to = next, "Zoom changed");
        true
    }

    /// Applies zoom keys and the wheel. Returns whether the zoom changed.
    pub fn handle_input(&mut self, input: &Input) -> bool {
        let mut delta = 0.0;
        if input.zoom_in {
            delta += self.config.zoom_step;
        }
        if input.zoom_out {
            delta -= self.config.zoom_step;
        }
        delta += input.wheel_y * self.config.wheel_factor;
        delta != 0.0 && self.zoom(delta)
    }

    /// Jumps straight to `target`. Used once when the world is entered.
    pub fn start_follow(&mut self, target: Vec2) {
        self.camera.center_on(target);
    }

    /// Moves part of the way toward `target`.
    pub fn follow(&mut self, target: Vec2) {
        self.camera.lerp_to(target, self.config.follow_lerp);
    }
}
