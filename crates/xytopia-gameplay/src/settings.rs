//! Gameplay settings shared by the scenes.

use serde::{Deserialize, Serialize};
use xytopia_kernel::DEFAULT_GRAVITY;
use xytopia_world::GeneratorConfig;

use crate::avatar::AvatarConfig;
use crate::camera_rig::CameraConfig;

/// Everything the scenes need to build the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Viewport size in pixels
    pub viewport: (u32, u32),
    /// World width in tiles
    pub world_width: usize,
    /// World height in tiles
    pub world_height: usize,
    /// Tile edge length in world units
    pub tile_size: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Fixed seed for reproducible worlds; random when unset
    pub seed: Option<u64>,
    /// Terrain generator tuning
    pub generator: GeneratorConfig,
    /// Avatar tuning
    pub avatar: AvatarConfig,
    /// Camera tuning
    pub camera: CameraConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            viewport: (1024, 768),
            world_width: 100,
            world_height: 50,
            tile_size: 32.0,
            gravity: DEFAULT_GRAVITY,
            seed: None,
            generator: GeneratorConfig::default(),
            avatar: AvatarConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl GameSettings {
    /// World size in world units.
    #[must_use]
    pub fn world_extent(&self) -> (f32, f32) {
        (
            self.world_width as f32 * self.tile_size,
            self.world_height as f32 * self.tile_size,
        )
    }
}
