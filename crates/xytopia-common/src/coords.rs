//! Coordinate types for tile-grid and world-space positions.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Tile coordinate (column, row) in the world grid. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column index
    pub col: i32,
    /// Row index
    pub row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// World-space center of this tile.
    #[must_use]
    pub fn to_world_center(self, tile_size: f32) -> Vec2 {
        Vec2::new(
            (self.col as f32 + 0.5) * tile_size,
            (self.row as f32 + 0.5) * tile_size,
        )
    }
}
