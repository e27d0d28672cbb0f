//! Block-variant classification and static tile placement.
//!
//! Every solid cell gets a visual variant chosen from its vertical neighbours
//! and its column, then is handed to a [`TileSink`] which registers the
//! sprite and collidable body with the engine.

use serde::{Deserialize, Serialize};
use xytopia_common::{StageError, TileCoord, Vec2};

use crate::grid::WorldGrid;
use crate::random::RandomSource;

/// Number of interchangeable "mid" block looks.
pub const MID_VARIANTS: u8 = 5;

/// Horizontal position class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// World's leftmost column
    Left,
    /// World's rightmost column
    Right,
    /// Any interior column
    AllAdjacent,
}

impl EdgeKind {
    /// Edge class for `col` in a world `width` columns wide.
    #[must_use]
    pub fn for_column(col: usize, width: usize) -> Self {
        if col == 0 {
            EdgeKind::Left
        } else if col + 1 == width {
            EdgeKind::Right
        } else {
            EdgeKind::AllAdjacent
        }
    }
}

/// Visual appearance of a placed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockVariant {
    /// Exposed to empty space above
    Top(EdgeKind),
    /// Covered above, exposed below
    Bottom(EdgeKind),
    /// Buried; one of [`MID_VARIANTS`] interchangeable looks
    Mid(u8),
}

impl BlockVariant {
    /// Whether this is one of the generic buried looks.
    #[must_use]
    pub const fn is_mid(self) -> bool {
        matches!(self, BlockVariant::Mid(_))
    }

    /// Texture key the stage draws this variant with.
    #[must_use]
    pub const fn texture_key(self) -> &'static str {
        match self {
            BlockVariant::Top(EdgeKind::Left) => "most_top_left",
            BlockVariant::Top(EdgeKind::Right) => "most_top_right",
            BlockVariant::Top(EdgeKind::AllAdjacent) => "most_top_all_adjacent",
            BlockVariant::Bottom(EdgeKind::Left) => "most_bottom_left",
            BlockVariant::Bottom(EdgeKind::Right) => "most_bottom_right",
            BlockVariant::Bottom(EdgeKind::AllAdjacent) => "most_bottom_all_adjacent",
            BlockVariant::Mid(0) => "mid_part1",
            BlockVariant::Mid(1) => "mid_part2",
            BlockVariant::Mid(2) => "mid_part3",
            BlockVariant::Mid(3) => "mid_part4",
            BlockVariant::Mid(_) => "mid_part5",
        }
    }

    /// Every texture key a world can reference, for asset preparation.
    #[must_use]
    pub fn all_texture_keys() -> Vec<&'static str> {
        let edges = [EdgeKind::Left, EdgeKind::Right, EdgeKind::AllAdjacent];
        let mut keys: Vec<&'static str> = edges
            .iter()
            .flat_map(|&e| [BlockVariant::Top(e), BlockVariant::Bottom(e)])
            .map(BlockVariant::texture_key)
            .collect();
        keys.extend((0..MID_VARIANTS).map(|k| BlockVariant::Mid(k).texture_key()));
        keys
    }
}

/// Chooses the variant for the cell at `(col, row)`; `None` for empty cells.
///
/// Only the cells directly above and below and the absolute column are
/// consulted. Anything outside the grid counts as empty.
pub fn classify(
    grid: &WorldGrid,
    col: usize,
    row: usize,
    rng: &mut impl RandomSource,
) -> Option<BlockVariant> {
    if !grid.get(col, row)?.is_solid() {
        return None;
    }
    let (c, r) = (col as i64, row as i64);
    let edge = EdgeKind::for_column(col, grid.width());

    let variant = if !grid.is_solid(c, r - 1) {
        BlockVariant::Top(edge)
    } else if !grid.is_solid(c, r + 1) {
        BlockVariant::Bottom(edge)
    } else {
        BlockVariant::Mid(rng.index(MID_VARIANTS as usize) as u8)
    };
    Some(variant)
}

/// One block ready to be placed in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    /// Grid coordinate
    pub coord: TileCoord,
    /// World-space center
    pub center: Vec2,
    /// Edge length in world units
    pub size: f32,
    /// Chosen look
    pub variant: BlockVariant,
}

/// Receives placements and registers them as static collidable surfaces.
pub trait TileSink {
    /// Places one block.
    fn place_static(&mut self, placement: &TilePlacement) -> Result<(), StageError>;
}

impl TileSink for Vec<TilePlacement> {
    fn place_static(&mut self, placement: &TilePlacement) -> Result<(), StageError> {
        self.push(*placement);
        Ok(())
    }
}

/// Per-category counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStats {
    /// Blocks with a top look
    pub top: usize,
    /// Blocks with a bottom look
    pub bottom: usize,
    /// Buried blocks
    pub mid: usize,
}

impl TileStats {
    /// Total blocks placed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.top + self.bottom + self.mid
    }
}

/// Maps grid cells to placements.
#[derive(Debug, Clone, Copy)]
pub struct TileRenderer {
    tile_size: f32,
}

impl TileRenderer {
    /// Creates a renderer for tiles `tile_size` world units wide.
    #[must_use]
    pub const fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }

    /// Tile edge length in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Classifies and places every solid cell, top row first.
    pub fn render<S: TileSink + ?Sized>(
        &self,
        grid: &WorldGrid,
        rng: &mut impl RandomSource,
        sink: &mut S,
    ) -> Result<TileStats, StageError> {
        let mut stats = TileStats::default();
        for (col, row) in grid.solid_cells() {
            let Some(variant) = classify(grid, col, row, rng) else {
                continue;
            };
            match variant {
                BlockVariant::Top(_) => stats.top += 1,
                BlockVariant::Bottom(_) => stats.bottom += 1,
                BlockVariant::Mid(_) => stats.mid += 1,
            }
            let coord = TileCoord::new(col as i32, row as i32);
            sink.place_static(&TilePlacement {
                coord,
                center: coord.to_world_center(self.tile_size),
                size: self.tile_size,
                variant,
            })?;
        }
        tracing::debug!(
            top = stats.top,
            bottom = stats.bottom,
            mid = stats.mid,
            "Placed world tiles"
        );
        Ok(stats)
    }
}
