//! Procedural terrain generation.
//!
//! The world is built in fixed passes over an all-empty grid:
//!
//! 1. an empty road band at mid height,
//! 2. a solid crust directly under the road,
//! 3. a rolling underground whose start row follows two sine waves per column,
//!    filled with per-cell probability (denser with depth),
//! 4. unconditionally solid bedrock,
//! 5. rectangular caves carved at random columns,
//! 6. a few floating islands above the road.
//!
//! Only fill density and cave/island placement are random; the shape of the
//! rolling terrain is a pure function of the column index.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use xytopia_common::WorldError;

use crate::grid::{Cell, WorldGrid, WorldLayout};
use crate::random::RandomSource;

/// Inclusive `min..=max` range in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    /// Smallest value
    pub min: usize,
    /// Largest value
    pub max: usize,
}

impl TileRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    fn sample(self, rng: &mut impl RandomSource) -> usize {
        rng.range_inclusive(self.min, self.max)
    }

    fn validate(self, name: &'static str) -> Result<(), WorldError> {
        if self.min > self.max {
            return Err(WorldError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Terrain generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Road band start as a fraction of world height
    pub road_level_ratio: f64,
    /// Rows in the empty road band
    pub road_height: usize,
    /// Solid rows directly under the road
    pub crust_rows: usize,
    /// Base offset of the underground start below the surface
    pub underground_offset: i64,
    /// Rows below the underground start filled with `shallow_fill`
    pub shallow_rows: usize,
    /// Fill probability near the surface
    pub shallow_fill: f64,
    /// Fill probability further down
    pub deep_fill: f64,
    /// Always-solid rows at the bottom
    pub bedrock_rows: usize,
    /// Per-column cave probability
    pub cave_chance: f64,
    /// Cave height range
    pub cave_height: TileRange,
    /// Cave width range
    pub cave_width: TileRange,
    /// Number of floating islands
    pub island_count: TileRange,
    /// Island width range
    pub island_width: TileRange,
    /// Island height
    pub island_height: usize,
    /// Highest an island may sit above the road, in rows
    pub island_max_rise: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            road_level_ratio: 0.5,
            road_height: 3,
            crust_rows: 6,
            underground_offset: 2,
            shallow_rows: 8,
            shallow_fill: 0.85,
            deep_fill: 0.95,
            bedrock_rows: 3,
            cave_chance: 0.02,
            cave_height: TileRange::new(3, 6),
            cave_width: TileRange::new(2, 4),
            island_count: TileRange::new(2, 3),
            island_width: TileRange::new(3, 5),
            island_height: 2,
            island_max_rise: 10,
        }
    }
}

impl GeneratorConfig {
    /// Checks probabilities and ranges.
    pub fn validate(&self) -> Result<(), WorldError> {
        for (name, value) in [
            ("road_level_ratio", self.road_level_ratio),
            ("shallow_fill", self.shallow_fill),
            ("deep_fill", self.deep_fill),
            ("cave_chance", self.cave_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WorldError::InvalidProbability { name, value });
            }
        }
        self.cave_height.validate("cave_height")?;
        self.cave_width.validate("cave_width")?;
        self.island_count.validate("island_count")?;
        self.island_width.validate("island_width")?;
        Ok(())
    }

    /// Row bands for a world `height` rows tall, or `None` if they don't fit.
    #[must_use]
    pub fn layout_for(&self, height: usize) -> Option<WorldLayout> {
        let road_level = (height as f64 * self.road_level_ratio).floor() as usize;
        let surface_level = road_level + self.road_height;
        let bedrock_row = height.checked_sub(self.bedrock_rows)?;
        if surface_level + self.crust_rows > bedrock_row {
            return None;
        }
        Some(WorldLayout {
            road_level,
            road_height: self.road_height,
            surface_level,
            bedrock_row,
        })
    }

    fn min_height(&self) -> usize {
        (1..=4096)
            .find(|&h| self.layout_for(h).is_some())
            .unwrap_or(usize::MAX)
    }
}

/// Procedural terrain generator for one fixed world size.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    config: GeneratorConfig,
    width: usize,
    height: usize,
    layout: WorldLayout,
}

impl TerrainGenerator {
    /// Creates a generator for a `width × height` world.
    pub fn new(config: GeneratorConfig, width: usize, height: usize) -> Result<Self, WorldError> {
        config.validate()?;
        let layout = match config.layout_for(height) {
            Some(layout) if width > 0 => layout,
            _ => {
                return Err(WorldError::InvalidDimensions {
                    width,
                    height,
                    min_height: config.min_height(),
                })
            },
        };
        Ok(Self {
            config,
            width,
            height,
            layout,
        })
    }

    /// Returns the generator configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Row bands every generated grid will have.
    #[must_use]
    pub const fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    /// First underground row for column `x`, never above the surface.
    #[must_use]
    pub fn underground_start(&self, x: usize) -> usize {
        let xf = x as f64;
        let wave = ((xf * 0.02).sin() * 2.0 + (xf * 0.04).sin() * 3.0).floor() as i64;
        let start = self.layout.surface_level as i64 + self.config.underground_offset + wave;
        start.max(self.layout.surface_level as i64) as usize
    }

    /// Generates a fresh grid.
    pub fn generate(&self, rng: &mut impl RandomSource) -> WorldGrid {
        let mut grid = WorldGrid::new(self.width, self.height, self.layout);
        let WorldLayout {
            surface_level,
            bedrock_row,
            ..
        } = self.layout;

        // Road band stays as initialised (empty).
        grid.fill_rect(
            0,
            surface_level,
            self.width,
            surface_level + self.config.crust_rows,
            Cell::Solid,
        );

        for x in 0..self.width {
            self.fill_column(&mut grid, x, rng);
        }
        grid.fill_rect(0, bedrock_row, self.width, self.height, Cell::Solid);

        let caves = self.carve_caves(&mut grid, rng);
        let islands = self.place_islands(&mut grid, rng);

        info!(
            width = self.width,
            height = self.height,
            solid = grid.count_solid(),
            caves,
            islands,
            "Generated world"
        );
        grid
    }

    fn fill_column(&self, grid: &mut WorldGrid, x: usize, rng: &mut impl RandomSource) {
        let start = self.underground_start(x);
        for row in start..self.layout.bedrock_row {
            let fill = if row - start < self.config.shallow_rows {
                self.config.shallow_fill
            } else {
                self.config.deep_fill
            };
            if rng.chance(fill) {
                grid.set(x, row, Cell::Solid);
            }
        }
    }

    /// Carves caves below the crust and above bedrock. Returns how many were cut.
    fn carve_caves(&self, grid: &mut WorldGrid, rng: &mut impl RandomSource) -> usize {
        let min_top = self.layout.surface_level + self.config.crust_rows;
        let mut carved = 0;

        for x in 0..self.width {
            if !rng.chance(self.config.cave_chance) {
                continue;
            }
            let cave_height = self.config.cave_height.sample(rng);
            let cave_width = self.config.cave_width.sample(rng);

            let Some(max_top) = self.layout.bedrock_row.checked_sub(cave_height) else {
                continue;
            };
            if max_top < min_top {
                debug!(x, cave_height, "No room for cave above bedrock");
                continue;
            }
            let top = rng.range_inclusive(min_top, max_top);
            let left = x.saturating_sub(cave_width / 2);
            grid.fill_rect(left, top, left + cave_width, top + cave_height, Cell::Empty);
            carved += 1;
        }
        carved
    }

    /// Places floating islands above the road. Returns how many were placed.
    fn place_islands(&self, grid: &mut WorldGrid, rng: &mut impl RandomSource) -> usize {
        let island_height = self.config.island_height;
        // One row of clearance between an island and the road.
        let Some(max_top) = self.layout.road_level.checked_sub(island_height + 1) else {
            return 0;
        };
        let min_top = max_top.saturating_sub(self.config.island_max_rise);

        let count = self.config.island_count.sample(rng);
        for _ in 0..count {
            let island_width = self.config.island_width.sample(rng);
            let left = rng.index(self.width);
            let top = rng.range_inclusive(min_top, max_top);
            grid.fill_rect(left, top, left + island_width, top + island_height, Cell::Solid);
        }
        count
    }
}
