//! World occupancy grid.

use serde::{Deserialize, Serialize};

/// State of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing here; the avatar can pass through
    #[default]
    Empty,
    /// Collidable block
    Solid,
}

impl Cell {
    /// Whether this cell blocks movement.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Cell::Solid)
    }
}

/// Row bands computed by the generator, kept with the grid so scenes can
/// place the avatar on the street without re-deriving them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldLayout {
    /// First row of the empty road band
    pub road_level: usize,
    /// Number of rows in the road band
    pub road_height: usize,
    /// First row below the road (top of the crust)
    pub surface_level: usize,
    /// First bedrock row; everything from here down is solid
    pub bedrock_row: usize,
}

impl WorldLayout {
    /// Whether `row` lies inside the road band.
    #[must_use]
    pub const fn is_road_row(&self, row: usize) -> bool {
        row >= self.road_level && row < self.road_level + self.road_height
    }
}

/// A `width × height` grid of cells, row 0 at the top.
///
/// Stored row-major. The grid is only mutated by the generator; once handed
/// to a scene it is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    layout: WorldLayout,
}

impl WorldGrid {
    /// Creates an all-empty grid.
    #[must_use]
    pub fn new(width: usize, height: usize, layout: WorldLayout) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
            layout,
        }
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row bands of this world.
    #[must_use]
    pub const fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    /// Cell at `(col, row)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        if col < self.width && row < self.height {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    /// Signed lookup; anything outside the grid reads as `Empty`.
    #[must_use]
    pub fn cell_at(&self, col: i64, row: i64) -> Cell {
        if col < 0 || row < 0 {
            return Cell::Empty;
        }
        self.get(col as usize, row as usize).unwrap_or(Cell::Empty)
    }

    /// Whether the cell at `(col, row)` is solid. Out of bounds is not solid.
    #[must_use]
    pub fn is_solid(&self, col: i64, row: i64) -> bool {
        self.cell_at(col, row).is_solid()
    }

    /// One row of cells.
    #[must_use]
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.width;
        &self.cells[start..start + self.width]
    }

    /// Number of solid cells.
    #[must_use]
    pub fn count_solid(&self) -> usize {
        self.cells.iter().filter(|c| c.is_solid()).count()
    }

    /// Iterates `(col, row)` of every solid cell, top row first.
    pub fn solid_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_solid())
            .map(move |(i, _)| (i % self.width, i / self.width))
    }

    /// Sets a cell; writes outside the grid are ignored.
    pub(crate) fn set(&mut self, col: usize, row: usize, cell: Cell) {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = cell;
        }
    }

    /// Fills the half-open rectangle `[col0, col1) × [row0, row1)`, clipped to the grid.
    pub(crate) fn fill_rect(&mut self, col0: usize, row0: usize, col1: usize, row1: usize, cell: Cell) {
        let col1 = col1.min(self.width);
        let row1 = row1.min(self.height);
        for row in row0..row1 {
            for col in col0..col1 {
                self.cells[row * self.width + col] = cell;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> WorldLayout {
        WorldLayout {
            road_level: 4,
            road_height: 2,
            surface_level: 6,
            bedrock_row: 8,
        }
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = WorldGrid::new(5, 10, layout());
        assert_eq!(grid.count_solid(), 0);
        assert_eq!(grid.get(4, 9), Some(Cell::Empty));
        assert_eq!(grid.get(5, 0), None);
    }

    #[test]
    fn test_out_of_bounds_reads_empty() {
        let mut grid = WorldGrid::new(3, 3, layout());
        grid.fill_rect(0, 0, 3, 3, Cell::Solid);
        assert!(grid.is_solid(0, 0));
        assert!(!grid.is_solid(-1, 0));
        assert!(!grid.is_solid(0, 3));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut grid = WorldGrid::new(4, 4, layout());
        grid.fill_rect(2, 2, 10, 10, Cell::Solid);
        assert_eq!(grid.count_solid(), 4);
        assert_eq!(
            grid.solid_cells().collect::<Vec<_>>(),
            vec![(2, 2), (3, 2), (2, 3), (3, 3)]
        );
    }

    #[test]
    fn test_road_rows() {
        let l = layout();
        assert!(!l.is_road_row(3));
        assert!(l.is_road_row(4));
        assert!(l.is_road_row(5));
        assert!(!l.is_road_row(6));
    }
}
