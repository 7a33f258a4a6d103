use delve_common::GridCoord;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What occupies a single lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Empty,
    Room,
    Corridor,
}

impl CellState {
    pub fn is_occupied(&self) -> bool {
        !matches!(self, CellState::Empty)
    }
}

/// Largest supported lattice edge, in cells.
pub const MAX_GRID_SIZE: u32 = 256;

/// Cubic occupancy lattice of `size³` cells, each `cell_size` world units wide.
///
/// Cell `(size/2, size/2, size/2)` maps to the world origin.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    size: i32,
    cell_size: f32,
    cells: Vec<CellState>,
}

impl SpatialGrid {
    /// Create a grid with the given edge length (in cells) and cell size.
    pub fn new(size: u32, cell_size: f32) -> Self {
        let mut grid = Self {
            size: 0,
            cell_size,
            cells: Vec::new(),
        };
        grid.reset(size, cell_size);
        grid
    }

    /// Reallocate an all-empty lattice. Sizes above [`MAX_GRID_SIZE`] are
    /// clamped.
    pub fn reset(&mut self, size: u32, cell_size: f32) {
        let size = size.min(MAX_GRID_SIZE);
        let side = size as usize;
        self.size = size as i32;
        self.cell_size = cell_size;
        self.cells.clear();
        self.cells.resize(side * side * side, CellState::Empty);
        tracing::debug!(size, cell_size, "grid reset");
    }

    /// Edge length in cells.
    pub fn size(&self) -> u32 {
        self.size as u32
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn center(&self) -> GridCoord {
        let c = self.size / 2;
        GridCoord::new(c, c, c)
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        let range = 0..self.size;
        range.contains(&coord.x) && range.contains(&coord.y) && range.contains(&coord.z)
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        let s = self.size as usize;
        Some(coord.x as usize + s * (coord.y as usize + s * coord.z as usize))
    }

    /// State of an in-bounds cell; `None` outside the lattice.
    pub fn state(&self, coord: GridCoord) -> Option<CellState> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// True for any occupied cell and for every out-of-bounds coordinate.
    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.state(coord).is_none_or(|s| s.is_occupied())
    }

    /// Claim an empty cell for `occupant`.
    ///
    /// Returns false, leaving the grid untouched, when the cell is out of
    /// bounds or already taken.
    pub fn occupy(&mut self, coord: GridCoord, occupant: CellState) -> bool {
        let Some(i) = self.index(coord) else {
            return false;
        };
        if self.cells[i].is_occupied() {
            return false;
        }
        self.cells[i] = occupant;
        true
    }

    /// Mark a cell empty again. No-op out of bounds.
    pub fn vacate(&mut self, coord: GridCoord) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = CellState::Empty;
        }
    }

    /// True when at least one axis neighbour is inside the lattice and empty.
    pub fn has_adjacent_empty_space(&self, coord: GridCoord) -> bool {
        coord.neighbors().iter().any(|n| !self.is_occupied(*n))
    }

    /// World-space centre of a cell: `(coord - size/2) * cell_size` per axis.
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec3 {
        (coord.as_ivec3() - self.center().as_ivec3()).as_vec3() * self.cell_size
    }

    /// The cell whose centre is nearest to `position`. May be out of bounds.
    pub fn world_to_grid(&self, position: Vec3) -> GridCoord {
        let rel = (position / self.cell_size).round().as_ivec3();
        GridCoord::from(rel + self.center().as_ivec3())
    }

    /// Number of non-empty cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// All cells currently in `state`, in index order.
    pub fn cells_in_state(&self, state: CellState) -> Vec<GridCoord> {
        let s = self.size;
        let mut out = Vec::new();
        for z in 0..s {
            for y in 0..s {
                for x in 0..s {
                    let c = GridCoord::new(x, y, z);
                    if self.state(c) == Some(state) {
                        out.push(c);
                    }
                }
            }
        }
        out
    }
}
