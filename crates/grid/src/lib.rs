//! Spatial grid: the cubic occupancy lattice every dungeon is carved into.
//!
//! # Invariants
//! - A cell is empty, a room, or a corridor; never two at once.
//! - Out-of-bounds cells read as occupied and ignore writes, so callers may
//!   probe neighbours at the edge without bounds checks.
//! - The lattice is centred on the world origin.

mod spatial;

pub use spatial::{CellState, MAX_GRID_SIZE, SpatialGrid};

pub fn crate_info() -> &'static str {
    "delve-grid v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("grid"));
    }
}
