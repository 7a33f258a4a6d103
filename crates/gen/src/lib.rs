//! Dungeon generation pipeline.
//!
//! A run resets the grid, places a starting room at the centre plus up to
//! `max_rooms - 1` more, links them into one graph with carved corridors,
//! adds vertical links between stacked rooms, attaches invisible barriers and
//! rolls occupants.
//!
//! # Invariants
//! - Single-threaded; phases run in a fixed order within one call.
//! - All randomness comes from one injected, seedable generator.
//! - Running out of placement trials shrinks the dungeon, it never fails it.
//! - After connection every placed room is reachable from every other.

pub mod barriers;
pub mod config;
pub mod corridors;
pub mod dungeon;
pub mod error;
pub mod generator;
pub mod layout;
pub mod placement;
pub mod populate;
pub mod prefab;

pub use barriers::{BarrierSide, BarrierSpec, BoundaryAttacher};
pub use config::DungeonConfig;
pub use corridors::{ConnectionStats, CorridorConnector, corridor_path};
pub use dungeon::{Corridor, Dungeon, Occupant, PlacedBarrier, Room, RoomId};
pub use error::{ConfigError, GenerationError};
pub use generator::{DungeonGenerator, GenerationReport, GenerationState};
pub use layout::DungeonLayout;
pub use placement::RoomPlacer;
pub use populate::{PopulationStats, Populator};
pub use prefab::PrefabSet;

pub fn crate_info() -> &'static str {
    "delve-gen v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("gen"));
    }
}
