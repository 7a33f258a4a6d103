use delve_common::{EntityKind, GridCoord, PrefabHandle, Transform};
use delve_grid::CellState;
use delve_kernel::EntityData;
use rand::Rng;
use std::collections::BTreeSet;

use crate::config::DEFAULT_PLACEMENT_TRIALS;
use crate::dungeon::{Dungeon, Room, RoomId};

/// Room geometry is shrunk to 90% of a cell, leaving a gap between neighbours.
pub const ROOM_SCALE_FACTOR: f32 = 0.9;

/// Chooses grid cells for rooms and instantiates their geometry.
#[derive(Debug, Clone)]
pub struct RoomPlacer {
    prefab: PrefabHandle,
    trials: u32,
}

impl RoomPlacer {
    pub fn new(prefab: PrefabHandle) -> Self {
        Self {
            prefab,
            trials: DEFAULT_PLACEMENT_TRIALS,
        }
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Place the starting room in the centre cell.
    ///
    /// Always `Some` on a freshly reset grid.
    pub fn place_room_at_center(&self, dungeon: &mut Dungeon) -> Option<RoomId> {
        let center = dungeon.grid.center();
        self.place_at(dungeon, center)
    }

    /// Draw random cells until one is empty and touches empty space, then
    /// place a room there. Gives up after `trials` draws.
    pub fn try_place_room(&self, dungeon: &mut Dungeon, rng: &mut impl Rng) -> Option<RoomId> {
        let size = dungeon.grid.size() as i32;
        for trial in 0..self.trials {
            let coord = GridCoord::new(
                rng.gen_range(0..size),
                rng.gen_range(0..size),
                rng.gen_range(0..size),
            );
            if dungeon.grid.is_occupied(coord) || !dungeon.grid.has_adjacent_empty_space(coord) {
                tracing::trace!(%coord, trial, "placement rejected");
                continue;
            }
            return self.place_at(dungeon, coord);
        }
        tracing::warn!(trials = self.trials, "room placement exhausted");
        None
    }

    /// Claim `coord` and spawn a room there. `None` if the cell is taken.
    pub fn place_at(&self, dungeon: &mut Dungeon, coord: GridCoord) -> Option<RoomId> {
        if !dungeon.grid.occupy(coord, CellState::Room) {
            return None;
        }
        let scale = dungeon.grid.cell_size() * ROOM_SCALE_FACTOR;
        let transform =
            Transform::from_position(dungeon.cell_world_position(coord)).with_uniform_scale(scale);
        let entity = dungeon.scene.spawn(
            EntityData::new(EntityKind::Room, transform).with_prefab(self.prefab),
        );
        let id = RoomId(dungeon.rooms.len());
        dungeon.rooms.push(Room {
            id,
            coord,
            entity,
            transform,
            connections: BTreeSet::new(),
            barriers: Vec::new(),
        });
        tracing::debug!(room = id.0, %coord, "room placed");
        Some(id)
    }
}
