//! Dungeon state shared by every pipeline phase.
//!
//! The [`Dungeon`] owns the occupancy grid, the scene registry and the typed
//! records (rooms, corridors, occupants) that point into both.

use delve_common::{EntityId, EntityKind, GridCoord, Transform};
use delve_grid::SpatialGrid;
use delve_kernel::Scene;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::barriers::BarrierSpec;

/// Index of a room in placement order. Room 0 is always the starting room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

/// A barrier record owned by its room.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBarrier {
    pub spec: BarrierSpec,
    pub entity: EntityId,
}

/// One placed chamber occupying a single grid cell.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub coord: GridCoord,
    pub entity: EntityId,
    /// World-space transform of the room geometry.
    pub transform: Transform,
    pub(crate) connections: BTreeSet<RoomId>,
    pub(crate) barriers: Vec<PlacedBarrier>,
}

impl Room {
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Rooms directly corridor-connected to this one.
    pub fn connections(&self) -> &BTreeSet<RoomId> {
        &self.connections
    }

    pub fn is_connected_to(&self, other: RoomId) -> bool {
        self.connections.contains(&other)
    }

    pub fn barriers(&self) -> &[PlacedBarrier] {
        &self.barriers
    }
}

/// One corridor piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    pub coord: GridCoord,
    pub entity: EntityId,
    /// `Corridor` or `VerticalCorridor`.
    pub kind: EntityKind,
    /// The room pair this piece was carved for.
    pub link: (RoomId, RoomId),
    /// Whether the piece claimed its grid cell. Vertical links between stacked
    /// rooms sit on the upper room's cell and leave the grid unchanged.
    pub carved: bool,
}

/// An enemy or pickup assigned to a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub room: RoomId,
    pub kind: EntityKind,
    pub entity: EntityId,
    /// Transform relative to the room.
    pub transform: Transform,
}

/// Grid, scene and the typed records of one generated dungeon.
#[derive(Debug, Clone)]
pub struct Dungeon {
    pub(crate) grid: SpatialGrid,
    pub(crate) scene: Scene,
    pub(crate) rooms: Vec<Room>,
    pub(crate) corridors: Vec<Corridor>,
    pub(crate) occupants: Vec<Occupant>,
    pub(crate) origin: Vec3,
}

impl Dungeon {
    pub fn new(grid_size: u32, cell_size: f32, origin: Vec3) -> Self {
        Self {
            grid: SpatialGrid::new(grid_size, cell_size),
            scene: Scene::new(),
            rooms: Vec::new(),
            corridors: Vec::new(),
            occupants: Vec::new(),
            origin,
        }
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for hosts that drain its event log.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_at(&self, coord: GridCoord) -> Option<RoomId> {
        self.rooms.iter().find(|r| r.coord == coord).map(|r| r.id)
    }

    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// World position of a grid cell, offset by the dungeon origin.
    pub fn cell_world_position(&self, coord: GridCoord) -> Vec3 {
        self.origin + self.grid.grid_to_world(coord)
    }

    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.room(a).is_some_and(|r| r.is_connected_to(b))
    }

    /// Record an undirected edge. Returns false for self-links, unknown rooms
    /// and edges that already exist.
    pub(crate) fn link(&mut self, a: RoomId, b: RoomId) -> bool {
        if a == b || a.0 >= self.rooms.len() || b.0 >= self.rooms.len() {
            return false;
        }
        let added = self.rooms[a.0].connections.insert(b);
        self.rooms[b.0].connections.insert(a);
        added
    }

    /// Every room reachable from `start` over recorded connections.
    pub fn reachable_from(&self, start: RoomId) -> BTreeSet<RoomId> {
        let mut seen = BTreeSet::new();
        if self.room(start).is_none() {
            return seen;
        }
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(id) = queue.pop_front() {
            for next in &self.rooms[id.0].connections {
                if seen.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
        seen
    }

    /// True when every room can reach every other room. Trivially true for
    /// zero or one room.
    pub fn is_fully_connected(&self) -> bool {
        match self.rooms.first() {
            None => true,
            Some(first) => self.reachable_from(first.id).len() == self.rooms.len(),
        }
    }

    /// Despawn everything this dungeon instantiated and forget the records.
    /// Barriers go first, then rooms with their children, then corridors.
    /// Returns the number of scene entities removed.
    pub fn teardown(&mut self) -> usize {
        let mut removed = 0;
        for room in &mut self.rooms {
            for barrier in room.barriers.drain(..) {
                removed += self.scene.despawn_recursive(barrier.entity);
            }
        }
        for room in &self.rooms {
            removed += self.scene.despawn_recursive(room.entity);
        }
        for corridor in &self.corridors {
            removed += self.scene.despawn_recursive(corridor.entity);
        }
        removed += self.scene.clear();
        self.rooms.clear();
        self.corridors.clear();
        self.occupants.clear();
        tracing::debug!(removed, "dungeon torn down");
        removed
    }

    /// Tear down and reallocate an empty grid. Returns the number of scene
    /// entities removed.
    pub fn reset(&mut self, grid_size: u32, cell_size: f32, origin: Vec3) -> usize {
        let removed = self.teardown();
        self.grid.reset(grid_size, cell_size);
        self.origin = origin;
        removed
    }
}
