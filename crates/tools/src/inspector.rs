use std::collections::BTreeMap;
use std::fmt;

use delve_common::{EntityId, EntityKind, GridCoord};
use delve_gen::{BarrierSide, Dungeon, RoomId};
use delve_grid::CellState;
use glam::Vec3;

/// Dungeon inspector for developer tooling.
///
/// Read-only queries over a generated dungeon, for debugging and the CLI.
pub struct DungeonInspector;

impl DungeonInspector {
    /// Produce a summary of the dungeon.
    pub fn summary(dungeon: &Dungeon) -> DungeonSummary {
        let scene = dungeon.scene();
        DungeonSummary {
            grid_size: dungeon.grid().size(),
            cell_size: dungeon.grid().cell_size(),
            rooms: dungeon.room_count(),
            corridors: scene.count_kind(EntityKind::Corridor),
            vertical_corridors: scene.count_kind(EntityKind::VerticalCorridor),
            barriers: scene.count_kind(EntityKind::Barrier),
            enemies: scene.count_kind(EntityKind::Enemy),
            treasures: scene.count_kind(EntityKind::Treasure),
            entity_count: scene.entity_count(),
            occupied_cells: dungeon.grid().occupied_count(),
        }
    }

    /// Details of a single room.
    pub fn inspect_room(dungeon: &Dungeon, id: RoomId) -> Option<RoomInfo> {
        dungeon.room(id).map(|room| RoomInfo {
            id,
            coord: room.coord,
            position: room.position(),
            connections: room.connections().iter().copied().collect(),
            barriers: room.barriers().len(),
            occupants: dungeon
                .occupants()
                .iter()
                .filter(|o| o.room == id)
                .map(|o| o.kind)
                .collect(),
        })
    }

    /// All rooms in placement order.
    pub fn list_rooms(dungeon: &Dungeon) -> Vec<RoomInfo> {
        dungeon
            .rooms()
            .iter()
            .filter_map(|r| Self::inspect_room(dungeon, r.id))
            .collect()
    }

    /// Check the structural rules every generated dungeon must satisfy.
    pub fn validate(dungeon: &Dungeon) -> ValidationReport {
        let mut report = ValidationReport::default();

        // Rooms and carved corridor pieces must each own a distinct cell.
        let mut claims: BTreeMap<GridCoord, usize> = BTreeMap::new();
        let rooms = dungeon.rooms().iter().map(|r| r.coord);
        let carved = dungeon
            .corridors()
            .iter()
            .filter(|c| c.carved)
            .map(|c| c.coord);
        for coord in rooms.chain(carved) {
            *claims.entry(coord).or_default() += 1;
        }
        report.overlapping_cells = claims
            .iter()
            .filter(|(_, n)| **n > 1)
            .map(|(c, _)| *c)
            .collect();

        let grid = dungeon.grid();
        let expected = claims.len();
        let occupied = grid.occupied_count();
        if expected != occupied {
            report.occupancy_mismatch = Some((expected, occupied));
        }
        for room in dungeon.rooms() {
            if grid.state(room.coord) != Some(CellState::Room) {
                report.unmarked_rooms.push(room.id);
            }
        }

        if let Some(first) = dungeon.rooms().first() {
            let reachable = dungeon.reachable_from(first.id);
            report.disconnected_rooms = dungeon
                .rooms()
                .iter()
                .map(|r| r.id)
                .filter(|id| !reachable.contains(id))
                .collect();
        }

        let scene = dungeon.scene();
        for room in dungeon.rooms() {
            let half = room.transform.scale * 0.5;
            for barrier in room.barriers() {
                let p = barrier.spec.local_position.abs();
                let inside = p.x <= half.x && p.y <= half.y && p.z <= half.z;
                let attached = scene
                    .get(barrier.entity)
                    .is_some_and(|data| data.parent == Some(room.entity));
                if !inside || !attached {
                    report.barrier_violations.push((room.id, barrier.spec.side));
                }
            }
        }

        let entities = dungeon
            .rooms()
            .iter()
            .flat_map(|r| std::iter::once(r.entity).chain(r.barriers().iter().map(|b| b.entity)))
            .chain(dungeon.corridors().iter().map(|c| c.entity))
            .chain(dungeon.occupants().iter().map(|o| o.entity));
        report.missing_entities = entities.filter(|id| !scene.contains(*id)).collect();

        if !report.is_ok() {
            tracing::warn!(%report, "dungeon failed validation");
        }
        report
    }
}

/// Summary of dungeon state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct DungeonSummary {
    pub grid_size: u32,
    pub cell_size: f32,
    pub rooms: usize,
    pub corridors: usize,
    pub vertical_corridors: usize,
    pub barriers: usize,
    pub enemies: usize,
    pub treasures: usize,
    pub entity_count: usize,
    pub occupied_cells: usize,
}

impl fmt::Display for DungeonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dungeon: grid={}^3 cell={:.2} rooms={} corridors={} vertical={} barriers={} enemies={} treasures={} entities={} occupied={}",
            self.grid_size,
            self.cell_size,
            self.rooms,
            self.corridors,
            self.vertical_corridors,
            self.barriers,
            self.enemies,
            self.treasures,
            self.entity_count,
            self.occupied_cells,
        )
    }
}

/// Detailed info about a single room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInfo {
    pub id: RoomId,
    pub coord: GridCoord,
    pub position: Vec3,
    pub connections: Vec<RoomId>,
    pub barriers: usize,
    pub occupants: Vec<EntityKind>,
}

impl fmt::Display for RoomInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links: Vec<String> = self.connections.iter().map(|r| r.0.to_string()).collect();
        let occupants: Vec<String> = self.occupants.iter().map(|k| k.to_string()).collect();
        write!(
            f,
            "Room {} at {} pos=({:.2}, {:.2}, {:.2}) links=[{}] barriers={} occupants=[{}]",
            self.id.0,
            self.coord,
            self.position.x,
            self.position.y,
            self.position.z,
            links.join(", "),
            self.barriers,
            occupants.join(", "),
        )
    }
}

/// Outcome of [`DungeonInspector::validate`]. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Cells claimed by more than one room or carved corridor.
    pub overlapping_cells: Vec<GridCoord>,
    /// `(expected, actual)` occupied cell counts when they differ.
    pub occupancy_mismatch: Option<(usize, usize)>,
    /// Rooms whose cell is not marked as a room in the grid.
    pub unmarked_rooms: Vec<RoomId>,
    /// Rooms not reachable from the starting room.
    pub disconnected_rooms: Vec<RoomId>,
    /// Barriers outside their room's bounds or detached from it.
    pub barrier_violations: Vec<(RoomId, BarrierSide)>,
    /// Recorded entities absent from the scene.
    pub missing_entities: Vec<EntityId>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.overlapping_cells.is_empty()
            && self.occupancy_mismatch.is_none()
            && self.unmarked_rooms.is_empty()
            && self.disconnected_rooms.is_empty()
            && self.barrier_violations.is_empty()
            && self.missing_entities.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "valid");
        }
        write!(
            f,
            "overlaps={} unmarked={} disconnected={} barrier_violations={} missing_entities={}",
            self.overlapping_cells.len(),
            self.unmarked_rooms.len(),
            self.disconnected_rooms.len(),
            self.barrier_violations.len(),
            self.missing_entities.len(),
        )?;
        if let Some((expected, actual)) = self.occupancy_mismatch {
            write!(f, " occupancy={actual}/{expected}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_common::PrefabHandle;
    use delve_gen::{DungeonConfig, DungeonGenerator, PrefabSet, RoomPlacer};

    fn generated(seed: u64) -> DungeonGenerator {
        let mut g = DungeonGenerator::new(
            DungeonConfig {
                grid_size: 5,
                cell_size: 0.2,
                min_rooms: 6,
                max_rooms: 10,
                enemy_spawn_chance: 1.0,
                ..DungeonConfig::default()
            },
            PrefabSet::placeholders(),
        );
        g.generate_with_seed(seed).unwrap();
        g
    }

    #[test]
    fn summary_empty_dungeon() {
        let d = Dungeon::new(5, 1.0, Vec3::ZERO);
        let summary = DungeonInspector::summary(&d);
        assert_eq!(summary.rooms, 0);
        assert_eq!(summary.entity_count, 0);
        assert_eq!(summary.occupied_cells, 0);
    }

    #[test]
    fn summary_counts_generated_entities() {
        let g = generated(11);
        let summary = DungeonInspector::summary(g.dungeon());
        assert_eq!(summary.rooms, g.room_count());
        assert_eq!(summary.barriers, g.room_count() * 5);
        assert_eq!(summary.enemies, g.room_count());
        assert_eq!(
            summary.entity_count,
            g.dungeon().scene().entity_count()
        );
    }

    #[test]
    fn list_rooms_in_placement_order() {
        let g = generated(4);
        let rooms = DungeonInspector::list_rooms(g.dungeon());
        assert_eq!(rooms.len(), g.room_count());
        assert_eq!(rooms[0].id, RoomId(0));
        assert_eq!(rooms[0].coord, GridCoord::new(2, 2, 2));
        assert!(rooms.iter().all(|r| r.occupants.contains(&EntityKind::Enemy)));
    }

    #[test]
    fn inspect_room_not_found() {
        let d = Dungeon::new(5, 1.0, Vec3::ZERO);
        assert!(DungeonInspector::inspect_room(&d, RoomId(3)).is_none());
    }

    #[test]
    fn generated_dungeons_validate() {
        for seed in 0..10 {
            let g = generated(seed);
            let report = DungeonInspector::validate(g.dungeon());
            assert!(report.is_ok(), "seed {seed}: {report}");
        }
    }

    #[test]
    fn unlinked_rooms_are_reported() {
        let mut d = Dungeon::new(5, 1.0, Vec3::ZERO);
        let placer = RoomPlacer::new(PrefabHandle(1));
        placer.place_room_at_center(&mut d).unwrap();
        placer.place_at(&mut d, GridCoord::new(0, 0, 0)).unwrap();

        let report = DungeonInspector::validate(&d);
        assert!(!report.is_ok());
        assert_eq!(report.disconnected_rooms, vec![RoomId(1)]);
        assert!(report.overlapping_cells.is_empty());
        assert!(report.occupancy_mismatch.is_none());
    }

    #[test]
    fn despawned_room_entity_is_reported() {
        let mut g = generated(2);
        let entity = g.dungeon().rooms()[0].entity;
        g.dungeon_mut().scene_mut().despawn_recursive(entity);

        let report = DungeonInspector::validate(g.dungeon());
        assert!(report.missing_entities.contains(&entity));
        // The room's barriers went with it.
        assert_eq!(report.barrier_violations.len(), 5);
    }

    #[test]
    fn summary_display() {
        let d = Dungeon::new(3, 1.0, Vec3::ZERO);
        let s = format!("{}", DungeonInspector::summary(&d));
        assert!(s.contains("grid=3^3"));
        assert!(s.contains("rooms=0"));
    }

    #[test]
    fn room_display() {
        let g = generated(5);
        let info = DungeonInspector::inspect_room(g.dungeon(), RoomId(0)).unwrap();
        let s = format!("{info}");
        assert!(s.starts_with("Room 0 at (2, 2, 2)"));
    }
}
