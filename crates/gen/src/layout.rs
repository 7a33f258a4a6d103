use delve_common::{EntityKind, GridCoord};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::barriers::BarrierSpec;
use crate::dungeon::{Dungeon, RoomId};

/// Serialisable, id-free snapshot of a generated dungeon.
///
/// Two runs with the same seed and config produce equal layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub seed: u64,
    pub grid_size: u32,
    pub cell_size: f32,
    pub origin: Vec3,
    pub rooms: Vec<RoomLayout>,
    pub corridors: Vec<CorridorLayout>,
    pub occupants: Vec<OccupantLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub id: RoomId,
    pub coord: GridCoord,
    pub position: Vec3,
    pub scale: f32,
    pub connections: Vec<RoomId>,
    pub barriers: Vec<BarrierSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorLayout {
    pub coord: GridCoord,
    pub position: Vec3,
    pub vertical: bool,
    pub link: (RoomId, RoomId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantLayout {
    pub room: RoomId,
    pub kind: EntityKind,
    pub rotation: Quat,
    pub scale: f32,
}

impl DungeonLayout {
    pub fn capture(dungeon: &Dungeon, seed: u64) -> Self {
        let rooms = dungeon
            .rooms()
            .iter()
            .map(|r| RoomLayout {
                id: r.id,
                coord: r.coord,
                position: r.position(),
                scale: r.transform.scale.x,
                connections: r.connections().iter().copied().collect(),
                barriers: r.barriers().iter().map(|b| b.spec).collect(),
            })
            .collect();
        let corridors = dungeon
            .corridors()
            .iter()
            .map(|c| CorridorLayout {
                coord: c.coord,
                position: dungeon.cell_world_position(c.coord),
                vertical: c.kind == EntityKind::VerticalCorridor,
                link: c.link,
            })
            .collect();
        let occupants = dungeon
            .occupants()
            .iter()
            .map(|o| OccupantLayout {
                room: o.room,
                kind: o.kind,
                rotation: o.transform.rotation,
                scale: o.transform.scale.x,
            })
            .collect();
        Self {
            seed,
            grid_size: dungeon.grid().size(),
            cell_size: dungeon.grid().cell_size(),
            origin: dungeon.origin(),
            rooms,
            corridors,
            occupants,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfig;
    use crate::generator::DungeonGenerator;
    use crate::prefab::PrefabSet;

    fn generated() -> DungeonLayout {
        let mut g = DungeonGenerator::new(
            DungeonConfig {
                grid_size: 6,
                min_rooms: 8,
                max_rooms: 8,
                enemy_spawn_chance: 1.0,
                treasure_spawn_chance: 1.0,
                origin: Vec3::new(1.0, 0.0, -3.0),
                ..DungeonConfig::default()
            },
            PrefabSet::placeholders(),
        );
        g.generate_with_seed(17).unwrap();
        g.layout().unwrap()
    }

    #[test]
    fn json_round_trip_preserves_layout() {
        let layout = generated();
        assert!(!layout.rooms.is_empty());
        assert!(!layout.occupants.is_empty());

        let json = layout.to_json().unwrap();
        let restored: DungeonLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, layout);
    }

    #[test]
    fn json_names_the_dungeon_fields() {
        let json = generated().to_json().unwrap();
        for key in ["\"seed\"", "\"rooms\"", "\"corridors\"", "\"occupants\"", "\"barriers\""] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[test]
    fn capture_mirrors_dungeon_records() {
        let mut g = DungeonGenerator::new(DungeonConfig::default(), PrefabSet::placeholders());
        g.generate_with_seed(3).unwrap();
        let layout = g.layout().unwrap();
        let d = g.dungeon();
        assert_eq!(layout.seed, 3);
        assert_eq!(layout.rooms.len(), d.room_count());
        assert_eq!(layout.corridors.len(), d.corridors().len());
        assert_eq!(layout.occupants.len(), d.occupants().len());
        assert_eq!(layout.rooms[0].coord, d.grid().center());
    }
}
