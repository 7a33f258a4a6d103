use delve_common::{EntityKind, Transform};
use delve_kernel::EntityData;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::dungeon::{Dungeon, PlacedBarrier, RoomId};

/// Which face of the room a barrier closes off. The ceiling stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarrierSide {
    North,
    South,
    East,
    West,
    Floor,
}

impl BarrierSide {
    pub const ALL: [BarrierSide; 5] = [
        BarrierSide::North,
        BarrierSide::South,
        BarrierSide::East,
        BarrierSide::West,
        BarrierSide::Floor,
    ];

    pub fn is_wall(&self) -> bool {
        !matches!(self, BarrierSide::Floor)
    }
}

/// Data-only description of one invisible collision slab.
///
/// `local_position` and `size` are in world units, relative to the room centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierSpec {
    pub side: BarrierSide,
    pub local_position: Vec3,
    pub size: Vec3,
}

/// Derives and attaches the barrier set of each room.
#[derive(Debug, Clone)]
pub struct BoundaryAttacher {
    edge_offset: f32,
    thickness: f32,
}

impl BoundaryAttacher {
    pub fn new(edge_offset: f32, thickness: f32) -> Self {
        Self {
            edge_offset,
            thickness,
        }
    }

    /// Four walls inset by `edge_offset` from each horizontal edge plus a floor
    /// slab, for a room of world scale `scale`.
    pub fn barrier_specs(&self, scale: Vec3) -> [BarrierSpec; 5] {
        let half = scale * 0.5;
        // Clamp so an oversized offset collapses walls onto the centre instead
        // of flipping them to the opposite side.
        let inset_x = (half.x - self.edge_offset).max(0.0);
        let inset_z = (half.z - self.edge_offset).max(0.0);
        let floor_y = -half.y + self.edge_offset.min(half.y);
        let t = self.thickness;
        let north_south = Vec3::new(scale.x, scale.y, t);
        let east_west = Vec3::new(t, scale.y, scale.z);
        let floor = Vec3::new(scale.x, t, scale.z);

        BarrierSide::ALL.map(|side| {
            let (local_position, size) = match side {
                BarrierSide::North => (Vec3::new(0.0, 0.0, inset_z), north_south),
                BarrierSide::South => (Vec3::new(0.0, 0.0, -inset_z), north_south),
                BarrierSide::East => (Vec3::new(inset_x, 0.0, 0.0), east_west),
                BarrierSide::West => (Vec3::new(-inset_x, 0.0, 0.0), east_west),
                BarrierSide::Floor => (Vec3::new(0.0, floor_y, 0.0), floor),
            };
            BarrierSpec {
                side,
                local_position,
                size,
            }
        })
    }

    /// Spawn invisible barriers parented to `room`, replacing any it already
    /// has. Returns the number attached; zero for an unknown room.
    pub fn attach(&self, dungeon: &mut Dungeon, room: RoomId) -> usize {
        self.remove_barriers(dungeon, room);
        let Some(r) = dungeon.rooms.get(room.0) else {
            return 0;
        };
        let (parent, scale) = (r.entity, r.transform.scale);

        let mut placed = Vec::with_capacity(BarrierSide::ALL.len());
        for spec in self.barrier_specs(scale) {
            let transform = Transform::from_position(spec.local_position).with_scale(spec.size);
            let entity = dungeon.scene.spawn(
                EntityData::new(EntityKind::Barrier, transform)
                    .with_parent(parent)
                    .invisible(),
            );
            placed.push(PlacedBarrier { spec, entity });
        }
        let count = placed.len();
        dungeon.rooms[room.0].barriers = placed;
        tracing::trace!(room = room.0, count, "barriers attached");
        count
    }

    /// Delete a room's barriers. Leaves the room and grid untouched; no-op for
    /// an unknown room or one without barriers.
    pub fn remove_barriers(&self, dungeon: &mut Dungeon, room: RoomId) -> usize {
        let Some(r) = dungeon.rooms.get_mut(room.0) else {
            return 0;
        };
        let mut removed = 0;
        for barrier in r.barriers.drain(..) {
            removed += dungeon.scene.despawn_recursive(barrier.entity);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::RoomPlacer;
    use delve_common::{GridCoord, PrefabHandle};

    fn attacher() -> BoundaryAttacher {
        BoundaryAttacher::new(0.02, 0.05)
    }

    fn one_room() -> (Dungeon, RoomId) {
        let mut d = Dungeon::new(3, 1.0, Vec3::ZERO);
        let id = RoomPlacer::new(PrefabHandle(1))
            .place_at(&mut d, GridCoord::new(1, 1, 1))
            .unwrap();
        (d, id)
    }

    #[test]
    fn walls_stay_within_half_extent() {
        let scale = Vec3::new(0.9, 0.6, 1.2);
        for spec in attacher().barrier_specs(scale) {
            let p = spec.local_position.abs();
            assert!(p.x <= scale.x / 2.0, "{spec:?}");
            assert!(p.y <= scale.y / 2.0, "{spec:?}");
            assert!(p.z <= scale.z / 2.0, "{spec:?}");
            assert!(spec.size.min_element() > 0.0, "{spec:?}");
        }
    }

    #[test]
    fn walls_are_inset_by_edge_offset() {
        let specs = attacher().barrier_specs(Vec3::ONE);
        let north = specs.iter().find(|s| s.side == BarrierSide::North).unwrap();
        let west = specs.iter().find(|s| s.side == BarrierSide::West).unwrap();
        let floor = specs.iter().find(|s| s.side == BarrierSide::Floor).unwrap();
        assert!((north.local_position.z - 0.48).abs() < 1e-6);
        assert!((west.local_position.x + 0.48).abs() < 1e-6);
        assert!((floor.local_position.y + 0.48).abs() < 1e-6);
        assert_eq!(north.size, Vec3::new(1.0, 1.0, 0.05));
        assert_eq!(floor.size, Vec3::new(1.0, 0.05, 1.0));
    }

    #[test]
    fn oversized_offset_does_not_flip_walls() {
        let specs = BoundaryAttacher::new(5.0, 0.1).barrier_specs(Vec3::ONE);
        for spec in specs {
            assert!(spec.local_position.abs().max_element() <= 0.5);
        }
    }

    #[test]
    fn only_four_walls_and_a_floor() {
        let specs = attacher().barrier_specs(Vec3::ONE);
        assert_eq!(specs.iter().filter(|s| s.side.is_wall()).count(), 4);
        assert_eq!(specs.len(), 5);
    }

    #[test]
    fn attach_spawns_invisible_children() {
        let (mut d, id) = one_room();
        assert_eq!(attacher().attach(&mut d, id), 5);

        let room = d.room(id).unwrap();
        let children = d.scene().children_of(room.entity);
        assert_eq!(children.len(), 5);
        for child in children {
            let data = d.scene().get(child).unwrap();
            assert_eq!(data.kind, EntityKind::Barrier);
            assert!(!data.visible);
        }
    }

    #[test]
    fn reattach_replaces_previous_set() {
        let (mut d, id) = one_room();
        attacher().attach(&mut d, id);
        attacher().attach(&mut d, id);
        assert_eq!(d.scene().count_kind(EntityKind::Barrier), 5);
        assert_eq!(d.room(id).unwrap().barriers().len(), 5);
    }

    #[test]
    fn remove_barriers_keeps_room_and_grid() {
        let (mut d, id) = one_room();
        attacher().attach(&mut d, id);
        assert_eq!(attacher().remove_barriers(&mut d, id), 5);
        assert_eq!(d.scene().count_kind(EntityKind::Barrier), 0);
        assert_eq!(d.scene().count_kind(EntityKind::Room), 1);
        assert_eq!(d.grid().occupied_count(), 1);
        // Already cleared and unknown rooms are no-ops.
        assert_eq!(attacher().remove_barriers(&mut d, id), 0);
        assert_eq!(attacher().remove_barriers(&mut d, RoomId(42)), 0);
    }
}
