//! Corridor carving: greedy nearest-pair spanning tree, loop edges, and
//! vertical links between stacked rooms.

use delve_common::{EntityKind, GridCoord, PrefabHandle, Transform};
use delve_grid::CellState;
use delve_kernel::EntityData;
use glam::{Quat, Vec3};
use rand::Rng;

use crate::config::{DEFAULT_LOOP_EDGE_RATIO, MAX_LOOP_EDGE_RATIO};
use crate::dungeon::{Corridor, Dungeon, RoomId};

/// Corridor geometry is shrunk to 70% of a cell.
pub const CORRIDOR_SCALE_FACTOR: f32 = 0.7;
/// Vertical links are slim shafts, full cell height.
pub const VERTICAL_SCALE_FACTORS: Vec3 = Vec3::new(0.5, 1.0, 0.5);

/// Edge counts from one `connect_rooms` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub tree_edges: usize,
    pub loop_edges: usize,
    pub cells_carved: usize,
}

/// Cells strictly between `from` and `to` on the axis-ordered Manhattan path:
/// all X steps first, then Y, then Z.
pub fn corridor_path(from: GridCoord, to: GridCoord) -> Vec<GridCoord> {
    let mut path = Vec::with_capacity(from.manhattan(to) as usize);
    let mut cur = from;
    while cur.x != to.x {
        cur.x += (to.x - cur.x).signum();
        path.push(cur);
    }
    while cur.y != to.y {
        cur.y += (to.y - cur.y).signum();
        path.push(cur);
    }
    while cur.z != to.z {
        cur.z += (to.z - cur.z).signum();
        path.push(cur);
    }
    path.pop();
    path
}

/// Links placed rooms with carved corridors.
#[derive(Debug, Clone)]
pub struct CorridorConnector {
    corridor_prefab: PrefabHandle,
    vertical_prefab: PrefabHandle,
    loop_edge_ratio: f32,
}

impl CorridorConnector {
    pub fn new(corridor_prefab: PrefabHandle, vertical_prefab: PrefabHandle) -> Self {
        Self {
            corridor_prefab,
            vertical_prefab,
            loop_edge_ratio: DEFAULT_LOOP_EDGE_RATIO,
        }
    }

    /// Clamped to `[0, MAX_LOOP_EDGE_RATIO]`; NaN disables loop edges.
    pub fn with_loop_edge_ratio(mut self, ratio: f32) -> Self {
        self.loop_edge_ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, MAX_LOOP_EDGE_RATIO)
        };
        self
    }

    /// Connect every room into one graph, then add loop edges.
    ///
    /// The tree grows from room 0 by repeatedly linking the globally closest
    /// (connected, unconnected) pair. Ties keep the first pair found in room
    /// order.
    pub fn connect_rooms(&self, dungeon: &mut Dungeon, rng: &mut impl Rng) -> ConnectionStats {
        let _span = tracing::info_span!("connect_rooms", rooms = dungeon.room_count()).entered();
        let mut stats = ConnectionStats::default();
        if dungeon.rooms.is_empty() {
            return stats;
        }

        let mut connected = vec![RoomId(0)];
        let mut unconnected: Vec<RoomId> = (1..dungeon.rooms.len()).map(RoomId).collect();
        while !unconnected.is_empty() {
            let mut best: Option<(f32, RoomId, usize)> = None;
            for &a in &connected {
                let ca = dungeon.rooms[a.0].coord;
                for (slot, &b) in unconnected.iter().enumerate() {
                    let d = ca.distance(dungeon.rooms[b.0].coord);
                    if best.is_none_or(|(bd, _, _)| d < bd) {
                        best = Some((d, a, slot));
                    }
                }
            }
            let Some((_, a, slot)) = best else {
                break;
            };
            let b = unconnected.remove(slot);
            stats.cells_carved += self.carve_corridor(dungeon, a, b);
            connected.push(b);
            stats.tree_edges += 1;
        }

        let extra = (dungeon.rooms.len() as f32 * self.loop_edge_ratio).floor() as usize;
        let n = dungeon.rooms.len();
        for _ in 0..extra {
            let a = RoomId(rng.gen_range(0..n));
            let b = RoomId(rng.gen_range(0..n));
            if a == b || dungeon.are_connected(a, b) {
                continue;
            }
            stats.cells_carved += self.carve_corridor(dungeon, a, b);
            stats.loop_edges += 1;
        }

        tracing::debug!(
            tree = stats.tree_edges,
            loops = stats.loop_edges,
            cells = stats.cells_carved,
            "rooms connected"
        );
        stats
    }

    /// Carve the axis-ordered path from `a` to `b` through empty cells and
    /// record the edge. The edge is recorded even when every intermediate cell
    /// was already occupied. Returns the number of cells carved.
    pub fn carve_corridor(&self, dungeon: &mut Dungeon, a: RoomId, b: RoomId) -> usize {
        let (Some(ra), Some(rb)) = (dungeon.room(a), dungeon.room(b)) else {
            return 0;
        };
        let path = corridor_path(ra.coord, rb.coord);
        let scale = dungeon.grid.cell_size() * CORRIDOR_SCALE_FACTOR;

        let mut carved = 0;
        for coord in path {
            if !dungeon.grid.occupy(coord, CellState::Corridor) {
                continue;
            }
            let transform = Transform::from_position(dungeon.cell_world_position(coord))
                .with_uniform_scale(scale);
            let entity = dungeon.scene.spawn(
                EntityData::new(EntityKind::Corridor, transform).with_prefab(self.corridor_prefab),
            );
            dungeon.corridors.push(Corridor {
                coord,
                entity,
                kind: EntityKind::Corridor,
                link: (a, b),
                carved: true,
            });
            carved += 1;
        }
        dungeon.link(a, b);
        tracing::trace!(a = a.0, b = b.0, carved, "corridor carved");
        carved
    }

    /// Link every not-yet-connected pair of rooms stacked directly on top of
    /// each other (same X and Z, Y one apart) with a vertical corridor piece
    /// at the lower room's cell plus one on Y. Returns the number of links.
    pub fn connect_vertical_rooms(&self, dungeon: &mut Dungeon) -> usize {
        let mut pairs = Vec::new();
        for (i, a) in dungeon.rooms.iter().enumerate() {
            for b in &dungeon.rooms[i + 1..] {
                if a.coord.x != b.coord.x || a.coord.z != b.coord.z {
                    continue;
                }
                if a.coord.y.abs_diff(b.coord.y) != 1 || a.is_connected_to(b.id) {
                    continue;
                }
                let (lower, upper) = if a.coord.y < b.coord.y { (a, b) } else { (b, a) };
                pairs.push((lower.id, upper.id, lower.coord.offset(0, 1, 0)));
            }
        }

        let cell_size = dungeon.grid.cell_size();
        for &(lower, upper, coord) in &pairs {
            let carved = dungeon.grid.occupy(coord, CellState::Corridor);
            let transform = Transform::from_position(dungeon.cell_world_position(coord))
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4))
                .with_scale(VERTICAL_SCALE_FACTORS * cell_size);
            let entity = dungeon.scene.spawn(
                EntityData::new(EntityKind::VerticalCorridor, transform)
                    .with_prefab(self.vertical_prefab),
            );
            dungeon.corridors.push(Corridor {
                coord,
                entity,
                kind: EntityKind::VerticalCorridor,
                link: (lower, upper),
                carved,
            });
            dungeon.link(lower, upper);
            tracing::debug!(lower = lower.0, upper = upper.0, %coord, "vertical link");
        }
        pairs.len()
    }
}
