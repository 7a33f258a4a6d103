use delve_common::{EntityKind, PrefabHandle, Transform};
use delve_kernel::EntityData;
use glam::{Quat, Vec3};
use rand::Rng;
use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use crate::dungeon::{Dungeon, Occupant, RoomId};

/// Uniform scale jitter applied to every spawned enemy.
pub const ENEMY_SCALE_JITTER: RangeInclusive<f32> = 0.8..=1.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationStats {
    pub enemies: usize,
    pub treasures: usize,
}

/// Rolls independent enemy and treasure trials for every room.
#[derive(Debug, Clone)]
pub struct Populator {
    enemy_chance: f64,
    treasure_chance: f64,
    enemy_prefab: Option<PrefabHandle>,
    treasure_prefab: Option<PrefabHandle>,
}

impl Populator {
    /// Chances must lie in `[0, 1]`. A missing prefab disables its trial.
    pub fn new(
        enemy_chance: f64,
        treasure_chance: f64,
        enemy_prefab: Option<PrefabHandle>,
        treasure_prefab: Option<PrefabHandle>,
    ) -> Self {
        Self {
            enemy_chance,
            treasure_chance,
            enemy_prefab,
            treasure_prefab,
        }
    }

    pub fn populate(&self, dungeon: &mut Dungeon, rng: &mut impl Rng) -> PopulationStats {
        let mut stats = PopulationStats::default();
        for i in 0..dungeon.rooms.len() {
            let room = RoomId(i);
            if let Some(prefab) = self.enemy_prefab
                && rng.gen_bool(self.enemy_chance)
            {
                let transform = Transform::default()
                    .with_rotation(random_yaw(rng))
                    .with_uniform_scale(rng.gen_range(ENEMY_SCALE_JITTER));
                spawn_occupant(dungeon, room, EntityKind::Enemy, prefab, transform);
                stats.enemies += 1;
            }
            if let Some(prefab) = self.treasure_prefab
                && rng.gen_bool(self.treasure_chance)
            {
                let transform = Transform::default().with_rotation(random_yaw(rng));
                spawn_occupant(dungeon, room, EntityKind::Treasure, prefab, transform);
                stats.treasures += 1;
            }
        }
        tracing::debug!(
            enemies = stats.enemies,
            treasures = stats.treasures,
            "dungeon populated"
        );
        stats
    }
}

fn random_yaw(rng: &mut impl Rng) -> Quat {
    Quat::from_rotation_y(rng.gen_range(0.0..TAU))
}

fn spawn_occupant(
    dungeon: &mut Dungeon,
    room: RoomId,
    kind: EntityKind,
    prefab: PrefabHandle,
    transform: Transform,
) {
    let parent = dungeon.rooms[room.0].entity;
    let entity = dungeon.scene.spawn(
        EntityData::new(kind, transform)
            .with_parent(parent)
            .with_prefab(prefab),
    );
    dungeon.occupants.push(Occupant {
        room,
        kind,
        entity,
        transform,
    });
}

/// World position an occupant resolves to: its room's centre.
pub fn occupant_world_position(dungeon: &Dungeon, occupant: &Occupant) -> Option<Vec3> {
    dungeon
        .scene
        .world_transform(occupant.entity)
        .map(|t| t.position)
}
