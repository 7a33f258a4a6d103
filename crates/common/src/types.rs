use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an entity in the scene.
///
/// Ids are derived from a per-scene counter so that two scenes driven by the
/// same seed hand out the same ids in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn from_index(index: u64) -> Self {
        Self(Uuid::from_u64_pair(0, index))
    }

    /// The counter value this id was derived from.
    pub fn index(&self) -> u64 {
        self.0.as_u64_pair().1
    }
}

/// Typed tag carried by every instantiated object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Room,
    Corridor,
    VerticalCorridor,
    Barrier,
    Enemy,
    Treasure,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Room,
        EntityKind::Corridor,
        EntityKind::VerticalCorridor,
        EntityKind::Barrier,
        EntityKind::Enemy,
        EntityKind::Treasure,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Room => "room",
            EntityKind::Corridor => "corridor",
            EntityKind::VerticalCorridor => "vertical_corridor",
            EntityKind::Barrier => "barrier",
            EntityKind::Enemy => "enemy",
            EntityKind::Treasure => "treasure",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A handle referencing an external geometry template supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabHandle(pub u64);

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_roundtrips_index() {
        let id = EntityId::from_index(42);
        assert_eq!(id.index(), 42);
        assert_ne!(EntityId::from_index(1), EntityId::from_index(2));
    }

    #[test]
    fn entity_ids_order_by_index() {
        assert!(EntityId::from_index(3) < EntityId::from_index(10));
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn transform_builders() {
        let t = Transform::from_position(Vec3::X).with_uniform_scale(0.5);
        assert_eq!(t.position, Vec3::X);
        assert_eq!(t.scale, Vec3::splat(0.5));
    }

    #[test]
    fn kind_tags_are_distinct() {
        let mut tags: Vec<&str> = EntityKind::ALL.iter().map(|k| k.tag()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), EntityKind::ALL.len());
    }
}
