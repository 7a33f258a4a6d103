use delve_common::{EntityKind, PrefabHandle};
use serde::{Deserialize, Serialize};

use crate::config::DungeonConfig;
use crate::error::GenerationError;

/// Geometry templates supplied by the host, one per instantiated kind.
///
/// Barriers are built from data alone and need no template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefabSet {
    pub room: Option<PrefabHandle>,
    pub corridor: Option<PrefabHandle>,
    pub vertical_corridor: Option<PrefabHandle>,
    pub enemy: Option<PrefabHandle>,
    pub treasure: Option<PrefabHandle>,
}

impl PrefabSet {
    /// A complete set of placeholder handles, numbered in `EntityKind` order.
    pub fn placeholders() -> Self {
        Self {
            room: Some(PrefabHandle(1)),
            corridor: Some(PrefabHandle(2)),
            vertical_corridor: Some(PrefabHandle(3)),
            enemy: Some(PrefabHandle(5)),
            treasure: Some(PrefabHandle(6)),
        }
    }

    pub fn get(&self, kind: EntityKind) -> Option<PrefabHandle> {
        match kind {
            EntityKind::Room => self.room,
            EntityKind::Corridor => self.corridor,
            EntityKind::VerticalCorridor => self.vertical_corridor,
            EntityKind::Enemy => self.enemy,
            EntityKind::Treasure => self.treasure,
            EntityKind::Barrier => None,
        }
    }

    pub fn require(&self, kind: EntityKind) -> Result<PrefabHandle, GenerationError> {
        self.get(kind).ok_or(GenerationError::MissingPrefab(kind))
    }

    /// Check that every template this config will instantiate is present.
    ///
    /// Occupant templates are only required when their spawn chance is
    /// non-zero.
    pub fn check(&self, config: &DungeonConfig) -> Result<(), GenerationError> {
        self.require(EntityKind::Room)?;
        self.require(EntityKind::Corridor)?;
        self.require(EntityKind::VerticalCorridor)?;
        if config.enemy_spawn_chance > 0.0 {
            self.require(EntityKind::Enemy)?;
        }
        if config.treasure_spawn_chance > 0.0 {
            self.require(EntityKind::Treasure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_pass_check() {
        assert!(PrefabSet::placeholders()
            .check(&DungeonConfig::default())
            .is_ok());
    }

    #[test]
    fn missing_room_is_fatal() {
        let prefabs = PrefabSet {
            room: None,
            ..PrefabSet::placeholders()
        };
        assert!(matches!(
            prefabs.check(&DungeonConfig::default()),
            Err(GenerationError::MissingPrefab(EntityKind::Room))
        ));
    }

    #[test]
    fn occupant_prefabs_only_required_when_used() {
        let prefabs = PrefabSet {
            enemy: None,
            treasure: None,
            ..PrefabSet::placeholders()
        };
        let quiet = DungeonConfig {
            enemy_spawn_chance: 0.0,
            treasure_spawn_chance: 0.0,
            ..DungeonConfig::default()
        };
        assert!(prefabs.check(&quiet).is_ok());
        assert!(matches!(
            prefabs.check(&DungeonConfig::default()),
            Err(GenerationError::MissingPrefab(EntityKind::Enemy))
        ));
    }

    #[test]
    fn barriers_have_no_template() {
        assert!(PrefabSet::placeholders().get(EntityKind::Barrier).is_none());
    }
}
