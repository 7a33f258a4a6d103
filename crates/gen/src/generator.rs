use delve_common::EntityKind;
use delve_grid::CellState;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::barriers::BoundaryAttacher;
use crate::config::DungeonConfig;
use crate::corridors::CorridorConnector;
use crate::dungeon::{Dungeon, RoomId};
use crate::error::GenerationError;
use crate::layout::DungeonLayout;
use crate::placement::RoomPlacer;
use crate::populate::Populator;
use crate::prefab::PrefabSet;

/// Pipeline phase the generator is in, or last finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationState {
    Idle,
    Resetting,
    PlacingRooms,
    Connecting,
    Populating,
    Ready,
}

/// What one `generate` call produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub seed: u64,
    /// Random target drawn from `min_rooms..=max_rooms`.
    pub requested_rooms: usize,
    /// Rooms actually placed; lower than requested when placement ran dry.
    pub placed_rooms: usize,
    pub tree_edges: usize,
    pub loop_edges: usize,
    pub vertical_links: usize,
    pub corridor_cells: usize,
    pub barriers: usize,
    pub enemies: usize,
    pub treasures: usize,
    /// Entities released from the previous pass.
    pub despawned: usize,
}

/// Drives reset → placement → connection → barriers → population.
///
/// Every call to [`generate`](Self::generate) rebuilds the whole dungeon from
/// scratch. Invalid configuration and missing prefabs are reported before any
/// teardown, so a failed call leaves the previous dungeon in place.
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    config: DungeonConfig,
    prefabs: PrefabSet,
    dungeon: Dungeon,
    state: GenerationState,
    last_seed: Option<u64>,
}

impl DungeonGenerator {
    pub fn new(config: DungeonConfig, prefabs: PrefabSet) -> Self {
        let dungeon = Dungeon::new(0, config.cell_size, config.origin);
        Self {
            config,
            prefabs,
            dungeon,
            state: GenerationState::Idle,
            last_seed: None,
        }
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// Replace the config used by subsequent runs.
    pub fn set_config(&mut self, config: DungeonConfig) {
        self.config = config;
    }

    pub fn prefabs(&self) -> &PrefabSet {
        &self.prefabs
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn dungeon_mut(&mut self) -> &mut Dungeon {
        &mut self.dungeon
    }

    /// Seed of the last completed run.
    pub fn seed(&self) -> Option<u64> {
        self.last_seed
    }

    pub fn room_count(&self) -> usize {
        self.dungeon.room_count()
    }

    /// Generate with the configured seed, or a fresh one when none is set.
    pub fn generate(&mut self) -> Result<GenerationReport, GenerationError> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.generate_with_seed(seed)
    }

    pub fn generate_with_seed(&mut self, seed: u64) -> Result<GenerationReport, GenerationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.run(seed, &mut rng)
    }

    fn run(&mut self, seed: u64, rng: &mut impl Rng) -> Result<GenerationReport, GenerationError> {
        let _span = tracing::info_span!("generate", seed).entered();
        self.config.validate()?;
        self.prefabs.check(&self.config)?;
        let cfg = &self.config;
        let placer = RoomPlacer::new(self.prefabs.require(EntityKind::Room)?)
            .with_trials(cfg.placement_trials);
        let connector = CorridorConnector::new(
            self.prefabs.require(EntityKind::Corridor)?,
            self.prefabs.require(EntityKind::VerticalCorridor)?,
        )
        .with_loop_edge_ratio(cfg.loop_edge_ratio);
        let attacher = BoundaryAttacher::new(cfg.barrier_edge_offset, cfg.barrier_thickness);
        let populator = Populator::new(
            cfg.enemy_spawn_chance,
            cfg.treasure_spawn_chance,
            self.prefabs.get(EntityKind::Enemy),
            self.prefabs.get(EntityKind::Treasure),
        );
        let mut report = GenerationReport {
            seed,
            ..GenerationReport::default()
        };

        self.state = GenerationState::Resetting;
        report.despawned = self
            .dungeon
            .reset(cfg.grid_size, cfg.cell_size, cfg.origin);

        self.state = GenerationState::PlacingRooms;
        report.requested_rooms = rng.gen_range(cfg.min_rooms..=cfg.max_rooms) as usize;
        placer.place_room_at_center(&mut self.dungeon);
        for _ in 1..report.requested_rooms {
            placer.try_place_room(&mut self.dungeon, rng);
        }
        report.placed_rooms = self.dungeon.room_count();
        if report.placed_rooms < report.requested_rooms {
            tracing::warn!(
                requested = report.requested_rooms,
                placed = report.placed_rooms,
                "placed fewer rooms than requested"
            );
        }

        self.state = GenerationState::Connecting;
        let stats = connector.connect_rooms(&mut self.dungeon, rng);
        report.tree_edges = stats.tree_edges;
        report.loop_edges = stats.loop_edges;
        report.vertical_links = connector.connect_vertical_rooms(&mut self.dungeon);
        report.corridor_cells = self.dungeon.grid().cells_in_state(CellState::Corridor).len();
        if cfg.enable_room_barriers {
            for i in 0..self.dungeon.room_count() {
                report.barriers += attacher.attach(&mut self.dungeon, RoomId(i));
            }
        }

        self.state = GenerationState::Populating;
        let population = populator.populate(&mut self.dungeon, rng);
        report.enemies = population.enemies;
        report.treasures = population.treasures;

        self.state = GenerationState::Ready;
        self.last_seed = Some(seed);
        tracing::info!(
            rooms = report.placed_rooms,
            corridors = report.corridor_cells,
            loops = report.loop_edges,
            vertical = report.vertical_links,
            enemies = report.enemies,
            treasures = report.treasures,
            "dungeon ready"
        );
        Ok(report)
    }

    /// Tear the dungeon down without building a new one. The emptied grid
    /// keeps the dimensions and origin of the dungeon it replaces.
    pub fn clear(&mut self) -> usize {
        let grid = self.dungeon.grid();
        let (size, cell_size) = (grid.size(), grid.cell_size());
        let origin = self.dungeon.origin();
        let removed = self.dungeon.reset(size, cell_size, origin);
        self.state = GenerationState::Idle;
        self.last_seed = None;
        removed
    }

    /// Delete one room's barriers, leaving the room in place.
    pub fn remove_barriers(&mut self, room: RoomId) -> usize {
        BoundaryAttacher::new(self.config.barrier_edge_offset, self.config.barrier_thickness)
            .remove_barriers(&mut self.dungeon, room)
    }

    /// Spawn point for the player: the first room's world position, or the
    /// origin the current dungeon was built around when no room exists.
    pub fn first_room_position(&self) -> Vec3 {
        self.dungeon
            .rooms()
            .first()
            .map(|r| r.position())
            .unwrap_or(self.dungeon.origin())
    }

    /// Snapshot of the current dungeon; `None` until a run has completed.
    pub fn layout(&self) -> Option<DungeonLayout> {
        self.last_seed
            .map(|seed| DungeonLayout::capture(&self.dungeon, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn config() -> DungeonConfig {
        DungeonConfig {
            grid_size: 5,
            cell_size: 0.2,
            min_rooms: 4,
            max_rooms: 8,
            seed: Some(1234),
            ..DungeonConfig::default()
        }
    }

    #[test]
    fn starts_idle_with_origin_spawn() {
        let g = DungeonGenerator::new(config(), PrefabSet::placeholders());
        assert_eq!(g.state(), GenerationState::Idle);
        assert_eq!(g.room_count(), 0);
        assert_eq!(g.first_room_position(), Vec3::ZERO);
        assert!(g.layout().is_none());
    }

    #[test]
    fn generate_reaches_ready() {
        let mut g = DungeonGenerator::new(config(), PrefabSet::placeholders());
        let report = g.generate().unwrap();
        assert_eq!(g.state(), GenerationState::Ready);
        assert_eq!(report.seed, 1234);
        assert_eq!(report.placed_rooms, g.room_count());
        assert!((4..=8).contains(&report.requested_rooms));
        assert!(report.placed_rooms <= report.requested_rooms);
        assert!(g.dungeon().is_fully_connected());
    }

    #[test]
    fn first_room_is_at_grid_centre() {
        let mut g = DungeonGenerator::new(config(), PrefabSet::placeholders());
        g.generate().unwrap();
        let grid = g.dungeon().grid();
        assert_eq!(g.dungeon().rooms()[0].coord, grid.center());
        assert_eq!(g.first_room_position(), grid.grid_to_world(grid.center()));
    }

    #[test]
    fn invalid_config_keeps_previous_dungeon() {
        let mut g = DungeonGenerator::new(config(), PrefabSet::placeholders());
        g.generate().unwrap();
        let rooms = g.room_count();

        g.set_config(DungeonConfig {
            min_rooms: 9,
            max_rooms: 2,
            ..config()
        });
        let err = g.generate().unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidConfig(ConfigError::Invalid { .. })
        ));
        assert_eq!(g.room_count(), rooms);
        assert_eq!(g.state(), GenerationState::Ready);
    }

    #[test]
    fn missing_prefab_fails_generation() {
        let prefabs = PrefabSet {
            corridor: None,
            ..PrefabSet::placeholders()
        };
        let mut g = DungeonGenerator::new(config(), prefabs);
        assert!(matches!(
            g.generate(),
            Err(GenerationError::MissingPrefab(EntityKind::Corridor))
        ));
        assert_eq!(g.state(), GenerationState::Idle);
        assert!(g.dungeon().scene().is_empty());
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut g = DungeonGenerator::new(config(), PrefabSet::placeholders());
        g.generate().unwrap();
        assert!(g.clear() > 0);
        assert_eq!(g.state(), GenerationState::Idle);
        assert!(g.dungeon().scene().is_empty());
        assert_eq!(g.dungeon().grid().occupied_count(), 0);
        assert_eq!(g.first_room_position(), Vec3::ZERO);
    }

    #[test]
    fn barriers_toggle() {
        let mut g = DungeonGenerator::new(
            DungeonConfig {
                enable_room_barriers: false,
                ..config()
            },
            PrefabSet::placeholders(),
        );
        let report = g.generate().unwrap();
        assert_eq!(report.barriers, 0);
        assert_eq!(g.dungeon().scene().count_kind(EntityKind::Barrier), 0);

        g.set_config(config());
        let report = g.generate().unwrap();
        assert_eq!(report.barriers, report.placed_rooms * 5);
    }

    #[test]
    fn remove_barriers_through_generator() {
        let mut g = DungeonGenerator::new(config(), PrefabSet::placeholders());
        g.generate().unwrap();
        assert_eq!(g.remove_barriers(RoomId(0)), 5);
        assert!(g.dungeon().rooms()[0].barriers().is_empty());
        assert_eq!(g.room_count(), g.dungeon().scene().count_kind(EntityKind::Room));
    }

    #[test]
    fn clear_and_spawn_follow_the_built_dungeon() {
        let origin = Vec3::new(4.0, 1.0, -2.0);
        let mut g = DungeonGenerator::new(
            DungeonConfig { origin, ..config() },
            PrefabSet::placeholders(),
        );
        g.generate().unwrap();

        // A new config only takes effect on the next generate.
        g.set_config(DungeonConfig {
            grid_size: 9,
            cell_size: 3.0,
            origin: Vec3::ZERO,
            ..config()
        });
        g.clear();
        let grid = g.dungeon().grid();
        assert_eq!(grid.size(), 5);
        assert_eq!(grid.cell_size(), 0.2);
        assert_eq!(g.dungeon().origin(), origin);
        assert_eq!(g.first_room_position(), origin);

        g.generate().unwrap();
        assert_eq!(g.dungeon().grid().size(), 9);
        assert_eq!(g.dungeon().origin(), Vec3::ZERO);
    }

    #[test]
    fn unseeded_runs_record_their_seed() {
        let mut g = DungeonGenerator::new(
            DungeonConfig {
                seed: None,
                ..config()
            },
            PrefabSet::placeholders(),
        );
        let report = g.generate().unwrap();
        assert_eq!(g.seed(), Some(report.seed));
        assert_eq!(g.layout().unwrap().seed, report.seed);
    }
}
