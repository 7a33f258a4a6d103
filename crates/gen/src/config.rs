use delve_grid::MAX_GRID_SIZE;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Default cap on random cell draws per `try_place_room` call.
pub const DEFAULT_PLACEMENT_TRIALS: u32 = 100;
/// Default share of the room count added as loop edges after the spanning tree.
pub const DEFAULT_LOOP_EDGE_RATIO: f32 = 0.3;
/// Upper bound on `loop_edge_ratio`.
pub const MAX_LOOP_EDGE_RATIO: f32 = 4.0;

/// Generation parameters, supplied once per `generate` call.
///
/// Every field has a default so partial YAML/JSON files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Lattice edge length in cells.
    pub grid_size: u32,
    /// World-space size of one cell.
    pub cell_size: f32,
    /// Inclusive range for the random room-count target.
    pub min_rooms: u32,
    pub max_rooms: u32,
    pub enemy_spawn_chance: f64,
    pub treasure_spawn_chance: f64,
    pub enable_room_barriers: bool,
    /// Fixed seed. `None` draws a fresh seed for every run.
    pub seed: Option<u64>,
    pub placement_trials: u32,
    pub loop_edge_ratio: f32,
    /// Inset of each barrier from the room edge, in world units.
    pub barrier_edge_offset: f32,
    pub barrier_thickness: f32,
    /// World position of the dungeon root; rooms are laid out around it.
    pub origin: Vec3,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            cell_size: 1.0,
            min_rooms: 5,
            max_rooms: 10,
            enemy_spawn_chance: 0.5,
            treasure_spawn_chance: 0.3,
            enable_room_barriers: true,
            seed: None,
            placement_trials: DEFAULT_PLACEMENT_TRIALS,
            loop_edge_ratio: DEFAULT_LOOP_EDGE_RATIO,
            barrier_edge_offset: 0.02,
            barrier_thickness: 0.05,
            origin: Vec3::ZERO,
        }
    }
}

impl DungeonConfig {
    /// Load a config from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "loaded dungeon config");
        Ok(config)
    }

    /// Reject settings that downstream phases assume never happen.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(invalid(
                "grid_size",
                format!("{} is outside [1, {MAX_GRID_SIZE}]", self.grid_size),
            ));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(invalid("cell_size", "must be a positive number"));
        }
        if self.min_rooms == 0 {
            return Err(invalid("min_rooms", "must be at least 1"));
        }
        if self.min_rooms > self.max_rooms {
            return Err(invalid(
                "min_rooms",
                format!("{} exceeds max_rooms {}", self.min_rooms, self.max_rooms),
            ));
        }
        for (field, p) in [
            ("enemy_spawn_chance", self.enemy_spawn_chance),
            ("treasure_spawn_chance", self.treasure_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, format!("{p} is outside [0, 1]")));
            }
        }
        if self.placement_trials == 0 {
            return Err(invalid("placement_trials", "must be at least 1"));
        }
        if !(0.0..=MAX_LOOP_EDGE_RATIO).contains(&self.loop_edge_ratio) {
            return Err(invalid(
                "loop_edge_ratio",
                format!("{} is outside [0, {MAX_LOOP_EDGE_RATIO}]", self.loop_edge_ratio),
            ));
        }
        if !(self.barrier_edge_offset.is_finite() && self.barrier_edge_offset >= 0.0) {
            return Err(invalid("barrier_edge_offset", "must be zero or positive"));
        }
        if !(self.barrier_thickness.is_finite() && self.barrier_thickness > 0.0) {
            return Err(invalid("barrier_thickness", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
