//! Shared types used across the delve workspace.
//!
//! # Invariants
//! - `GridCoord` is the only key into grid occupancy state.
//! - Every scene entity carries exactly one `EntityKind`.

mod coord;
mod types;

pub use coord::GridCoord;
pub use types::{EntityId, EntityKind, PrefabHandle, Transform};
