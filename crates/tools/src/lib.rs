//! Developer tooling: read-only dungeon inspection and structural validation.
//!
//! # Invariants
//! - Tools never mutate the dungeon they inspect.

pub mod inspector;

pub use inspector::{DungeonInspector, DungeonSummary, RoomInfo, ValidationReport};

pub fn crate_info() -> &'static str {
    "delve-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
