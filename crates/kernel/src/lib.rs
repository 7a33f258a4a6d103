//! Scene kernel: the registry of every object a generation pass instantiates.
//!
//! # Invariants
//! - All scene mutations flow through explicit operations and are logged.
//! - Iteration order is deterministic (BTreeMap keyed by counter-derived ids).

pub mod scene;

pub use scene::{EntityData, Scene, SceneEvent};
