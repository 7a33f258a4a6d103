use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer cell address in the dungeon lattice.
///
/// Components are signed so that neighbour probes may step outside the grid;
/// the grid itself decides what out-of-bounds means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    /// The six axis-aligned unit steps.
    pub const AXIS_STEPS: [(i32, i32, i32); 6] = [
        (1, 0, 0),
        (-1, 0, 0),
        (0, 1, 0),
        (0, -1, 0),
        (0, 0, 1),
        (0, 0, -1),
    ];

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn neighbors(&self) -> [GridCoord; 6] {
        Self::AXIS_STEPS.map(|(dx, dy, dz)| self.offset(dx, dy, dz))
    }

    /// Euclidean distance in cell units.
    pub fn distance(&self, other: GridCoord) -> f32 {
        (self.as_ivec3() - other.as_ivec3()).as_vec3().length()
    }

    pub fn manhattan(&self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for GridCoord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
