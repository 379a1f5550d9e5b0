//! Pose — a rigid 3D transform.

use serde::{Deserialize, Serialize};

/// A 4x4 rigid transform stored column-major (`columns[3]` holds the
/// translation), matching the layout tracking runtimes hand out.
///
/// Equality is exact-value comparison of all sixteen components. Two poses
/// that are geometrically identical but differ by a rounding error are NOT
/// equal; identity comparisons go through [`AnchorId`](super::AnchorId).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub columns: [[f32; 4]; 4],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        columns: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_columns(columns: [[f32; 4]; 4]) -> Self {
        Self { columns }
    }

    /// Pure translation, identity rotation.
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut pose = Self::IDENTITY;
        pose.columns[3] = [x, y, z, 1.0];
        pose
    }

    pub fn translation(&self) -> [f32; 3] {
        let [x, y, z, _] = self.columns[3];
        [x, y, z]
    }

    /// Euclidean distance between the two translations. Rotation is ignored.
    pub fn distance_to(&self, other: &Pose) -> f32 {
        let [ax, ay, az] = self.translation();
        let [bx, by, bz] = other.translation();
        let (dx, dy, dz) = (ax - bx, ay - by, az - bz);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Column-major flattening, the order the codec writes.
    pub fn to_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (c, column) in self.columns.iter().enumerate() {
            out[c * 4..c * 4 + 4].copy_from_slice(column);
        }
        out
    }

    pub fn from_array(values: [f32; 16]) -> Self {
        let mut columns = [[0.0; 4]; 4];
        for (c, column) in columns.iter_mut().enumerate() {
            column.copy_from_slice(&values[c * 4..c * 4 + 4]);
        }
        Self { columns }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
