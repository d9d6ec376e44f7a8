use serde::{Deserialize, Serialize};

use crate::face::Face;

/// Chunk column coordinate. Height is not chunked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn from_voxel(pos: VoxelPos, chunk_width: i32) -> Self {
        Self {
            cx: pos.x.div_euclid(chunk_width),
            cz: pos.z.div_euclid(chunk_width),
        }
    }

    /// Chunk containing a continuous world-space point.
    #[inline]
    pub fn from_world_pos(p: [f32; 3], chunk_width: i32) -> Self {
        Self::from_voxel(VoxelPos::from_point(p), chunk_width)
    }

    /// World-space voxel at local (0, 0, 0).
    #[inline]
    pub fn origin(self, chunk_width: i32) -> VoxelPos {
        VoxelPos::new(self.cx * chunk_width, 0, self.cz * chunk_width)
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

/// Global voxel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn from_point(p: [f32; 3]) -> Self {
        Self::new(p[0].floor() as i32, p[1].floor() as i32, p[2].floor() as i32)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn neighbor(self, face: Face) -> Self {
        let (dx, dy, dz) = face.delta();
        self.offset(dx, dy, dz)
    }
}

impl From<(i32, i32, i32)> for VoxelPos {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<VoxelPos> for (i32, i32, i32) {
    fn from(value: VoxelPos) -> Self {
        (value.x, value.y, value.z)
    }
}
