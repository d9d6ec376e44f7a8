use serde::Deserialize;

use crate::coords::{ChunkCoord, VoxelPos};

pub const CHUNK_WIDTH: usize = 16;
pub const CHUNK_HEIGHT: usize = 128;
pub const WORLD_SIZE_IN_CHUNKS: usize = 100;
pub const VIEW_DISTANCE_IN_CHUNKS: i32 = 5;
pub const TEXTURE_ATLAS_SIZE_IN_BLOCKS: u16 = 16;

pub const LIGHT_FALLOFF: f32 = 0.08;
pub const MIN_LIGHT_LEVEL: f32 = 0.15;
pub const MAX_LIGHT_LEVEL: f32 = 0.8;

/// Chunk and world extents. Every bound is `[0, size)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct WorldDims {
    #[serde(default = "default_chunk_width")]
    pub chunk_width: usize,
    #[serde(default = "default_chunk_height")]
    pub chunk_height: usize,
    #[serde(default = "default_world_size")]
    pub world_size_in_chunks: usize,
}

fn default_chunk_width() -> usize {
    CHUNK_WIDTH
}
fn default_chunk_height() -> usize {
    CHUNK_HEIGHT
}
fn default_world_size() -> usize {
    WORLD_SIZE_IN_CHUNKS
}

impl Default for WorldDims {
    fn default() -> Self {
        Self {
            chunk_width: CHUNK_WIDTH,
            chunk_height: CHUNK_HEIGHT,
            world_size_in_chunks: WORLD_SIZE_IN_CHUNKS,
        }
    }
}

impl WorldDims {
    pub const fn new(chunk_width: usize, chunk_height: usize, world_size_in_chunks: usize) -> Self {
        Self {
            chunk_width,
            chunk_height,
            world_size_in_chunks,
        }
    }

    #[inline]
    pub fn world_size_in_voxels(&self) -> usize {
        self.chunk_width * self.world_size_in_chunks
    }

    /// Cells in one chunk grid.
    #[inline]
    pub fn chunk_volume(&self) -> usize {
        self.chunk_width * self.chunk_height * self.chunk_width
    }

    #[inline]
    pub fn chunk_in_world(&self, coord: ChunkCoord) -> bool {
        let n = self.world_size_in_chunks as i32;
        coord.cx >= 0 && coord.cx < n && coord.cz >= 0 && coord.cz < n
    }

    #[inline]
    pub fn voxel_in_world(&self, pos: VoxelPos) -> bool {
        let w = self.world_size_in_voxels() as i32;
        let h = self.chunk_height as i32;
        pos.x >= 0 && pos.x < w && pos.y >= 0 && pos.y < h && pos.z >= 0 && pos.z < w
    }

    #[inline]
    pub fn chunk_of(&self, pos: VoxelPos) -> ChunkCoord {
        ChunkCoord::from_voxel(pos, self.chunk_width as i32)
    }

    /// Local cell of `pos` inside its owning chunk.
    #[inline]
    pub fn local_of(&self, pos: VoxelPos) -> (usize, usize, usize) {
        let w = self.chunk_width as i32;
        (
            pos.x.rem_euclid(w) as usize,
            pos.y as usize,
            pos.z.rem_euclid(w) as usize,
        )
    }

    /// Row-major slot of a chunk in the world grid.
    #[inline]
    pub fn slot_index(&self, coord: ChunkCoord) -> Option<usize> {
        if !self.chunk_in_world(coord) {
            return None;
        }
        Some(coord.cx as usize * self.world_size_in_chunks + coord.cz as usize)
    }
}
