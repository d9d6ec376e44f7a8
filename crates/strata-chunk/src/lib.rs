//! Chunk voxel grid, terrain population, and queued edit application.
#![forbid(unsafe_code)]

use strata_blocks::{AIR, BlockId};
use strata_edit::VoxelEdit;
use strata_world::{BiomeGenerator, ChunkCoord, VoxelPos, WorldDims};

/// One grid cell: block id plus the light arriving at it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelState {
    pub id: BlockId,
    /// Global light percent in `[0, 1]`.
    pub light: f32,
}

impl VoxelState {
    pub const AIR: VoxelState = VoxelState { id: AIR, light: 0.0 };

    #[inline]
    pub const fn new(id: BlockId) -> Self {
        Self { id, light: 0.0 }
    }

    #[inline]
    pub const fn with_light(id: BlockId, light: f32) -> Self {
        Self { id, light }
    }
}

impl Default for VoxelState {
    fn default() -> Self {
        Self::AIR
    }
}

/// Cross-chunk voxel reads. `None` means the position cannot be resolved.
pub trait VoxelLookup {
    fn voxel_state_at(&self, pos: VoxelPos) -> Option<VoxelState>;
}

/// Dense `W x H x W` grid for one chunk column.
#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<VoxelState>,
}

impl ChunkBuf {
    pub fn new_empty(coord: ChunkCoord, dims: &WorldDims) -> Self {
        Self {
            coord,
            width: dims.chunk_width,
            height: dims.chunk_height,
            cells: vec![VoxelState::AIR; dims.chunk_volume()],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.width + x) * self.width + z
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> VoxelState {
        self.cells[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local_id(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        let i = self.idx(x, y, z);
        self.cells[i].id = id;
    }

    #[inline]
    pub fn light_local(&self, x: usize, y: usize, z: usize) -> f32 {
        self.cells[self.idx(x, y, z)].light
    }

    #[inline]
    pub fn set_light_local(&mut self, x: usize, y: usize, z: usize, light: f32) {
        let i = self.idx(x, y, z);
        self.cells[i].light = light;
    }

    /// Signed local coordinates inside `[0, W) x [0, H) x [0, W)`.
    #[inline]
    pub fn in_bounds_local(&self, x: i32, y: i32, z: i32) -> bool {
        let w = self.width as i32;
        x >= 0 && x < w && y >= 0 && y < self.height as i32 && z >= 0 && z < w
    }

    #[inline]
    pub fn origin(&self) -> VoxelPos {
        self.coord.origin(self.width as i32)
    }

    #[inline]
    pub fn local_of(&self, pos: VoxelPos) -> Option<(usize, usize, usize)> {
        let o = self.origin();
        let (lx, ly, lz) = (pos.x - o.x, pos.y, pos.z - o.z);
        if !self.in_bounds_local(lx, ly, lz) {
            return None;
        }
        Some((lx as usize, ly as usize, lz as usize))
    }

    #[inline]
    pub fn contains_world(&self, pos: VoxelPos) -> bool {
        self.local_of(pos).is_some()
    }

    #[inline]
    pub fn get_world(&self, pos: VoxelPos) -> Option<VoxelState> {
        let (x, y, z) = self.local_of(pos)?;
        Some(self.get_local(x, y, z))
    }

    /// Writes one cell by global position; `false` if it lies outside this chunk.
    pub fn set_world_id(&mut self, pos: VoxelPos, id: BlockId) -> bool {
        match self.local_of(pos) {
            Some((x, y, z)) => {
                self.set_local_id(x, y, z, id);
                true
            }
            None => false,
        }
    }

    /// Applies edits in order. Edits for other chunks are skipped.
    pub fn apply_edits(&mut self, edits: impl IntoIterator<Item = VoxelEdit>) -> usize {
        let mut applied = 0;
        for e in edits {
            if self.set_world_id(e.pos, e.block) {
                applied += 1;
            } else {
                log::warn!(
                    "edit at ({}, {}, {}) routed to chunk ({}, {}) outside its bounds",
                    e.pos.x,
                    e.pos.y,
                    e.pos.z,
                    self.coord.cx,
                    self.coord.cz
                );
            }
        }
        applied
    }

    pub fn from_cells_local(
        coord: ChunkCoord,
        width: usize,
        height: usize,
        cells: Vec<VoxelState>,
    ) -> Self {
        let mut c = cells;
        let expect = width * height * width;
        if c.len() != expect {
            c.resize(expect, VoxelState::AIR);
        }
        ChunkBuf {
            coord,
            width,
            height,
            cells: c,
        }
    }
}

impl VoxelLookup for ChunkBuf {
    fn voxel_state_at(&self, pos: VoxelPos) -> Option<VoxelState> {
        self.get_world(pos)
    }
}

#[derive(Clone, Debug)]
pub struct ChunkGenerateResult {
    pub buf: ChunkBuf,
    /// Surface cells where a tree should be expanded.
    pub tree_sites: Vec<VoxelPos>,
}

/// Fills a chunk grid from the generator, visiting cells y, then x, then z.
pub fn generate_chunk_buffer(generator: &BiomeGenerator, coord: ChunkCoord) -> ChunkGenerateResult {
    let dims = generator.dims;
    let mut buf = ChunkBuf::new_empty(coord, &dims);
    let origin = buf.origin();
    let mut tree_sites = Vec::new();
    for y in 0..dims.chunk_height {
        for x in 0..dims.chunk_width {
            for z in 0..dims.chunk_width {
                let pos = origin.offset(x as i32, y as i32, z as i32);
                let s = generator.sample(pos);
                buf.set_local_id(x, y, z, s.block);
                if let Some(site) = s.tree {
                    tree_sites.push(site);
                }
            }
        }
    }
    ChunkGenerateResult { buf, tree_sites }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blocks::BlockRegistry;
    use strata_world::worldgen::{WorldGenConfig, WorldGenParams};

    #[test]
    fn index_is_y_major_then_x_then_z() {
        let buf = ChunkBuf::new_empty(ChunkCoord::new(0, 0), &WorldDims::new(4, 8, 2));
        assert_eq!(buf.idx(0, 0, 1), 1);
        assert_eq!(buf.idx(1, 0, 0), 4);
        assert_eq!(buf.idx(0, 1, 0), 16);
        assert_eq!(buf.cells.len(), 128);
    }

    #[test]
    fn world_positions_map_through_origin() {
        let mut buf = ChunkBuf::new_empty(ChunkCoord::new(2, 1), &WorldDims::new(4, 8, 4));
        assert_eq!(buf.origin(), VoxelPos::new(8, 0, 4));
        assert!(buf.set_world_id(VoxelPos::new(9, 3, 7), 5));
        assert_eq!(buf.get_local(1, 3, 3).id, 5);
        assert!(!buf.set_world_id(VoxelPos::new(12, 3, 7), 5));
        assert!(!buf.set_world_id(VoxelPos::new(9, 8, 7), 5));
        assert_eq!(buf.get_world(VoxelPos::new(7, 0, 4)), None);
    }

    #[test]
    fn later_edits_win() {
        let mut buf = ChunkBuf::new_empty(ChunkCoord::new(0, 0), &WorldDims::new(4, 8, 4));
        let p = VoxelPos::new(1, 1, 1);
        let n = buf.apply_edits([
            VoxelEdit::new(p, 6),
            VoxelEdit::new(VoxelPos::new(40, 1, 1), 6),
            VoxelEdit::new(p, 11),
        ]);
        assert_eq!(n, 2);
        assert_eq!(buf.get_world(p).unwrap().id, 11);
    }

    #[test]
    fn generated_chunk_matches_generator() {
        let reg = BlockRegistry::builtin();
        let params = WorldGenParams::from_config(&WorldGenConfig::default(), &reg).unwrap();
        let generator = BiomeGenerator::new(5, WorldDims::new(8, 96, 4), params);
        let res = generate_chunk_buffer(&generator, ChunkCoord::new(1, 2));
        let buf = &res.buf;
        for (x, y, z) in [(0, 0, 0), (7, 40, 3), (3, 95, 7), (5, 50, 5)] {
            let pos = buf.origin().offset(x, y, z);
            let got = buf.get_local(x as usize, y as usize, z as usize);
            assert_eq!(got.id, generator.voxel_type_at(pos));
            assert_eq!(got.light, 0.0);
        }
        for site in &res.tree_sites {
            assert!(buf.contains_world(*site));
            assert_eq!(site.y, generator.terrain_height(site.x, site.z));
        }
    }
}
