use std::sync::Arc;

use strata_blocks::{AIR, BlockId};

use crate::coords::VoxelPos;
use crate::noise::NoiseSampler;
use crate::voxel_data::WorldDims;
use crate::worldgen::WorldGenParams;

/// Generated block plus an optional tree request rooted at this surface cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelSample {
    pub block: BlockId,
    pub tree: Option<VoxelPos>,
}

impl VoxelSample {
    #[inline]
    pub const fn air() -> Self {
        Self {
            block: AIR,
            tree: None,
        }
    }
}

/// Column-based terrain, lode, and tree-siting rules for one seed.
#[derive(Clone, Debug)]
pub struct BiomeGenerator {
    pub seed: i32,
    pub dims: WorldDims,
    params: Arc<WorldGenParams>,
    noise: NoiseSampler,
}

impl BiomeGenerator {
    pub fn new(seed: i32, dims: WorldDims, params: WorldGenParams) -> Self {
        Self {
            seed,
            dims,
            params: Arc::new(params),
            noise: NoiseSampler::new(seed, dims.chunk_width),
        }
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        &self.params
    }

    #[inline]
    pub fn noise(&self) -> &NoiseSampler {
        &self.noise
    }

    /// Surface y of column (x, z), kept inside `[1, chunk_height)`.
    pub fn terrain_height(&self, x: i32, z: i32) -> i32 {
        let p = &self.params;
        let n = self.noise.get_2d(x as f32, z as f32, 0.0, p.terrain_scale);
        let h = (p.terrain_height * n).floor() as i32 + p.solid_ground_height;
        // Not `clamp`: a one-voxel-tall world would invert the range.
        h.min(self.dims.chunk_height as i32 - 1).max(1)
    }

    /// Zone gate then placement gate.
    pub fn tree_sited_at(&self, x: i32, z: i32) -> bool {
        let t = &self.params.trees;
        let (fx, fz) = (x as f32, z as f32);
        self.noise.get_2d(fx, fz, 0.0, t.zone_scale) > t.zone_threshold
            && self.noise.get_2d(fx, fz, 0.0, t.placement_scale) > t.placement_threshold
    }

    #[inline]
    pub fn voxel_type_at(&self, pos: VoxelPos) -> BlockId {
        self.sample(pos).block
    }

    pub fn sample(&self, pos: VoxelPos) -> VoxelSample {
        if !self.dims.voxel_in_world(pos) {
            return VoxelSample::air();
        }
        let p = &self.params;
        if pos.y == 0 {
            return VoxelSample {
                block: p.floor_block,
                tree: None,
            };
        }

        let th = self.terrain_height(pos.x, pos.z);
        let mut block = if pos.y > th {
            AIR
        } else if pos.y == th {
            p.surface_block
        } else if pos.y > th - p.subsoil_depth {
            p.subsoil_block
        } else {
            p.base_block
        };

        if block == p.base_block {
            for lode in p.lodes.iter() {
                if lode.in_band(pos.y)
                    && self.noise.get_3d(pos, lode.noise_offset, lode.scale) > lode.threshold
                {
                    block = lode.block;
                }
            }
        }

        let tree = (pos.y == th && self.tree_sited_at(pos.x, pos.z)).then_some(pos);
        VoxelSample { block, tree }
    }
}
