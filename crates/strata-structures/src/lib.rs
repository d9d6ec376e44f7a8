//! Structure expansion: turns placement requests into ordered edit batches.
#![forbid(unsafe_code)]

use strata_blocks::BlockId;
use strata_edit::{EditBatch, VoxelEdit};
use strata_world::worldgen::TreeParams;
use strata_world::{NoiseSampler, VoxelPos};

/// Canopy spans `-CANOPY_RADIUS..=CANOPY_RADIUS` on x and z.
pub const CANOPY_RADIUS: i32 = 3;
pub const CANOPY_HEIGHT: i32 = 7;

const TRUNK_NOISE_OFFSET: f32 = 250.0;
const TRUNK_NOISE_SCALE: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeBlocks {
    pub trunk: BlockId,
    pub leaves: BlockId,
}

impl From<&TreeParams> for TreeBlocks {
    fn from(p: &TreeParams) -> Self {
        Self {
            trunk: p.trunk_block,
            leaves: p.leaves_block,
        }
    }
}

/// Tree height for a tree rooted at `base`, at least `min_trunk`. The trunk
/// fills the cells below the canopy, one fewer than the height.
pub fn trunk_height(noise: &NoiseSampler, base: VoxelPos, min_trunk: i32, max_trunk: i32) -> i32 {
    let n = noise.get_2d(
        base.x as f32,
        base.y as f32,
        TRUNK_NOISE_OFFSET,
        TRUNK_NOISE_SCALE,
    );
    let h = (max_trunk as f32 * n).floor() as i32;
    h.max(min_trunk).max(1)
}

/// Trunk cells bottom-up, then the canopy box in x, y, z order. The canopy's
/// lowest layer sits at `base.y + height`, directly on the trunk.
///
/// Later edits overwrite earlier ones at the same cell when applied in order.
pub fn build_tree(
    noise: &NoiseSampler,
    base: VoxelPos,
    min_trunk: i32,
    max_trunk: i32,
    blocks: TreeBlocks,
) -> EditBatch {
    let height = trunk_height(noise, base, min_trunk, max_trunk);
    let side = 2 * CANOPY_RADIUS + 1;
    let mut out = Vec::with_capacity(height as usize - 1 + (side * side * CANOPY_HEIGHT) as usize);
    for i in 1..height {
        out.push(VoxelEdit::new(base.offset(0, i, 0), blocks.trunk));
    }
    let crown = base.y + height;
    for x in -CANOPY_RADIUS..=CANOPY_RADIUS {
        for y in 0..CANOPY_HEIGHT {
            for z in -CANOPY_RADIUS..=CANOPY_RADIUS {
                out.push(VoxelEdit::new(
                    VoxelPos::new(base.x + x, crown + y, base.z + z),
                    blocks.leaves,
                ));
            }
        }
    }
    out
}

pub fn build_tree_with(noise: &NoiseSampler, base: VoxelPos, params: &TreeParams) -> EditBatch {
    build_tree(
        noise,
        base,
        params.min_height,
        params.max_height,
        TreeBlocks::from(params),
    )
}
