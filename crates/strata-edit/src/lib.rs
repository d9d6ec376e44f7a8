//! Voxel edit records and the deferred modification queue.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use strata_blocks::BlockId;
use strata_world::{ChunkCoord, Face, VoxelPos, WorldDims};

/// One pending cell write in global coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoxelEdit {
    pub pos: VoxelPos,
    pub block: BlockId,
}

impl VoxelEdit {
    #[inline]
    pub const fn new(pos: VoxelPos, block: BlockId) -> Self {
        Self { pos, block }
    }
}

/// Edits that must be applied in order, e.g. one tree.
pub type EditBatch = Vec<VoxelEdit>;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModificationStats {
    pub batches: usize,
    pub edits: usize,
}

/// FIFO of edit batches that may target chunks not created yet.
#[derive(Default, Debug)]
pub struct ModificationQueue {
    batches: VecDeque<EditBatch>,
    edits: usize,
}

impl ModificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&mut self, batch: EditBatch) {
        if batch.is_empty() {
            return;
        }
        self.edits += batch.len();
        self.batches.push_back(batch);
    }

    /// Takes every queued batch, oldest first.
    pub fn drain_all(&mut self) -> Vec<EditBatch> {
        self.edits = 0;
        self.batches.drain(..).collect()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn stats(&self) -> ModificationStats {
        ModificationStats {
            batches: self.batches.len(),
            edits: self.edits,
        }
    }
}

/// Chunks other than the owner whose boundary faces touch `pos`.
///
/// Only face neighbours that leave the owning chunk horizontally and stay
/// inside the world are reported; height is not chunked.
pub fn affected_neighbor_chunks(dims: &WorldDims, pos: VoxelPos) -> Vec<ChunkCoord> {
    let owner = dims.chunk_of(pos);
    let mut out: Vec<ChunkCoord> = Vec::new();
    for face in Face::ALL {
        let n = pos.neighbor(face);
        if !dims.voxel_in_world(n) {
            continue;
        }
        let c = dims.chunk_of(n);
        if c != owner && !out.contains(&c) {
            out.push(c);
        }
    }
    out
}
