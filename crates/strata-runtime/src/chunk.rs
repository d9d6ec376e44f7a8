use std::collections::VecDeque;

use strata_blocks::{BlockId, BlockRegistry};
use strata_chunk::{ChunkBuf, VoxelLookup, VoxelState, generate_chunk_buffer};
use strata_edit::{VoxelEdit, affected_neighbor_chunks};
use strata_lighting::{LightStats, LightingParams, compute_light};
use strata_mesh_cpu::{ChunkMesh, MeshOptions, extract_mesh};
use strata_world::{BiomeGenerator, ChunkCoord, VoxelPos, WorldDims};

/// Progress of a chunk's derived data. Visibility is tracked separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChunkStage {
    Empty,
    /// Grid written; light and geometry are stale.
    Populated,
    Lit,
    Meshed,
}

/// One chunk slot: grid, pending edits, and lifecycle flags.
#[derive(Debug)]
pub struct VoxelChunk {
    buf: ChunkBuf,
    pending: VecDeque<VoxelEdit>,
    stage: ChunkStage,
    active: bool,
    /// Bumped on every grid change.
    revision: u64,
}

impl VoxelChunk {
    pub fn new(coord: ChunkCoord, dims: &WorldDims, active: bool) -> Self {
        Self {
            buf: ChunkBuf::new_empty(coord, dims),
            pending: VecDeque::new(),
            stage: ChunkStage::Empty,
            active,
            revision: 0,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.buf.coord
    }

    #[inline]
    pub fn buf(&self) -> &ChunkBuf {
        &self.buf
    }

    #[inline]
    pub fn stage(&self) -> ChunkStage {
        self.stage
    }

    #[inline]
    pub fn is_populated(&self) -> bool {
        self.stage >= ChunkStage::Populated
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn pending_modifications(&self) -> usize {
        self.pending.len()
    }

    /// Fills the grid from the generator and returns the tree sites found.
    ///
    /// Runs once; later calls return no sites and leave the grid alone.
    /// Queued modifications survive population.
    pub fn populate(&mut self, generator: &BiomeGenerator) -> Vec<VoxelPos> {
        if self.is_populated() {
            return Vec::new();
        }
        let generated = generate_chunk_buffer(generator, self.buf.coord);
        self.buf = generated.buf;
        self.stage = ChunkStage::Populated;
        self.revision += 1;
        generated.tree_sites
    }

    pub fn queue_modification(&mut self, edit: VoxelEdit) {
        self.pending.push_back(edit);
    }

    /// Drains queued edits into the grid in FIFO order.
    pub fn apply_pending_modifications(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let applied = self.buf.apply_edits(self.pending.drain(..));
        if applied > 0 {
            self.revision += 1;
            self.stage = ChunkStage::Populated;
        }
        applied
    }

    pub fn recompute_lighting(&mut self, reg: &BlockRegistry, params: &LightingParams) -> LightStats {
        let stats = compute_light(&mut self.buf, reg, params);
        if self.stage == ChunkStage::Populated {
            self.stage = ChunkStage::Lit;
        }
        stats
    }

    /// Builds geometry from the current grid. Cells across the chunk border come from `neighbors`.
    pub fn extract_mesh(
        &self,
        reg: &BlockRegistry,
        neighbors: &dyn VoxelLookup,
        opts: MeshOptions,
    ) -> ChunkMesh {
        extract_mesh(&self.buf, reg, neighbors, opts)
    }

    /// Records that geometry built at `revision` is current.
    ///
    /// Ignored when the grid has changed since, so the stage never claims a
    /// mesh newer than the data.
    pub fn mark_meshed(&mut self, revision: u64) {
        if revision == self.revision && self.stage >= ChunkStage::Populated {
            self.stage = ChunkStage::Meshed;
        }
    }

    /// Writes one cell directly and returns the other chunks whose boundary
    /// faces touch it, or `None` when the write was rejected.
    ///
    /// The chunk must be populated and own `pos`.
    pub fn edit_voxel(&mut self, dims: &WorldDims, pos: VoxelPos, block: BlockId) -> Option<Vec<ChunkCoord>> {
        if !self.is_populated() || !self.buf.set_world_id(pos, block) {
            return None;
        }
        self.revision += 1;
        self.stage = ChunkStage::Populated;
        Some(affected_neighbor_chunks(dims, pos))
    }

    #[inline]
    pub fn voxel_state_at(&self, pos: VoxelPos) -> Option<VoxelState> {
        self.buf.get_world(pos)
    }
}
