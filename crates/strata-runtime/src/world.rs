use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashSet;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use strata_blocks::{BlockId, BlockRegistry};
use strata_chunk::{VoxelLookup, VoxelState};
use strata_edit::EditBatch;
use strata_lighting::LightingParams;
use strata_mesh_cpu::{ChunkMesh, MeshOptions};
use strata_structures::build_tree_with;
use strata_world::{BiomeGenerator, ChunkCoord, VoxelPos, WorldDims};

use crate::chunk::VoxelChunk;
use crate::config::{Threading, TickBudget, WorldConfig};
use crate::queue::WorkQueues;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("world must be at least one chunk wide and two voxels tall")]
    EmptyWorld,
    #[error("failed to start update worker: {0}")]
    Worker(#[from] ThreadPoolBuildError),
}

/// Work done by one call to `World::tick`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub created: usize,
    pub edits_routed: usize,
    pub updated: usize,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.created == 0 && self.edits_routed == 0 && self.updated == 0
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldStats {
    pub allocated: usize,
    pub populated: usize,
    pub active: usize,
    pub pending_creations: usize,
    pub pending_updates: usize,
    pub pending_batches: usize,
    pub pending_edits: usize,
    pub meshes_built: usize,
}

/// State reachable from both the main thread and the update worker.
struct WorldCore {
    dims: WorldDims,
    registry: Arc<BlockRegistry>,
    generator: BiomeGenerator,
    lighting: LightingParams,
    mesh_opts: MeshOptions,
    /// `world_size_in_chunks^2` slots; a slot is allocated at most once and never freed.
    slots: Vec<OnceLock<RwLock<VoxelChunk>>>,
    queues: WorkQueues,
    mesh_tx: Sender<(ChunkCoord, ChunkMesh)>,
    /// Chunks allocated off the main thread that still need creation.
    alloc_tx: Sender<ChunkCoord>,
    allocated: AtomicUsize,
    populated: AtomicUsize,
    meshes_built: AtomicUsize,
}

impl WorldCore {
    fn slot(&self, coord: ChunkCoord) -> Option<&RwLock<VoxelChunk>> {
        let i = self.dims.slot_index(coord)?;
        self.slots[i].get()
    }

    /// Returns the slot for `coord`, allocating it if needed. The flag is
    /// true when this call allocated it.
    fn slot_or_alloc(&self, coord: ChunkCoord, active: bool) -> Option<(&RwLock<VoxelChunk>, bool)> {
        let i = self.dims.slot_index(coord)?;
        let mut fresh = false;
        let slot = self.slots[i].get_or_init(|| {
            fresh = true;
            RwLock::new(VoxelChunk::new(coord, &self.dims, active))
        });
        if fresh {
            self.allocated.fetch_add(1, Ordering::Relaxed);
        }
        Some((slot, fresh))
    }

    fn is_populated(&self, coord: ChunkCoord) -> bool {
        self.slot(coord)
            .is_some_and(|s| s.read().unwrap().is_populated())
    }

    /// Populates one chunk if it is not yet, queueing its trees and its first update.
    fn create_chunk(&self, coord: ChunkCoord) -> bool {
        let Some(slot) = self.slot(coord) else {
            return false;
        };
        let sites = {
            let mut chunk = slot.write().unwrap();
            if chunk.is_populated() {
                return false;
            }
            chunk.populate(&self.generator)
        };
        self.populated.fetch_add(1, Ordering::Relaxed);
        self.queue_trees(&sites);
        self.queues.enqueue_update(coord);
        true
    }

    fn queue_trees(&self, sites: &[VoxelPos]) {
        let trees = &self.generator.params().trees;
        for &site in sites {
            self.queues
                .push_modifications(build_tree_with(self.generator.noise(), site, trees));
        }
    }

    /// Routes every queued batch to its owning chunks. Unknown chunks are
    /// allocated and handed to the creation queue.
    fn apply_modifications(&self) -> usize {
        let batches = self.queues.take_modifications();
        let mut routed = 0;
        for batch in batches {
            routed += self.route_batch(batch);
        }
        routed
    }

    fn route_batch(&self, batch: EditBatch) -> usize {
        let mut routed = 0;
        for edit in batch {
            if !self.dims.voxel_in_world(edit.pos) {
                log::trace!(
                    "dropping edit at ({}, {}, {}) outside the world",
                    edit.pos.x,
                    edit.pos.y,
                    edit.pos.z
                );
                continue;
            }
            let coord = self.dims.chunk_of(edit.pos);
            let Some((slot, fresh)) = self.slot_or_alloc(coord, false) else {
                continue;
            };
            if fresh {
                // Receiver lives as long as the world.
                let _ = self.alloc_tx.send(coord);
            }
            let populated = {
                let mut chunk = slot.write().unwrap();
                chunk.queue_modification(edit);
                chunk.is_populated()
            };
            if populated {
                self.queues.enqueue_update(coord);
            }
            routed += 1;
        }
        routed
    }

    /// Pops one chunk and runs modifications, lighting and meshing on it.
    fn process_next_update(&self) -> bool {
        let Some(coord) = self.queues.next_update() else {
            return false;
        };
        self.update_chunk(coord);
        true
    }

    fn update_chunk(&self, coord: ChunkCoord) {
        let Some(slot) = self.slot(coord) else {
            return;
        };
        let t0 = Instant::now();
        let revision = {
            let mut chunk = slot.write().unwrap();
            if !chunk.is_populated() {
                return;
            }
            chunk.apply_pending_modifications();
            chunk.recompute_lighting(&self.registry, &self.lighting);
            chunk.revision()
        };
        // Meshing reads neighbours, so only a read lock is held on this chunk.
        let mesh = slot
            .read()
            .unwrap()
            .extract_mesh(&self.registry, self, self.mesh_opts);
        slot.write().unwrap().mark_meshed(revision);
        self.meshes_built.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            target: "perf",
            "ms={:.2} chunk_update cx={} cz={} verts={}",
            t0.elapsed().as_secs_f32() * 1000.0,
            coord.cx,
            coord.cz,
            mesh.vertex_count()
        );
        let _ = self.mesh_tx.send((coord, mesh));
    }

    fn voxel_state(&self, pos: VoxelPos) -> Option<VoxelState> {
        if !self.dims.voxel_in_world(pos) {
            return None;
        }
        if let Some(slot) = self.slot(self.dims.chunk_of(pos)) {
            let chunk = slot.read().unwrap();
            if chunk.is_populated() {
                return chunk.voxel_state_at(pos);
            }
        }
        Some(VoxelState::new(self.generator.voxel_type_at(pos)))
    }
}

impl VoxelLookup for WorldCore {
    fn voxel_state_at(&self, pos: VoxelPos) -> Option<VoxelState> {
        self.voxel_state(pos)
    }
}

struct Worker {
    // Kept alive so the worker thread is not torn down with the builder.
    _pool: ThreadPool,
    stop: Arc<AtomicBool>,
}

/// Streaming, editable voxel world.
///
/// Owns the chunk slots, the observer window, the creation queue and the
/// shared update and modification queues. Chunk creation and mesh handoff
/// happen on the thread that owns the `World`; updates run either in
/// [`World::tick`] or on a background worker.
pub struct World {
    core: Arc<WorldCore>,
    view_distance: i32,
    threading: Threading,
    budget: TickBudget,
    creation: VecDeque<ChunkCoord>,
    active: HashSet<ChunkCoord>,
    observer_chunk: Option<ChunkCoord>,
    mesh_rx: Receiver<(ChunkCoord, ChunkMesh)>,
    alloc_rx: Receiver<ChunkCoord>,
    worker: Option<Worker>,
}

impl World {
    /// Builds an empty world. In worker mode the update worker is started here.
    pub fn new(
        cfg: &WorldConfig,
        registry: Arc<BlockRegistry>,
        generator: BiomeGenerator,
    ) -> Result<Self, WorldError> {
        let dims = cfg.dims;
        if dims.world_size_in_chunks == 0 || dims.chunk_width == 0 || dims.chunk_height < 2 {
            return Err(WorldError::EmptyWorld);
        }
        let n = dims.world_size_in_chunks * dims.world_size_in_chunks;
        let (mesh_tx, mesh_rx) = unbounded();
        let (alloc_tx, alloc_rx) = unbounded();
        let core = Arc::new(WorldCore {
            dims,
            registry,
            generator,
            lighting: cfg.lighting,
            mesh_opts: cfg.mesh_options(),
            slots: (0..n).map(|_| OnceLock::new()).collect(),
            queues: WorkQueues::new(),
            mesh_tx,
            alloc_tx,
            allocated: AtomicUsize::new(0),
            populated: AtomicUsize::new(0),
            meshes_built: AtomicUsize::new(0),
        });
        let mut world = Self {
            core,
            view_distance: cfg.view_distance_in_chunks.max(0),
            threading: cfg.threading,
            budget: cfg.tick,
            creation: VecDeque::new(),
            active: HashSet::new(),
            observer_chunk: None,
            mesh_rx,
            alloc_rx,
            worker: None,
        };
        if cfg.threading == Threading::Worker {
            world.start_worker()?;
        }
        Ok(world)
    }

    #[inline]
    pub fn dims(&self) -> WorldDims {
        self.core.dims
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        &self.core.registry
    }

    #[inline]
    pub fn generator(&self) -> &BiomeGenerator {
        &self.core.generator
    }

    #[inline]
    pub fn threading(&self) -> Threading {
        self.threading
    }

    #[inline]
    pub fn worker_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Starts the background update worker. A running worker is left alone.
    pub fn start_worker(&mut self) -> Result<(), WorldError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|i| format!("strata-update-{i}"))
            .build()?;
        let stop = Arc::new(AtomicBool::new(false));
        let core = Arc::clone(&self.core);
        let stop_flag = Arc::clone(&stop);
        pool.spawn(move || {
            log::info!(target: "worker", "update worker started");
            while !stop_flag.load(Ordering::Acquire) {
                let routed = core.apply_modifications();
                let updated = core.process_next_update();
                if routed == 0 && !updated {
                    thread::yield_now();
                }
            }
            log::info!(target: "worker", "update worker stopped");
        });
        self.worker = Some(Worker { _pool: pool, stop });
        self.threading = Threading::Worker;
        Ok(())
    }

    /// Signals the worker to exit after its current item. Queued work is kept
    /// and is picked up by `tick` from now on.
    pub fn stop_worker(&mut self) {
        if let Some(w) = self.worker.take() {
            w.stop.store(true, Ordering::Release);
            self.threading = Threading::Single;
        }
    }

    /// Recomputes the window when the observer enters a different chunk.
    pub fn update_observer(&mut self, pos: [f32; 3]) -> bool {
        let coord = ChunkCoord::from_world_pos(pos, self.core.dims.chunk_width as i32);
        if self.observer_chunk == Some(coord) {
            return false;
        }
        self.check_view_distance(coord);
        true
    }

    /// Makes exactly the in-world chunks of `[c - r, c + r)` active,
    /// allocating and queueing creation for any that have no slot yet.
    pub fn check_view_distance(&mut self, center: ChunkCoord) {
        let r = self.view_distance;
        let previous = std::mem::take(&mut self.active);
        let mut queued = 0;
        for cx in center.cx - r..center.cx + r {
            for cz in center.cz - r..center.cz + r {
                let coord = ChunkCoord::new(cx, cz);
                let Some((slot, fresh)) = self.core.slot_or_alloc(coord, true) else {
                    continue;
                };
                if fresh {
                    self.creation.push_back(coord);
                    queued += 1;
                } else {
                    let mut chunk = slot.write().unwrap();
                    if !chunk.is_active() {
                        chunk.set_active(true);
                    }
                    if !chunk.is_populated() && !self.creation.contains(&coord) {
                        self.creation.push_back(coord);
                        queued += 1;
                    }
                }
                self.active.insert(coord);
            }
        }
        let mut parked = 0;
        for coord in previous.difference(&self.active) {
            if let Some(slot) = self.core.slot(*coord) {
                slot.write().unwrap().set_active(false);
                parked += 1;
            }
        }
        self.observer_chunk = Some(center);
        log::debug!(
            target: "stream",
            "window center=({}, {}) active={} queued={} parked={}",
            center.cx,
            center.cz,
            self.active.len(),
            queued,
            parked
        );
    }

    /// Synchronously creates, populates and meshes the window around `observer`.
    pub fn generate_initial(&mut self, observer: [f32; 3]) {
        let t0 = Instant::now();
        self.update_observer(observer);
        self.collect_allocations();
        let coords: Vec<ChunkCoord> = self.creation.drain(..).collect();
        let core = Arc::clone(&self.core);
        let sites: Vec<(ChunkCoord, Vec<VoxelPos>)> = coords
            .par_iter()
            .filter_map(|&coord| {
                let slot = core.slot(coord)?;
                let mut chunk = slot.write().unwrap();
                if chunk.is_populated() {
                    return None;
                }
                Some((coord, chunk.populate(&core.generator)))
            })
            .collect();
        for (coord, trees) in &sites {
            core.populated.fetch_add(1, Ordering::Relaxed);
            core.queue_trees(trees);
            core.queues.enqueue_update(*coord);
        }
        core.apply_modifications();
        // Trees may spill into chunks outside the window.
        self.collect_allocations();
        while let Some(coord) = self.creation.pop_front() {
            core.create_chunk(coord);
        }
        core.apply_modifications();
        if self.worker.is_none() {
            while core.process_next_update() {}
        }
        log::info!(
            target: "perf",
            "ms={} generate_initial chunks={} trees={}",
            t0.elapsed().as_millis(),
            sites.len(),
            sites.iter().map(|(_, t)| t.len()).sum::<usize>()
        );
    }

    fn collect_allocations(&mut self) {
        for coord in self.alloc_rx.try_iter() {
            if !self.creation.contains(&coord) {
                self.creation.push_back(coord);
            }
        }
    }

    /// Advances streaming work within the configured budget.
    ///
    /// Creation always runs here. Modification routing and updates run here
    /// only when no worker is active.
    pub fn tick(&mut self) -> TickReport {
        let budget = self.budget;
        self.tick_with(budget)
    }

    pub fn tick_with(&mut self, budget: TickBudget) -> TickReport {
        let mut report = TickReport::default();
        self.collect_allocations();

        let clock = budget.start();
        while !clock.exhausted(report.created) {
            let Some(coord) = self.creation.pop_front() else {
                break;
            };
            if self.core.create_chunk(coord) {
                report.created += 1;
            }
        }

        if self.worker.is_none() {
            report.edits_routed = self.core.apply_modifications();
            self.collect_allocations();
            let clock = budget.start();
            while !clock.exhausted(report.updated) && self.core.process_next_update() {
                report.updated += 1;
            }
        }
        report
    }

    /// Ticks with an unlimited budget until nothing is left to do. Worker mode
    /// only drains creation here.
    pub fn run_until_idle(&mut self) {
        loop {
            let report = self.tick_with(TickBudget::unlimited());
            if report.is_idle() && self.creation.is_empty() && self.alloc_rx.is_empty() {
                break;
            }
        }
    }

    /// Finished geometry in completion order, for the rendering side.
    pub fn drain_ready_meshes(&self) -> Vec<(ChunkCoord, ChunkMesh)> {
        self.mesh_rx.try_iter().collect()
    }

    /// Queues a batch of edits that may target chunks not created yet.
    pub fn queue_modifications(&self, batch: EditBatch) {
        self.core.queues.push_modifications(batch);
    }

    /// Player edit. The owning chunk is created first if needed, then written
    /// at once and scheduled ahead of streaming work, together with the
    /// neighbours sharing the edited cell's faces. Returns `false` for
    /// positions outside the world.
    pub fn edit_voxel(&self, pos: VoxelPos, block: BlockId) -> bool {
        let dims = self.core.dims;
        if !dims.voxel_in_world(pos) {
            return false;
        }
        let coord = dims.chunk_of(pos);
        let Some((slot, _)) = self.core.slot_or_alloc(coord, false) else {
            return false;
        };
        // Unpopulated chunks read from the generator; populate before writing.
        if self.core.create_chunk(coord) {
            log::debug!(target: "stream", "edit created chunk ({}, {})", coord.cx, coord.cz);
        }
        let touched = slot.write().unwrap().edit_voxel(&dims, pos, block);
        let Some(touched) = touched else {
            return false;
        };
        self.core.queues.enqueue_update_front(coord);
        for n in touched {
            if self.core.is_populated(n) {
                self.core.queues.enqueue_update_front(n);
            }
        }
        log::debug!(
            "edit ({}, {}, {}) -> {} in chunk ({}, {})",
            pos.x,
            pos.y,
            pos.z,
            block,
            coord.cx,
            coord.cz
        );
        true
    }

    pub fn voxel_state_at(&self, pos: VoxelPos) -> Option<VoxelState> {
        self.core.voxel_state(pos)
    }

    /// Out-of-world positions are not solid.
    pub fn is_solid_at(&self, pos: VoxelPos) -> bool {
        self.core
            .voxel_state(pos)
            .is_some_and(|s| self.core.registry.is_solid(s.id))
    }

    pub fn is_solid_at_point(&self, p: [f32; 3]) -> bool {
        self.is_solid_at(VoxelPos::from_point(p))
    }

    /// Whether light and sight pass through the cell. Out-of-world cells are open.
    pub fn is_transparent_at(&self, pos: VoxelPos) -> bool {
        match self.core.voxel_state(pos) {
            Some(s) => {
                let ty = self.core.registry.descriptor(s.id);
                !ty.solid || ty.transparency > 0.0
            }
            None => true,
        }
    }

    pub fn is_chunk_populated(&self, coord: ChunkCoord) -> bool {
        self.core.is_populated(coord)
    }

    pub fn is_chunk_active(&self, coord: ChunkCoord) -> bool {
        self.core
            .slot(coord)
            .is_some_and(|s| s.read().unwrap().is_active())
    }

    pub fn is_chunk_allocated(&self, coord: ChunkCoord) -> bool {
        self.core.slot(coord).is_some()
    }

    /// Coordinates whose chunks are currently active.
    pub fn active_chunks(&self) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = self.active.iter().copied().collect();
        out.sort();
        out
    }

    pub fn observer_chunk(&self) -> Option<ChunkCoord> {
        self.observer_chunk
    }

    /// Runs `f` against a chunk's grid under its read lock.
    pub fn with_chunk<R>(&self, coord: ChunkCoord, f: impl FnOnce(&VoxelChunk) -> R) -> Option<R> {
        let slot = self.core.slot(coord)?;
        let chunk = slot.read().unwrap();
        Some(f(&chunk))
    }

    /// Topmost solid cell of column (x, z).
    pub fn highest_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        (0..self.core.dims.chunk_height as i32)
            .rev()
            .find(|&y| self.is_solid_at(VoxelPos::new(x, y, z)))
    }

    /// Centre of the world, standing on the highest solid block.
    pub fn spawn_position(&self) -> [f32; 3] {
        let half = (self.core.dims.world_size_in_voxels() / 2) as i32;
        let y = self.highest_solid_y(half, half).map_or(0, |y| y + 1);
        [half as f32 + 0.5, y as f32, half as f32 + 0.5]
    }

    pub fn stats(&self) -> WorldStats {
        let depths = self.core.queues.depths();
        WorldStats {
            allocated: self.core.allocated.load(Ordering::Relaxed),
            populated: self.core.populated.load(Ordering::Relaxed),
            active: self.active.len(),
            pending_creations: self.creation.len() + self.alloc_rx.len(),
            pending_updates: depths.updates,
            pending_batches: depths.modifications.batches,
            pending_edits: depths.modifications.edits,
            meshes_built: self.core.meshes_built.load(Ordering::Relaxed),
        }
    }
}

impl VoxelLookup for World {
    fn voxel_state_at(&self, pos: VoxelPos) -> Option<VoxelState> {
        self.core.voxel_state(pos)
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
