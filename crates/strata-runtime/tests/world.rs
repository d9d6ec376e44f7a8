use std::sync::Arc;
use std::time::{Duration, Instant};

use strata_blocks::{AIR, BlockRegistry};
use strata_chunk::VoxelState;
use strata_mesh_cpu::MeshBuild;
use strata_edit::VoxelEdit;
use strata_runtime::{ChunkStage, Threading, TickBudget, World, WorldConfig, WorldError};
use strata_structures::{CANOPY_HEIGHT, CANOPY_RADIUS, build_tree_with, trunk_height};
use strata_world::worldgen::{WorldGenConfig, WorldGenParams};
use strata_world::{BiomeGenerator, ChunkCoord, VoxelPos, WorldDims};

fn config(threading: Threading) -> WorldConfig {
    WorldConfig {
        dims: WorldDims::new(4, 64, 10),
        view_distance_in_chunks: 2,
        seed: 1337,
        threading,
        tick: TickBudget::default(),
        ..WorldConfig::default()
    }
}

fn worldgen(trees: bool) -> WorldGenConfig {
    let mut cfg = WorldGenConfig::default();
    cfg.lodes.clear();
    cfg.terrain.terrain_height = 8.0;
    cfg.terrain.solid_ground_height = 16;
    cfg.trees.min_height = 4;
    cfg.trees.max_height = 7;
    if !trees {
        cfg.trees.zone_threshold = 2.0;
    }
    cfg
}

fn world_with(threading: Threading, trees: bool) -> World {
    let cfg = config(threading);
    let reg = Arc::new(BlockRegistry::builtin());
    let params = WorldGenParams::from_config(&worldgen(trees), &reg).unwrap();
    let generator = BiomeGenerator::new(cfg.seed, cfg.dims, params);
    World::new(&cfg, reg, generator).unwrap()
}

fn coords(range: std::ops::Range<i32>) -> Vec<ChunkCoord> {
    let mut out = Vec::new();
    for cx in range.clone() {
        for cz in range.clone() {
            out.push(ChunkCoord::new(cx, cz));
        }
    }
    out
}

#[test]
fn window_is_clipped_to_world_bounds() {
    let mut w = world_with(Threading::Single, false);
    w.check_view_distance(ChunkCoord::new(0, 0));
    assert_eq!(w.active_chunks(), coords(0..2));
    for c in coords(0..2) {
        assert!(w.is_chunk_active(c));
        assert!(!w.is_chunk_populated(c));
    }
    assert_eq!(w.stats().pending_creations, 4);
}

#[test]
fn moving_the_observer_parks_chunks_left_behind() {
    let mut w = world_with(Threading::Single, false);
    w.check_view_distance(ChunkCoord::new(0, 0));
    w.check_view_distance(ChunkCoord::new(5, 5));
    assert_eq!(w.active_chunks(), coords(3..7));
    for c in coords(0..2) {
        assert!(w.is_chunk_allocated(c));
        assert!(!w.is_chunk_active(c));
    }
    w.check_view_distance(ChunkCoord::new(1, 1));
    assert_eq!(w.active_chunks(), coords(0..3));
    assert!(w.is_chunk_active(ChunkCoord::new(0, 0)));
    assert!(!w.is_chunk_active(ChunkCoord::new(5, 5)));
}

#[test]
fn observer_only_triggers_on_chunk_change() {
    let mut w = world_with(Threading::Single, false);
    assert!(w.update_observer([1.0, 30.0, 1.0]));
    assert!(!w.update_observer([3.5, 30.0, 2.0]));
    assert!(w.update_observer([4.2, 30.0, 2.0]));
    assert_eq!(w.observer_chunk(), Some(ChunkCoord::new(1, 0)));
}

#[test]
fn tick_respects_item_budget() {
    let mut w = world_with(Threading::Single, false);
    w.check_view_distance(ChunkCoord::new(0, 0));
    let report = w.tick();
    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(w.stats().pending_creations, 3);
    w.run_until_idle();
    for c in coords(0..2) {
        assert!(w.is_chunk_populated(c));
        assert_eq!(w.with_chunk(c, |ch| ch.stage()), Some(ChunkStage::Meshed));
    }
}

#[test]
fn initial_generation_meshes_the_window() {
    let mut w = world_with(Threading::Single, false);
    w.generate_initial([0.5, 30.0, 0.5]);
    let meshes = w.drain_ready_meshes();
    for c in coords(0..2) {
        assert!(w.is_chunk_populated(c));
        assert!(meshes.iter().any(|(mc, m)| *mc == c && m.vertex_count() > 0));
    }
    let s = w.stats();
    assert_eq!(s.active, 4);
    assert_eq!(s.pending_updates, 0);
    assert_eq!(s.pending_creations, 0);
}

#[test]
fn edited_voxel_reads_back_solid() {
    let mut w = world_with(Threading::Single, false);
    w.generate_initial([0.5, 30.0, 0.5]);
    let stone = w.registry().id_by_name("stone").unwrap();
    let p = VoxelPos::new(5, 10, 5);
    assert!(w.edit_voxel(p, AIR));
    assert!(!w.is_solid_at(p));
    assert!(w.edit_voxel(p, stone));
    assert!(w.is_solid_at(p));
    assert!(w.is_solid_at_point([5.7, 10.2, 5.1]));
}

#[test]
fn boundary_edit_schedules_neighbours_first() {
    let mut w = world_with(Threading::Single, false);
    w.generate_initial([0.5, 30.0, 0.5]);
    w.drain_ready_meshes();
    // x = 3 is the last column of chunk (0, 0).
    assert!(w.edit_voxel(VoxelPos::new(3, 40, 1), 2));
    assert_eq!(w.stats().pending_updates, 2);
    assert!(w.edit_voxel(VoxelPos::new(2, 40, 1), 2));
    assert_eq!(w.stats().pending_updates, 2);
    w.run_until_idle();
    let mut updated: Vec<ChunkCoord> = w.drain_ready_meshes().into_iter().map(|(c, _)| c).collect();
    updated.sort();
    assert_eq!(updated, vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);
}

fn settle(w: &mut World, c: ChunkCoord) -> (Vec<VoxelState>, MeshBuild) {
    w.run_until_idle();
    let mesh = w
        .drain_ready_meshes()
        .into_iter()
        .filter(|(mc, _)| *mc == c)
        .map(|(_, m)| m.build)
        .last()
        .unwrap();
    let cells = w.with_chunk(c, |ch| ch.buf().cells.clone()).unwrap();
    (cells, mesh)
}

#[test]
fn repeating_an_edit_changes_nothing() {
    let mut w = world_with(Threading::Single, false);
    w.generate_initial([0.5, 30.0, 0.5]);
    w.drain_ready_meshes();
    let c = ChunkCoord::new(1, 1);
    let p = VoxelPos::new(5, 40, 6);

    assert!(w.edit_voxel(p, 9));
    let first = settle(&mut w, c);
    assert!(w.edit_voxel(p, 9));
    let second = settle(&mut w, c);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn out_of_world_queries_and_edits() {
    let w = world_with(Threading::Single, false);
    assert!(!w.is_solid_at(VoxelPos::new(-1, 10, 0)));
    assert!(!w.is_solid_at(VoxelPos::new(0, 64, 0)));
    assert!(!w.is_solid_at(VoxelPos::new(40, 10, 0)));
    assert!(w.voxel_state_at(VoxelPos::new(0, -1, 0)).is_none());
    assert!(w.is_transparent_at(VoxelPos::new(0, 99, 0)));
    assert!(!w.edit_voxel(VoxelPos::new(0, 64, 0), 2));
    assert!(!w.edit_voxel(VoxelPos::new(-3, 4, 0), 2));
}

#[test]
fn unloaded_chunks_read_from_the_generator() {
    let w = world_with(Threading::Single, false);
    let p = VoxelPos::new(30, 0, 30);
    assert!(!w.is_chunk_allocated(ChunkCoord::new(7, 7)));
    assert!(w.is_solid_at(p));
    let state = w.voxel_state_at(p).unwrap();
    assert_eq!(state.id, w.registry().id_by_name("bedrock").unwrap());
    assert_eq!(state.light, 0.0);
    assert!(!w.is_chunk_allocated(ChunkCoord::new(7, 7)));
}

#[test]
fn edit_into_uncreated_chunk_reads_back() {
    let mut w = world_with(Threading::Single, false);
    let stone = w.registry().id_by_name("stone").unwrap();
    let p = VoxelPos::new(5, 50, 5);
    let c = ChunkCoord::new(1, 1);
    assert!(!w.is_solid_at(p));
    assert!(!w.is_chunk_allocated(c));
    assert!(w.edit_voxel(p, stone));
    assert!(w.is_solid_at(p));
    assert!(w.is_chunk_populated(c));
    assert!(!w.is_chunk_active(c));
    assert_eq!(w.stats().pending_edits, 0);
    w.run_until_idle();
    assert_eq!(w.voxel_state_at(p).map(|s| s.id), Some(stone));
    assert_eq!(w.with_chunk(c, |ch| ch.stage()), Some(ChunkStage::Meshed));
}

#[test]
fn queued_batches_wait_for_routing() {
    let mut w = world_with(Threading::Single, false);
    let p = VoxelPos::new(30, 50, 30);
    w.queue_modifications(vec![VoxelEdit::new(p, 8)]);
    assert_eq!(w.stats().pending_edits, 1);
    assert!(!w.is_solid_at(p));
    w.run_until_idle();
    let c = ChunkCoord::new(7, 7);
    assert!(w.is_chunk_populated(c));
    assert!(!w.is_chunk_active(c));
    assert_eq!(w.voxel_state_at(p).map(|s| s.id), Some(8));
}

#[test]
fn one_voxel_tall_world_is_rejected() {
    let cfg = WorldConfig {
        dims: WorldDims::new(4, 1, 10),
        ..WorldConfig::default()
    };
    let reg = Arc::new(BlockRegistry::builtin());
    let params = WorldGenParams::from_config(&WorldGenConfig::default(), &reg).unwrap();
    let generator = BiomeGenerator::new(cfg.seed, cfg.dims, params);
    assert!(matches!(
        World::new(&cfg, reg, generator),
        Err(WorldError::EmptyWorld)
    ));
}

#[test]
fn surface_and_spawn_follow_terrain() {
    let mut w = world_with(Threading::Single, false);
    w.generate_initial([20.5, 30.0, 20.5]);
    for (x, z) in [(0, 0), (3, 5), (20, 20)] {
        assert_eq!(w.highest_solid_y(x, z), Some(w.generator().terrain_height(x, z)));
    }
    let spawn = w.spawn_position();
    assert_eq!(spawn[0], 20.5);
    assert_eq!(spawn[2], 20.5);
    assert_eq!(spawn[1] as i32, w.generator().terrain_height(20, 20) + 1);
}

#[test]
fn queued_tree_lands_in_the_world() {
    let mut w = world_with(Threading::Single, false);
    w.generate_initial([0.5, 30.0, 0.5]);
    let th = w.generator().terrain_height(8, 8);
    let base = VoxelPos::new(8, th, 8);
    let params = w.generator().params().trees.clone();
    let batch = build_tree_with(w.generator().noise(), base, &params);
    w.queue_modifications(batch);
    w.run_until_idle();

    let wood = w.registry().id_by_name("wood").unwrap();
    let leaves = w.registry().id_by_name("leaves").unwrap();
    let h = trunk_height(w.generator().noise(), base, 4, 7);
    assert!(h >= 4);
    for y in th + 1..th + h {
        assert_eq!(w.voxel_state_at(VoxelPos::new(8, y, 8)).unwrap().id, wood);
    }
    let crown = th + h;
    for dx in -CANOPY_RADIUS..=CANOPY_RADIUS {
        for dy in 0..CANOPY_HEIGHT {
            for dz in -CANOPY_RADIUS..=CANOPY_RADIUS {
                let p = VoxelPos::new(8 + dx, crown + dy, 8 + dz);
                assert_eq!(w.voxel_state_at(p).unwrap().id, leaves);
            }
        }
    }
    assert!(w.is_chunk_populated(ChunkCoord::new(2, 2)));
    assert!(!w.is_chunk_active(ChunkCoord::new(2, 2)));
}

#[test]
fn generated_trees_are_applied() {
    let mut w = world_with(Threading::Single, true);
    w.generate_initial([0.5, 30.0, 0.5]);
    w.run_until_idle();
    let wood = w.registry().id_by_name("wood").unwrap();
    let leaves = w.registry().id_by_name("leaves").unwrap();
    let generator = w.generator();
    // Another tree's canopy may cover a trunk base, but never with air.
    for x in 0..8 {
        for z in 0..8 {
            if generator.tree_sited_at(x, z) {
                let th = generator.terrain_height(x, z);
                let id = w.voxel_state_at(VoxelPos::new(x, th + 1, z)).unwrap().id;
                assert!(id == wood || id == leaves, "column ({x}, {z}) has block {id}");
            }
        }
    }
}

#[test]
fn worker_builds_meshes_in_the_background() {
    let mut w = world_with(Threading::Worker, false);
    assert!(w.worker_running());
    w.check_view_distance(ChunkCoord::new(0, 0));
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut meshed = Vec::new();
    while meshed.len() < 4 && Instant::now() < deadline {
        w.tick();
        for (c, _) in w.drain_ready_meshes() {
            if !meshed.contains(&c) {
                meshed.push(c);
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    meshed.sort();
    assert_eq!(meshed, coords(0..2));

    let p = VoxelPos::new(1, 60, 1);
    assert!(w.edit_voxel(p, 8));
    assert!(w.is_solid_at(p));
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut remeshed = false;
    while !remeshed && Instant::now() < deadline {
        remeshed = w
            .drain_ready_meshes()
            .iter()
            .any(|(c, _)| *c == ChunkCoord::new(0, 0));
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(remeshed);

    w.stop_worker();
    assert!(!w.worker_running());
    assert_eq!(w.threading(), Threading::Single);
}
