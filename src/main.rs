mod assets;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use strata_blocks::{AIR, BlockId, BlockRegistry};
use strata_runtime::{Threading, World, WorldConfig};
use strata_world::worldgen::{self, WorldGenConfig, WorldGenParams};
use strata_world::{BiomeGenerator, VoxelPos};

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Headless driver for the streaming voxel world")]
struct Args {
    /// Directory containing assets/voxels
    #[arg(long)]
    assets_root: Option<PathBuf>,
    /// Block palette TOML; the built-in palette is used when absent
    #[arg(long)]
    blocks: Option<PathBuf>,
    /// Terrain, tree and lode TOML
    #[arg(long)]
    worldgen: Option<PathBuf>,
    /// World size, threading and tick budget TOML
    #[arg(long)]
    world: Option<PathBuf>,
    #[arg(long)]
    seed: Option<i32>,
    /// Run chunk updates on a background worker
    #[arg(long)]
    worker: bool,
    /// Force single-threaded updates even if the config asks for a worker
    #[arg(long, conflicts_with = "worker")]
    single: bool,
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Observer speed along +x in voxels per tick
    #[arg(long, default_value_t = 0.5)]
    speed: f32,
    /// Ticks between edits near the observer; 0 disables edits
    #[arg(long, default_value_t = 50)]
    edit_every: u32,
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn load_registry(path: &Path) -> Result<BlockRegistry, Box<dyn Error>> {
    if path.exists() {
        log::info!("loading blocks from {}", path.display());
        BlockRegistry::load_from_path(path)
    } else {
        log::info!("{} not found; using built-in blocks", path.display());
        Ok(BlockRegistry::builtin())
    }
}

fn load_worldgen(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    if path.exists() {
        log::info!("loading worldgen from {}", path.display());
        worldgen::load_config_from_path(path)
    } else {
        Ok(WorldGenConfig::default())
    }
}

fn load_world(path: &Path) -> Result<WorldConfig, Box<dyn Error>> {
    if path.exists() {
        log::info!("loading world config from {}", path.display());
        WorldConfig::load_from_path(path)
    } else {
        Ok(WorldConfig::default())
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let root = assets::resolve_assets_root(args.assets_root.clone());
    let reg = Arc::new(load_registry(
        &args.blocks.clone().unwrap_or_else(|| assets::blocks_path(&root)),
    )?);
    let gen_cfg = load_worldgen(
        &args.worldgen.clone().unwrap_or_else(|| assets::worldgen_path(&root)),
    )?;
    let mut cfg = load_world(&args.world.clone().unwrap_or_else(|| assets::world_path(&root)))?;
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    if args.worker {
        cfg.threading = Threading::Worker;
    } else if args.single {
        cfg.threading = Threading::Single;
    }

    let params = WorldGenParams::from_config(&gen_cfg, &reg)?;
    let generator = BiomeGenerator::new(cfg.seed, cfg.dims, params);
    let mut world = World::new(&cfg, Arc::clone(&reg), generator)?;
    log::info!(
        "world {}x{} chunks of {}x{}x{} seed={} threading={:?}",
        cfg.dims.world_size_in_chunks,
        cfg.dims.world_size_in_chunks,
        cfg.dims.chunk_width,
        cfg.dims.chunk_height,
        cfg.dims.chunk_width,
        cfg.seed,
        cfg.threading
    );

    let mut observer = world.spawn_position();
    world.generate_initial(observer);
    let mut meshes = 0usize;
    let mut vertices = 0usize;
    for (_, mesh) in world.drain_ready_meshes() {
        meshes += 1;
        vertices += mesh.vertex_count();
    }
    log::info!("initial window ready: meshes={meshes} verts={vertices}");

    let stone = reg.id_by_name("stone").unwrap_or(AIR);
    let t0 = Instant::now();
    for tick in 1..=args.ticks {
        observer[0] += args.speed;
        if world.update_observer(observer) {
            log::debug!(target: "stream", "observer entered {:?}", world.observer_chunk());
        }
        let report = world.tick();
        log::trace!("tick {tick} {report:?}");

        if args.edit_every > 0 && tick % args.edit_every == 0 {
            edit_near(&world, observer, stone);
        }

        for (coord, mesh) in world.drain_ready_meshes() {
            meshes += 1;
            vertices += mesh.vertex_count();
            log::trace!(
                "mesh ({}, {}) verts={} populated={}",
                coord.cx,
                coord.cz,
                mesh.vertex_count(),
                world.is_chunk_populated(coord)
            );
        }

        if tick % 60 == 0 {
            log::info!("tick {tick} {:?}", world.stats());
        }
        if args.frame_ms > 0 {
            std::thread::sleep(Duration::from_millis(args.frame_ms));
        }
    }

    world.stop_worker();
    log::info!(
        target: "perf",
        "ms={} run ticks={} meshes={} verts={}",
        t0.elapsed().as_millis(),
        args.ticks,
        meshes,
        vertices
    );
    log::info!("final {:?}", world.stats());
    Ok(())
}

/// Digs out the surface block under the observer and stacks stone two cells ahead.
fn edit_near(world: &World, observer: [f32; 3], block: BlockId) {
    let p = VoxelPos::from_point(observer);
    if let Some(y) = world.highest_solid_y(p.x, p.z) {
        let dug = world.edit_voxel(VoxelPos::new(p.x, y, p.z), AIR);
        let placed = world.edit_voxel(VoxelPos::new(p.x + 2, y + 1, p.z), block);
        log::debug!("edit near ({}, {}, {}) dug={dug} placed={placed}", p.x, y, p.z);
    }
    if world.is_solid_at_point(observer) {
        log::debug!("observer at {:?} is inside a solid block", observer);
    }
}
