use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use strata_blocks::BlockRegistry;
use strata_chunk::{ChunkBuf, VoxelLookup, VoxelState, generate_chunk_buffer};
use strata_lighting::{LightingParams, compute_light};
use strata_mesh_cpu::{MeshOptions, extract_mesh};
use strata_world::worldgen::{WorldGenConfig, WorldGenParams};
use strata_world::{BiomeGenerator, ChunkCoord, VoxelPos, WorldDims};

struct GeneratorLookup<'a>(&'a BiomeGenerator);

impl VoxelLookup for GeneratorLookup<'_> {
    fn voxel_state_at(&self, pos: VoxelPos) -> Option<VoxelState> {
        if !self.0.dims.voxel_in_world(pos) {
            return None;
        }
        Some(VoxelState::new(self.0.voxel_type_at(pos)))
    }
}

fn generated_chunk(reg: &BlockRegistry) -> (BiomeGenerator, ChunkBuf) {
    let params = WorldGenParams::from_config(&WorldGenConfig::default(), reg).unwrap();
    let generator = BiomeGenerator::new(1337, WorldDims::default(), params);
    let mut buf = generate_chunk_buffer(&generator, ChunkCoord::new(10, 10)).buf;
    compute_light(&mut buf, reg, &LightingParams::default());
    (generator, buf)
}

fn bench_extract_generated(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_mesh");
    group.measurement_time(Duration::from_secs(5));
    let reg = BlockRegistry::builtin();
    let (generator, buf) = generated_chunk(&reg);
    let lookup = GeneratorLookup(&generator);
    group.bench_function("generated_16x128x16", |b| {
        b.iter(|| {
            let mesh = extract_mesh(&buf, &reg, &lookup, MeshOptions::default());
            black_box(mesh);
        })
    });
    group.finish();
}

fn bench_light_generated(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_light");
    let reg = BlockRegistry::builtin();
    let (_, buf) = generated_chunk(&reg);
    group.bench_function("generated_16x128x16", |b| {
        b.iter(|| {
            let mut work = buf.clone();
            black_box(compute_light(&mut work, &reg, &LightingParams::default()));
        })
    });
    group.finish();
}

criterion_group!(benches, bench_extract_generated, bench_light_generated);
criterion_main!(benches);
