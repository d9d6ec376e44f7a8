use strata_world::ChunkCoord;

use crate::mesh_build::MeshBuild;

/// Finished geometry for one chunk. Positions are chunk-local; `origin`
/// places them in the world.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub origin: [f32; 3],
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
    pub build: MeshBuild,
}

impl ChunkMesh {
    pub fn new(coord: ChunkCoord, origin: [f32; 3], build: MeshBuild) -> Self {
        let (bbox_min, bbox_max) = bounds(&build);
        Self {
            coord,
            origin,
            bbox_min,
            bbox_max,
            build,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.build.vertex_count()
    }
}

fn bounds(build: &MeshBuild) -> ([f32; 3], [f32; 3]) {
    if build.pos.is_empty() {
        return ([0.0; 3], [0.0; 3]);
    }
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in build.pos.chunks_exact(3) {
        for a in 0..3 {
            min[a] = min[a].min(p[a]);
            max[a] = max[a].max(p[a]);
        }
    }
    (min, max)
}
