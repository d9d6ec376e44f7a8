use std::time::Instant;

use strata_blocks::BlockRegistry;
use strata_chunk::{ChunkBuf, VoxelLookup, VoxelState};
use strata_world::Face;
use strata_world::voxel_data::TEXTURE_ATLAS_SIZE_IN_BLOCKS;

use crate::atlas::AtlasRect;
use crate::chunk::ChunkMesh;
use crate::mesh_build::MeshBuild;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshOptions {
    pub atlas_size_in_blocks: u16,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            atlas_size_in_blocks: TEXTURE_ATLAS_SIZE_IN_BLOCKS,
        }
    }
}

/// Builds the visible faces of every solid cell in `buf`.
///
/// A face is emitted when the cell across it resolves and its block type has
/// `render_neighbor_faces` set. Neighbours outside the chunk come from
/// `neighbors`; unresolved ones hide the face. Vertex alpha is the
/// neighbour's light.
pub fn extract_mesh(
    buf: &ChunkBuf,
    reg: &BlockRegistry,
    neighbors: &dyn VoxelLookup,
    opts: MeshOptions,
) -> ChunkMesh {
    let t0 = Instant::now();
    let mut build = MeshBuild::default();
    let origin = buf.origin();
    for y in 0..buf.height {
        for x in 0..buf.width {
            for z in 0..buf.width {
                let cell = buf.get_local(x, y, z);
                let ty = reg.descriptor(cell.id);
                if !ty.solid {
                    continue;
                }
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
                    let neighbor: Option<VoxelState> = if buf.in_bounds_local(nx, ny, nz) {
                        Some(buf.get_local(nx as usize, ny as usize, nz as usize))
                    } else {
                        neighbors.voxel_state_at(origin.offset(nx, ny, nz))
                    };
                    let Some(n) = neighbor else {
                        continue;
                    };
                    if !reg.descriptor(n.id).render_neighbor_faces {
                        continue;
                    }
                    let tile =
                        AtlasRect::from_index(ty.texture_id(face.index()), opts.atlas_size_in_blocks);
                    build.add_face(face, [x as f32, y as f32, z as f32], tile, n.light);
                }
            }
        }
    }
    log::trace!(
        target: "perf",
        "ms={} mesh_chunk cx={} cz={} quads={}",
        t0.elapsed().as_millis(),
        buf.coord.cx,
        buf.coord.cz,
        build.quad_count()
    );
    ChunkMesh::new(
        buf.coord,
        [origin.x as f32, origin.y as f32, origin.z as f32],
        build,
    )
}
