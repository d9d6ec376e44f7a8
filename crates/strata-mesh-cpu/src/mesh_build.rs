use strata_world::Face;

use crate::atlas::AtlasRect;
use crate::constants::{QUAD_INDICES, VERTS_PER_QUAD, VOXEL_TRIS, VOXEL_VERTS};

/// Parallel vertex streams: xyz positions, uv pairs, rgba colors, triangle indices.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub uv: Vec<f32>,
    pub col: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertex_count() / VERTS_PER_QUAD
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends one cube face of the voxel whose min corner is `origin`.
    /// Every vertex gets color `(0, 0, 0, light)`.
    pub fn add_face(&mut self, face: Face, origin: [f32; 3], tile: AtlasRect, light: f32) {
        let base = self.vertex_count() as u32;
        let uvs = tile.corners();
        for (i, &corner) in VOXEL_TRIS[face.index()].iter().enumerate() {
            let v = VOXEL_VERTS[corner];
            self.pos.extend_from_slice(&[
                origin[0] + v[0],
                origin[1] + v[1],
                origin[2] + v[2],
            ]);
            self.uv.extend_from_slice(&uvs[i]);
            self.col.extend_from_slice(&[0.0, 0.0, 0.0, light]);
        }
        self.idx.extend(QUAD_INDICES.iter().map(|o| base + o));
    }
}
