//! Cube geometry tables shared by the mesher.

/// Unit cube corners.
pub const VOXEL_VERTS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Corner indices per face (back, front, top, bottom, left, right), in quad
/// vertex order. Paired with `QUAD_INDICES` this yields two triangles sharing
/// the 1-2 diagonal.
pub const VOXEL_TRIS: [[usize; 4]; 6] = [
    [0, 3, 1, 2],
    [5, 6, 4, 7],
    [3, 7, 2, 6],
    [1, 5, 0, 4],
    [4, 7, 0, 3],
    [1, 2, 5, 6],
];

/// Offsets from a quad's first vertex for its two triangles.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

pub const VERTS_PER_QUAD: usize = 4;
