//! CPU meshing crate: face-culled cube meshes with atlas UVs and light colors.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod chunk;
pub mod constants;
pub mod emit;
pub mod mesh_build;

pub use atlas::AtlasRect;
pub use chunk::ChunkMesh;
pub use emit::{MeshOptions, extract_mesh};
pub use mesh_build::MeshBuild;
