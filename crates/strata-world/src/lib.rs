//! World sizing, coordinates, noise sampling, and terrain generation.
#![forbid(unsafe_code)]

pub mod biome;
pub mod coords;
pub mod face;
pub mod noise;
pub mod voxel_data;
pub mod worldgen;

pub use biome::{BiomeGenerator, VoxelSample};
pub use coords::{ChunkCoord, VoxelPos};
pub use face::Face;
pub use noise::NoiseSampler;
pub use voxel_data::WorldDims;
pub use worldgen::{WorldGenConfig, WorldGenParams};
