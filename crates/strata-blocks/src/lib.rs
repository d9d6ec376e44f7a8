//! Block type descriptors and the registry that maps voxel ids to them.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::{BlockRegistry, RegistryError};
pub use types::{AIR, BlockId, BlockType};
