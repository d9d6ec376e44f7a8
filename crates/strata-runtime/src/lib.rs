//! World orchestration: chunk streaming, deferred edits, and the update pipeline.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod config;
pub mod queue;
pub mod world;

pub use chunk::{ChunkStage, VoxelChunk};
pub use config::{BudgetClock, Threading, TickBudget, WorldConfig};
pub use queue::{QueueDepths, UpdateQueue, WorkQueues};
pub use world::{TickReport, World, WorldError, WorldStats};
