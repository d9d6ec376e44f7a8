use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use strata_lighting::LightingParams;
use strata_mesh_cpu::MeshOptions;
use strata_world::WorldDims;
use strata_world::voxel_data::{TEXTURE_ATLAS_SIZE_IN_BLOCKS, VIEW_DISTANCE_IN_CHUNKS};

/// Where chunk updates run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threading {
    /// Creation, modifications and updates all advance from `World::tick`.
    #[default]
    Single,
    /// A background worker drains modifications and updates.
    Worker,
}

/// Upper bound on the work one scheduler tick performs per queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct TickBudget {
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub max_millis: Option<u64>,
}

fn default_max_items() -> usize {
    1
}

impl Default for TickBudget {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            max_millis: None,
        }
    }
}

impl TickBudget {
    pub fn unlimited() -> Self {
        Self {
            max_items: usize::MAX,
            max_millis: None,
        }
    }

    pub fn start(&self) -> BudgetClock {
        BudgetClock {
            started: Instant::now(),
            max_items: self.max_items.max(1),
            max_time: self.max_millis.map(Duration::from_millis),
        }
    }
}

/// Running budget for one queue within one tick.
#[derive(Clone, Copy, Debug)]
pub struct BudgetClock {
    started: Instant,
    max_items: usize,
    max_time: Option<Duration>,
}

impl BudgetClock {
    /// True once `done` items or the time limit have been reached.
    pub fn exhausted(&self, done: usize) -> bool {
        if done >= self.max_items {
            return true;
        }
        match self.max_time {
            Some(limit) => done > 0 && self.started.elapsed() >= limit,
            None => false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldConfig {
    #[serde(flatten)]
    pub dims: WorldDims,
    #[serde(default = "default_view_distance")]
    pub view_distance_in_chunks: i32,
    #[serde(default)]
    pub seed: i32,
    #[serde(default)]
    pub threading: Threading,
    #[serde(default)]
    pub tick: TickBudget,
    #[serde(default)]
    pub lighting: LightingParams,
    #[serde(default = "default_atlas_size")]
    pub atlas_size_in_blocks: u16,
}

fn default_view_distance() -> i32 {
    VIEW_DISTANCE_IN_CHUNKS
}
fn default_atlas_size() -> u16 {
    TEXTURE_ATLAS_SIZE_IN_BLOCKS
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dims: WorldDims::default(),
            view_distance_in_chunks: VIEW_DISTANCE_IN_CHUNKS,
            seed: 0,
            threading: Threading::default(),
            tick: TickBudget::default(),
            lighting: LightingParams::default(),
            atlas_size_in_blocks: TEXTURE_ATLAS_SIZE_IN_BLOCKS,
        }
    }
}

impl WorldConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: WorldConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    #[inline]
    pub fn mesh_options(&self) -> MeshOptions {
        MeshOptions {
            atlas_size_in_blocks: self.atlas_size_in_blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let cfg = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.dims, WorldDims::default());
        assert_eq!(cfg.view_distance_in_chunks, VIEW_DISTANCE_IN_CHUNKS);
        assert_eq!(cfg.threading, Threading::Single);
        assert_eq!(cfg.tick, TickBudget::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let cfg = WorldConfig::from_toml_str(
            r#"
            chunk_width = 8
            world_size_in_chunks = 12
            seed = 77
            threading = "worker"

            [tick]
            max_items = 4
            max_millis = 3

            [lighting]
            falloff = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.dims.chunk_width, 8);
        assert_eq!(cfg.dims.chunk_height, WorldDims::default().chunk_height);
        assert_eq!(cfg.dims.world_size_in_chunks, 12);
        assert_eq!(cfg.seed, 77);
        assert_eq!(cfg.threading, Threading::Worker);
        assert_eq!(cfg.tick.max_items, 4);
        assert_eq!(cfg.tick.max_millis, Some(3));
        assert!((cfg.lighting.falloff - 0.1).abs() < 1e-6);
    }

    #[test]
    fn budget_counts_items() {
        let clock = TickBudget {
            max_items: 2,
            max_millis: None,
        }
        .start();
        assert!(!clock.exhausted(0));
        assert!(!clock.exhausted(1));
        assert!(clock.exhausted(2));
    }

    #[test]
    fn zero_item_budget_still_makes_progress() {
        let clock = TickBudget {
            max_items: 0,
            max_millis: None,
        }
        .start();
        assert!(!clock.exhausted(0));
        assert!(clock.exhausted(1));
    }
}
