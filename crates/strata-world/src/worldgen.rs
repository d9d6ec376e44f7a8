use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use strata_blocks::{BlockId, BlockRegistry, RegistryError};

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub trees: Trees,
    #[serde(default = "default_lodes")]
    pub lodes: Vec<LodeDef>,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            terrain: Terrain::default(),
            trees: Trees::default(),
            lodes: default_lodes(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Terrain {
    /// Amplitude multiplied into the height noise.
    #[serde(default = "default_terrain_height")]
    pub terrain_height: f32,
    #[serde(default = "default_terrain_scale")]
    pub terrain_scale: f32,
    #[serde(default = "default_solid_ground_height")]
    pub solid_ground_height: i32,
    #[serde(default = "default_subsoil_depth")]
    pub subsoil_depth: i32,
    #[serde(default = "default_surface_block")]
    pub surface_block: String,
    #[serde(default = "default_subsoil_block")]
    pub subsoil_block: String,
    #[serde(default = "default_base_block")]
    pub base_block: String,
    #[serde(default = "default_floor_block")]
    pub floor_block: String,
}
fn default_terrain_height() -> f32 {
    42.0
}
fn default_terrain_scale() -> f32 {
    0.25
}
fn default_solid_ground_height() -> i32 {
    42
}
fn default_subsoil_depth() -> i32 {
    4
}
fn default_surface_block() -> String {
    "grass".into()
}
fn default_subsoil_block() -> String {
    "dirt".into()
}
fn default_base_block() -> String {
    "stone".into()
}
fn default_floor_block() -> String {
    "bedrock".into()
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            terrain_height: default_terrain_height(),
            terrain_scale: default_terrain_scale(),
            solid_ground_height: default_solid_ground_height(),
            subsoil_depth: default_subsoil_depth(),
            surface_block: default_surface_block(),
            subsoil_block: default_subsoil_block(),
            base_block: default_base_block(),
            floor_block: default_floor_block(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trees {
    #[serde(default = "default_zone_scale")]
    pub zone_scale: f32,
    #[serde(default = "default_zone_threshold")]
    pub zone_threshold: f32,
    #[serde(default = "default_placement_scale")]
    pub placement_scale: f32,
    #[serde(default = "default_placement_threshold")]
    pub placement_threshold: f32,
    #[serde(default = "default_min_tree_height")]
    pub min_height: i32,
    #[serde(default = "default_max_tree_height")]
    pub max_height: i32,
    #[serde(default = "default_trunk_block")]
    pub trunk_block: String,
    #[serde(default = "default_leaves_block")]
    pub leaves_block: String,
}
fn default_zone_scale() -> f32 {
    1.3
}
fn default_zone_threshold() -> f32 {
    0.6
}
fn default_placement_scale() -> f32 {
    15.0
}
fn default_placement_threshold() -> f32 {
    0.8
}
fn default_min_tree_height() -> i32 {
    5
}
fn default_max_tree_height() -> i32 {
    12
}
fn default_trunk_block() -> String {
    "wood".into()
}
fn default_leaves_block() -> String {
    "leaves".into()
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            zone_scale: default_zone_scale(),
            zone_threshold: default_zone_threshold(),
            placement_scale: default_placement_scale(),
            placement_threshold: default_placement_threshold(),
            min_height: default_min_tree_height(),
            max_height: default_max_tree_height(),
            trunk_block: default_trunk_block(),
            leaves_block: default_leaves_block(),
        }
    }
}

/// Ore or pocket placed inside base stone.
#[derive(Clone, Debug, Deserialize)]
pub struct LodeDef {
    #[serde(default)]
    pub name: String,
    pub block: String,
    pub min_height: i32,
    pub max_height: i32,
    pub scale: f32,
    pub threshold: f32,
    #[serde(default)]
    pub noise_offset: f32,
}

fn lode(name: &str, block: &str, min: i32, max: i32, scale: f32, thr: f32, off: f32) -> LodeDef {
    LodeDef {
        name: name.into(),
        block: block.into(),
        min_height: min,
        max_height: max,
        scale,
        threshold: thr,
        noise_offset: off,
    }
}

fn default_lodes() -> Vec<LodeDef> {
    vec![
        lode("dirt", "dirt", 1, 255, 0.1, 0.5, 0.0),
        lode("sand", "sand", 30, 60, 0.2, 0.6, 500.0),
        lode("coal", "coal_ore", 5, 60, 0.2, 0.65, 200.0),
        lode("caves", "air", 5, 60, 0.1, 0.55, 43534.0),
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeParams {
    pub zone_scale: f32,
    pub zone_threshold: f32,
    pub placement_scale: f32,
    pub placement_threshold: f32,
    pub min_height: i32,
    pub max_height: i32,
    pub trunk_block: BlockId,
    pub leaves_block: BlockId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lode {
    pub name: String,
    pub block: BlockId,
    pub min_height: i32,
    pub max_height: i32,
    pub scale: f32,
    pub threshold: f32,
    pub noise_offset: f32,
}

impl Lode {
    /// Strict band: `min_height < y < max_height`.
    #[inline]
    pub fn in_band(&self, y: i32) -> bool {
        y > self.min_height && y < self.max_height
    }
}

/// Worldgen config with block names resolved to ids.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldGenParams {
    pub terrain_height: f32,
    pub terrain_scale: f32,
    pub solid_ground_height: i32,
    pub subsoil_depth: i32,
    pub surface_block: BlockId,
    pub subsoil_block: BlockId,
    pub base_block: BlockId,
    pub floor_block: BlockId,
    pub trees: TreeParams,
    pub lodes: Vec<Lode>,
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig, reg: &BlockRegistry) -> Result<Self, RegistryError> {
        let t = &cfg.terrain;
        let lodes = cfg
            .lodes
            .iter()
            .map(|l| {
                Ok(Lode {
                    name: if l.name.is_empty() {
                        l.block.clone()
                    } else {
                        l.name.clone()
                    },
                    block: reg.require(&l.block)?,
                    min_height: l.min_height,
                    max_height: l.max_height,
                    scale: l.scale,
                    threshold: l.threshold,
                    noise_offset: l.noise_offset,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(Self {
            terrain_height: t.terrain_height,
            terrain_scale: t.terrain_scale,
            solid_ground_height: t.solid_ground_height,
            subsoil_depth: t.subsoil_depth,
            surface_block: reg.require(&t.surface_block)?,
            subsoil_block: reg.require(&t.subsoil_block)?,
            base_block: reg.require(&t.base_block)?,
            floor_block: reg.require(&t.floor_block)?,
            trees: TreeParams {
                zone_scale: cfg.trees.zone_scale,
                zone_threshold: cfg.trees.zone_threshold,
                placement_scale: cfg.trees.placement_scale,
                placement_threshold: cfg.trees.placement_threshold,
                min_height: cfg.trees.min_height,
                max_height: cfg.trees.max_height.max(cfg.trees.min_height),
                trunk_block: reg.require(&cfg.trees.trunk_block)?,
                leaves_block: reg.require(&cfg.trees.leaves_block)?,
            },
            lodes,
        })
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldGenConfig = toml::from_str(&s)?;
    Ok(cfg)
}

pub fn load_params_from_path(
    path: &Path,
    reg: &BlockRegistry,
) -> Result<WorldGenParams, Box<dyn Error>> {
    let cfg = load_config_from_path(path)?;
    Ok(WorldGenParams::from_config(&cfg, reg)?)
}
