use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::config::{BlockDef, BlocksConfig};
use super::types::{AIR, BlockId, BlockType};

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("duplicate block name `{0}`")]
    DuplicateName(String),
    #[error("block id {id} assigned to both `{first}` and `{second}`")]
    DuplicateId {
        id: BlockId,
        first: String,
        second: String,
    },
    #[error("block id 0 is reserved for air, `{0}` cannot use it")]
    ReservedAir(String),
    #[error("transparency of `{name}` must lie in [0, 1], got {value}")]
    BadTransparency { name: String, value: f32 },
    #[error("too many block types, ids are limited to 0..=255")]
    TooMany,
    #[error("unknown block `{0}`")]
    UnknownBlock(String),
}

/// Dense id → descriptor table. Slot 0 is always air.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<Option<BlockType>>,
    pub by_name: HashMap<String, BlockId>,
    air: BlockType,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Registry holding only air.
    pub fn new() -> Self {
        let air = BlockType::air();
        let mut by_name = HashMap::new();
        by_name.insert(air.name.clone(), AIR);
        Self {
            blocks: vec![Some(air.clone())],
            by_name,
            air,
        }
    }

    /// The default palette: terrain, ores and the tree blocks.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        let defs = [
            (1, "bedrock", true, [9; 6]),
            (2, "stone", true, [0; 6]),
            (3, "grass", true, [2, 2, 7, 1, 2, 2]),
            (4, "sand", true, [10; 6]),
            (5, "dirt", true, [1; 6]),
            (6, "wood", true, [5, 5, 6, 6, 5, 5]),
            (7, "planks", true, [4; 6]),
            (8, "bricks", true, [11; 6]),
            (9, "cobblestone", true, [8; 6]),
            (12, "coal_ore", true, [12; 6]),
            (13, "iron_ore", true, [13; 6]),
        ];
        for (id, name, solid, textures) in defs {
            reg.insert_unchecked(BlockType {
                id,
                name: name.to_string(),
                solid,
                transparency: 0.0,
                render_neighbor_faces: false,
                textures,
                icon: Some(format!("icons/{name}.png")),
            });
        }
        reg.insert_unchecked(BlockType {
            id: 10,
            name: "glass".to_string(),
            solid: true,
            transparency: 1.0,
            render_neighbor_faces: true,
            textures: [3; 6],
            icon: Some("icons/glass.png".to_string()),
        });
        reg.insert_unchecked(BlockType {
            id: 11,
            name: "leaves".to_string(),
            solid: true,
            transparency: 0.6,
            render_neighbor_faces: true,
            textures: [16; 6],
            icon: Some("icons/leaves.png".to_string()),
        });
        reg
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(s)?;
        Ok(Self::from_config(cfg)?)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, RegistryError> {
        let mut reg = Self::new();
        for def in cfg.blocks.into_iter() {
            if def.name == "air" {
                // Air is intrinsic; a matching entry is accepted and ignored.
                if def.id.unwrap_or(AIR) != AIR || def.solid.unwrap_or(false) {
                    return Err(RegistryError::ReservedAir(def.name));
                }
                continue;
            }
            if reg.by_name.contains_key(&def.name) {
                return Err(RegistryError::DuplicateName(def.name));
            }
            let id = match def.id {
                Some(id) => id,
                None => BlockId::try_from(reg.blocks.len()).map_err(|_| RegistryError::TooMany)?,
            };
            if id == AIR {
                return Err(RegistryError::ReservedAir(def.name));
            }
            if let Some(Some(existing)) = reg.blocks.get(id as usize) {
                return Err(RegistryError::DuplicateId {
                    id,
                    first: existing.name.clone(),
                    second: def.name,
                });
            }
            let ty = compile_def(id, def)?;
            reg.insert_unchecked(ty);
        }
        Ok(reg)
    }

    fn insert_unchecked(&mut self, ty: BlockType) {
        let idx = ty.id as usize;
        if self.blocks.len() <= idx {
            self.blocks.resize(idx + 1, None);
        }
        self.by_name.insert(ty.name.clone(), ty.id);
        self.blocks[idx] = Some(ty);
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize).and_then(|b| b.as_ref())
    }

    /// Descriptor for `id`, treating unregistered ids as air.
    #[inline]
    pub fn descriptor(&self, id: BlockId) -> &BlockType {
        self.get(id).unwrap_or(&self.air)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<BlockId, RegistryError> {
        self.id_by_name(name)
            .ok_or_else(|| RegistryError::UnknownBlock(name.to_string()))
    }

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.descriptor(id).solid
    }

    #[inline]
    pub fn transparency(&self, id: BlockId) -> f32 {
        self.descriptor(id).transparency
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.blocks.iter().filter_map(|b| b.as_ref())
    }
}

fn compile_def(id: BlockId, def: BlockDef) -> Result<BlockType, RegistryError> {
    let solid = def.solid.unwrap_or(true);
    let transparency = def.transparency.unwrap_or(if solid { 0.0 } else { 1.0 });
    if !(0.0..=1.0).contains(&transparency) {
        return Err(RegistryError::BadTransparency {
            name: def.name,
            value: transparency,
        });
    }
    let render_neighbor_faces = def.render_neighbor_faces.unwrap_or(!solid);
    let base = def.texture.unwrap_or(0);
    let textures = match def.faces.as_ref() {
        Some(faces) => faces.resolve(base),
        None => [base; 6],
    };
    Ok(BlockType {
        id,
        name: def.name,
        solid,
        transparency,
        render_neighbor_faces,
        textures,
        icon: def.icon,
    })
}
