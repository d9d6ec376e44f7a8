/// Voxel type identifier. Zero is always air.
pub type BlockId = u8;

pub const AIR: BlockId = 0;

/// Number of faces on a block; texture slots follow back, front, top, bottom, left, right.
pub const FACE_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub solid: bool,
    /// 0 blocks all light, 1 lets it through untouched.
    pub transparency: f32,
    /// Faces of solid blocks next to this one still draw (air, glass, leaves).
    pub render_neighbor_faces: bool,
    /// Atlas indices in face order: back, front, top, bottom, left, right.
    pub textures: [u16; FACE_COUNT],
    pub icon: Option<String>,
}

impl BlockType {
    pub fn air() -> Self {
        Self {
            id: AIR,
            name: "air".to_string(),
            solid: false,
            transparency: 1.0,
            render_neighbor_faces: true,
            textures: [0; FACE_COUNT],
            icon: None,
        }
    }

    #[inline]
    pub fn texture_id(&self, face_index: usize) -> u16 {
        self.textures.get(face_index).copied().unwrap_or(0)
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == AIR
    }

    /// Fully light-blocking solid block.
    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.solid && self.transparency <= 0.0
    }
}
