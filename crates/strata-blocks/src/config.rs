use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u8>,
    #[serde(default)]
    pub solid: Option<bool>,
    #[serde(default)]
    pub transparency: Option<f32>,
    #[serde(default)]
    pub render_neighbor_faces: Option<bool>,
    /// Atlas index used for every face not overridden in `faces`.
    #[serde(default)]
    pub texture: Option<u16>,
    #[serde(default)]
    pub faces: Option<FaceTextures>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FaceTextures {
    #[serde(default)]
    pub back: Option<u16>,
    #[serde(default)]
    pub front: Option<u16>,
    #[serde(default)]
    pub top: Option<u16>,
    #[serde(default)]
    pub bottom: Option<u16>,
    #[serde(default)]
    pub left: Option<u16>,
    #[serde(default)]
    pub right: Option<u16>,
    /// Shorthand for back, front, left and right.
    #[serde(default)]
    pub side: Option<u16>,
}

impl FaceTextures {
    pub fn resolve(&self, fallback: u16) -> [u16; 6] {
        let side = self.side.unwrap_or(fallback);
        [
            self.back.unwrap_or(side),
            self.front.unwrap_or(side),
            self.top.unwrap_or(fallback),
            self.bottom.unwrap_or(fallback),
            self.left.unwrap_or(side),
            self.right.unwrap_or(side),
        ]
    }
}
