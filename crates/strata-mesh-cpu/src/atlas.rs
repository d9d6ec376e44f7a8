/// Normalized rectangle of one atlas tile. `y` is measured from the bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl AtlasRect {
    /// Tile for a linear atlas index; row 0 is the top row of the sheet.
    pub fn from_index(texture_id: u16, atlas_size_in_blocks: u16) -> Self {
        let n = atlas_size_in_blocks.max(1);
        let row = texture_id / n;
        let col = texture_id - row * n;
        let size = 1.0 / n as f32;
        let x = col as f32 * size;
        let y = 1.0 - row as f32 * size - size;
        Self {
            x,
            y,
            w: size,
            h: size,
        }
    }

    /// UVs in quad vertex order.
    #[inline]
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.x, self.y],
            [self.x, self.y + self.h],
            [self.x + self.w, self.y],
            [self.x + self.w, self.y + self.h],
        ]
    }
}
