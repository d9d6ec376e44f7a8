use std::sync::Arc;

use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::coords::VoxelPos;

/// Seeded Perlin sampler returning values in `[0, 1]`.
///
/// Sampling takes `&self` and keeps no cache, so results depend only on the
/// seed and the arguments. Clones share one underlying generator.
#[derive(Clone)]
pub struct NoiseSampler {
    perlin: Arc<FastNoiseLite>,
    chunk_width: f32,
}

impl NoiseSampler {
    pub fn new(seed: i32, chunk_width: usize) -> Self {
        let mut perlin = FastNoiseLite::with_seed(seed);
        perlin.set_noise_type(Some(NoiseType::Perlin));
        perlin.set_frequency(Some(1.0));
        Self {
            perlin: Arc::new(perlin),
            chunk_width: chunk_width as f32,
        }
    }

    /// Column noise. `scale` is in cycles per chunk; `offset` decorrelates users.
    #[inline]
    pub fn get_2d(&self, x: f32, z: f32, offset: f32, scale: f32) -> f32 {
        // The 0.1 nudge keeps integer lattice points off the zero crossings.
        let nx = (x + 0.1) / self.chunk_width * scale + offset;
        let nz = (z + 0.1) / self.chunk_width * scale + offset;
        ((self.perlin.get_noise_2d(nx, nz) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn get_3d(&self, pos: VoxelPos, offset: f32, scale: f32) -> f32 {
        let x = (pos.x as f32 + offset + 0.1) * scale;
        let y = (pos.y as f32 + offset + 0.1) * scale;
        let z = (pos.z as f32 + offset + 0.1) * scale;
        ((self.perlin.get_noise_3d(x, y, z) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for NoiseSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSampler")
            .field("chunk_width", &self.chunk_width)
            .finish_non_exhaustive()
    }
}
