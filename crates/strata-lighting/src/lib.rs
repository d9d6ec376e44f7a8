//! In-chunk light: top-down column rays plus a decaying flood fill.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use serde::Deserialize;
use strata_blocks::{AIR, BlockRegistry};
use strata_chunk::ChunkBuf;
use strata_world::Face;
use strata_world::voxel_data::{LIGHT_FALLOFF, MAX_LIGHT_LEVEL, MIN_LIGHT_LEVEL};

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct LightingParams {
    /// Step lost per flood-fill hop; also the threshold below which cells stop spreading.
    #[serde(default = "default_falloff")]
    pub falloff: f32,
    #[serde(default = "default_min_light")]
    pub min_light_level: f32,
    #[serde(default = "default_max_light")]
    pub max_light_level: f32,
}

fn default_falloff() -> f32 {
    LIGHT_FALLOFF
}
fn default_min_light() -> f32 {
    MIN_LIGHT_LEVEL
}
fn default_max_light() -> f32 {
    MAX_LIGHT_LEVEL
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            falloff: LIGHT_FALLOFF,
            min_light_level: MIN_LIGHT_LEVEL,
            max_light_level: MAX_LIGHT_LEVEL,
        }
    }
}

impl LightingParams {
    /// Maps a light percent onto the `[min_light_level, max_light_level]` shading range.
    #[inline]
    pub fn shade(&self, light: f32) -> f32 {
        let l = light.clamp(0.0, 1.0);
        self.min_light_level + (self.max_light_level - self.min_light_level) * l
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightStats {
    /// Cells that started the flood fill.
    pub seeds: usize,
    /// Cells raised by the flood fill.
    pub raised: usize,
}

/// Recomputes every cell's light in place. Previous values are discarded.
pub fn compute_light(buf: &mut ChunkBuf, reg: &BlockRegistry, params: &LightingParams) -> LightStats {
    let (w, h) = (buf.width, buf.height);
    let falloff = params.falloff;
    let mut queue: VecDeque<(usize, usize, usize)> = VecDeque::new();
    let mut stats = LightStats::default();

    for x in 0..w {
        for z in 0..w {
            let mut ray = 1.0f32;
            for y in (0..h).rev() {
                let cell = buf.get_local(x, y, z);
                if cell.id != AIR {
                    let t = reg.transparency(cell.id);
                    if t < ray {
                        ray = t;
                    }
                }
                buf.set_light_local(x, y, z, ray);
                if ray > falloff {
                    queue.push_back((x, y, z));
                }
            }
        }
    }
    stats.seeds = queue.len();

    while let Some((x, y, z)) = queue.pop_front() {
        let spread = buf.light_local(x, y, z) - falloff;
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
            if !buf.in_bounds_local(nx, ny, nz) {
                continue;
            }
            let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
            if buf.light_local(nx, ny, nz) < spread {
                buf.set_light_local(nx, ny, nz, spread);
                stats.raised += 1;
                if spread > falloff {
                    queue.push_back((nx, ny, nz));
                }
            }
        }
    }

    log::trace!(
        target: "perf",
        "light_chunk cx={} cz={} seeds={} raised={}",
        buf.coord.cx,
        buf.coord.cz,
        stats.seeds,
        stats.raised
    );
    stats
}
