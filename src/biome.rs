//! Biome presets and the tunable profile behind every height field.
//!
//! A [`BiomeProfile`] is plain data (serde-loadable) describing how a
//! [`HeightField`](crate::HeightField) shapes its island: how far the coast
//! reaches, which noise octaves build the relief, how coarse the voxel
//! terraces are and where roads are carved. [`Biome`] names the three
//! built-in looks and gives each its own seed salt so that two biomes built
//! from the same world seed never share a permutation table.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::TerrainError;

/// One layer of relief: `amplitude * noise(x * frequency + offset, z * frequency + offset)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    pub frequency: f64,
    pub amplitude: f64,
    /// Domain offset so octaves sampled from one permutation table decorrelate.
    #[serde(default)]
    pub offset: f64,
}

impl Octave {
    /// Creates an octave from its frequency, amplitude and domain offset.
    pub const fn new(frequency: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            frequency,
            amplitude,
            offset,
        }
    }
}

/// Where roads are carved into the relief.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathLayout {
    #[default]
    None,
    /// Straight roads radiating from the island centre.
    Radial {
        spokes: u32,
        /// Full road width in world units.
        width: f64,
        /// Blend band outside the road edge, in world units.
        feather: f64,
        /// Angle of the first spoke, radians.
        phase: f64,
    },
    /// A circular road at `radius_fraction * max_radius`.
    Ring {
        radius_fraction: f64,
        width: f64,
        feather: f64,
    },
}

impl PathLayout {
    /// Road weight in `[0, 1]` at `(x, z)`; `1` on the road, `0` well away from it.
    pub fn weight(&self, x: f64, z: f64, max_radius: f64) -> f64 {
        let (distance, width, feather) = match *self {
            PathLayout::None => return 0.0,
            PathLayout::Radial {
                spokes,
                width,
                feather,
                phase,
            } => {
                if spokes == 0 {
                    return 0.0;
                }
                let r = x.hypot(z);
                let sector = TAU / spokes as f64;
                let angle = z.atan2(x);
                let nearest = phase + ((angle - phase) / sector).round() * sector;
                // Perpendicular distance to the nearest spoke's ray.
                let delta = angle - nearest;
                let d = if delta.cos() > 0.0 {
                    r * delta.sin().abs()
                } else {
                    r
                };
                (d, width, feather)
            }
            PathLayout::Ring {
                radius_fraction,
                width,
                feather,
            } => {
                let r = x.hypot(z);
                ((r - radius_fraction * max_radius).abs(), width, feather)
            }
        };

        let half = width * 0.5;
        if distance <= half {
            1.0
        } else if feather <= 0.0 {
            0.0
        } else {
            1.0 - smoothstep(0.0, 1.0, (distance - half) / feather)
        }
    }
}

/// Everything that distinguishes one island's relief from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeProfile {
    pub name: String,
    /// `max_radius = size * radius_fraction`.
    pub radius_fraction: f64,
    /// Coastline perturbation as a fraction of `max_radius`. Must stay below `0.5`.
    pub mask_wobble: f64,
    pub mask_frequency: f64,
    /// Height returned outside the island mask. Must be a multiple of `voxel_step`.
    pub seafloor: f64,
    pub base_elevation: f64,
    pub octaves: Vec<Octave>,
    pub voxel_step: f64,
    pub falloff_exponent: f64,
    /// Half-width of the finite-difference stencil used for normals.
    pub normal_epsilon: f64,
    #[serde(default)]
    pub paths: PathLayout,
    /// Grid resolution for baked meshes.
    pub segments: u32,
}

impl BiomeProfile {
    /// Tropical island: broad hills, 10-unit terraces, no roads.
    pub fn island() -> Self {
        Self {
            name: "island".into(),
            radius_fraction: 0.45,
            mask_wobble: 0.08,
            mask_frequency: 0.0015,
            seafloor: -60.0,
            base_elevation: 30.0,
            octaves: vec![
                Octave::new(0.0008, 110.0, 0.0),
                Octave::new(0.003, 40.0, 17.3),
                Octave::new(0.012, 10.0, -41.9),
            ],
            voxel_step: 10.0,
            falloff_exponent: 0.55,
            normal_epsilon: 2.5,
            paths: PathLayout::None,
            segments: 256,
        }
    }

    /// Roman ruins: higher plateaus, coarse 12-unit steps, six roads from the forum.
    pub fn roman() -> Self {
        Self {
            name: "roman".into(),
            radius_fraction: 0.42,
            mask_wobble: 0.06,
            mask_frequency: 0.0012,
            seafloor: -84.0,
            base_elevation: 45.0,
            octaves: vec![
                Octave::new(0.0008, 90.0, 5.1),
                Octave::new(0.003, 35.0, -23.7),
                Octave::new(0.012, 8.0, 61.2),
            ],
            voxel_step: 12.0,
            falloff_exponent: 0.5,
            normal_epsilon: 3.0,
            paths: PathLayout::Radial {
                spokes: 6,
                width: 28.0,
                feather: 16.0,
                phase: 0.3,
            },
            segments: 256,
        }
    }

    /// Comic island: small, bumpy, fine 6-unit steps and a ring road.
    pub fn comic() -> Self {
        Self {
            name: "comic".into(),
            radius_fraction: 0.40,
            mask_wobble: 0.1,
            mask_frequency: 0.002,
            seafloor: -54.0,
            base_elevation: 18.0,
            octaves: vec![
                Octave::new(0.001, 72.0, -8.4),
                Octave::new(0.004, 30.0, 33.3),
                Octave::new(0.015, 9.0, 12.9),
            ],
            voxel_step: 6.0,
            falloff_exponent: 0.6,
            normal_epsilon: 2.5,
            paths: PathLayout::Ring {
                radius_fraction: 0.55,
                width: 24.0,
                feather: 12.0,
            },
            segments: 192,
        }
    }

    /// Sum of octave amplitudes, the largest deviation noise can add to the base.
    pub fn relief(&self) -> f64 {
        self.octaves.iter().map(|o| o.amplitude.abs()).sum()
    }

    /// Snaps `h` to the nearest voxel terrace.
    #[inline]
    pub fn quantize(&self, h: f64) -> f64 {
        (h / self.voxel_step).round() * self.voxel_step
    }

    /// Rejects profiles that would produce degenerate or unbounded terrain.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let fail = |reason| {
            Err(TerrainError::InvalidProfile {
                profile: self.name.clone(),
                reason,
            })
        };

        let scalars = [
            self.radius_fraction,
            self.mask_wobble,
            self.mask_frequency,
            self.seafloor,
            self.base_elevation,
            self.voxel_step,
            self.falloff_exponent,
            self.normal_epsilon,
        ];
        if scalars.iter().any(|v| !v.is_finite()) {
            return fail("all parameters must be finite");
        }
        if self.voxel_step <= 0.0 {
            return fail("voxel_step must be positive");
        }
        if !is_multiple(self.seafloor, self.voxel_step) {
            return fail("seafloor must be a multiple of voxel_step");
        }
        if self.radius_fraction <= 0.0 || self.radius_fraction > 1.0 {
            return fail("radius_fraction must lie in (0, 1]");
        }
        if !(0.0..0.5).contains(&self.mask_wobble) {
            return fail("mask_wobble must lie in [0, 0.5)");
        }
        if self.falloff_exponent <= 0.0 {
            return fail("falloff_exponent must be positive");
        }
        if self.normal_epsilon <= 0.0 {
            return fail("normal_epsilon must be positive");
        }
        if self.octaves.is_empty() {
            return fail("at least one octave is required");
        }
        if self
            .octaves
            .iter()
            .any(|o| !(o.frequency.is_finite() && o.amplitude.is_finite() && o.offset.is_finite()))
        {
            return fail("octave parameters must be finite");
        }
        if self.segments == 0 {
            return fail("segments must be at least 1");
        }
        Ok(())
    }
}

impl Default for BiomeProfile {
    fn default() -> Self {
        Self::island()
    }
}

/// The built-in biomes, selected once when a world is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    Island,
    Roman,
    Comic,
}

impl Biome {
    /// The tunable profile behind this preset.
    pub fn profile(self) -> BiomeProfile {
        match self {
            Biome::Island => BiomeProfile::island(),
            Biome::Roman => BiomeProfile::roman(),
            Biome::Comic => BiomeProfile::comic(),
        }
    }

    /// Per-biome salt mixed into the world seed.
    pub fn salt(self) -> u64 {
        match self {
            Biome::Island => 0x151A_0D00,
            Biome::Roman => 0x0_0CA7_0A11,
            Biome::Comic => 0xC0_31C0,
        }
    }

    /// Derives this biome's noise seed from a shared world seed.
    pub fn derive_seed(self, world_seed: u64) -> u64 {
        let mut hash = world_seed ^ self.salt();
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        hash
    }
}

fn is_multiple(value: f64, step: f64) -> bool {
    let snapped = (value / step).round() * step;
    (snapped - value).abs() <= 1e-9 * step.max(1.0)
}

#[inline]
fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
