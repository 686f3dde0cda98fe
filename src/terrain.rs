//! Island height fields.
//!
//! A [`HeightField`] turns a [`NoiseField`] and a [`BiomeProfile`] into a
//! bounded island: a noisy coastline mask, layered relief, carved roads,
//! a radial edge falloff, temple plateaus and finally voxel terraces.
//!
//! Two heights are exposed per point:
//!
//! - [`Terrain::height`] is the stepped, voxel-quantized surface the mesh is
//!   built from.
//! - [`Terrain::smooth_height`] is the same pipeline without the final
//!   quantization. Physics contacts and normals use it, because integrating
//!   against a staircase makes bodies bounce on every terrace edge.
//!
//! The pipeline runs in a fixed order for every biome:
//! mask → octaves → roads → edge falloff → nearest plateau → clamp → quantize.

use bevy::log::debug;
use bevy::math::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::biome::{Biome, BiomeProfile};
use crate::error::TerrainError;
use crate::noise::NoiseField;

/// Stencil half-width used when a terrain does not pick its own.
pub const DEFAULT_NORMAL_EPSILON: f64 = 2.5;

/// Domain offsets for the coastline noise, kept away from the relief octaves.
const MASK_OFFSET: (f64, f64) = (913.7, -271.3);

/// Ground queries shared by rendering, physics and creature steering.
///
/// Implementations must be pure: the same `(x, z)` always yields the same
/// answer, so independent systems can re-derive the ground without sharing
/// mutable state.
pub trait Terrain: Send + Sync {
    /// Visual (possibly stepped) ground height.
    fn height(&self, x: f64, z: f64) -> f64;

    /// Continuous ground height for physics contact.
    fn smooth_height(&self, x: f64, z: f64) -> f64 {
        self.height(x, z)
    }

    /// Half-width of the finite-difference stencil behind [`Terrain::normal`].
    fn normal_epsilon(&self) -> f64 {
        DEFAULT_NORMAL_EPSILON
    }

    /// Unit surface normal in the +Y hemisphere, from the smooth height.
    fn normal(&self, x: f64, z: f64) -> DVec3 {
        stencil_normal(|x, z| self.smooth_height(x, z), x, z, self.normal_epsilon())
    }

    /// Whether `(x, z)` lies on a carved road.
    fn is_path(&self, _x: f64, _z: f64) -> bool {
        false
    }

    /// Water surface height; ground below it is sea.
    fn sea_level(&self) -> f64 {
        0.0
    }
}

/// Normal from a symmetric four-point stencil of half-width `epsilon`.
///
/// Falls back to +Y when the tangents are degenerate or the inputs are not
/// finite.
pub fn stencil_normal(sample: impl Fn(f64, f64) -> f64, x: f64, z: f64, epsilon: f64) -> DVec3 {
    let dh_dx = sample(x + epsilon, z) - sample(x - epsilon, z);
    let dh_dz = sample(x, z + epsilon) - sample(x, z - epsilon);

    let tangent_x = DVec3::new(2.0 * epsilon, dh_dx, 0.0);
    let tangent_z = DVec3::new(0.0, dh_dz, 2.0 * epsilon);

    tangent_z
        .cross(tangent_x)
        .try_normalize()
        .filter(|n| n.y > 0.0)
        .unwrap_or(DVec3::Y)
}

/// A temple or plateau anchor that flattens the ground around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// World-space `(x, z)`.
    pub position: (f64, f64),
    pub plateau_radius: f64,
    pub plateau_height: f64,
    pub ramp_width: f64,
}

impl Feature {
    /// Creates a plateau centred at world `(x, z)`.
    pub fn new(x: f64, z: f64, plateau_radius: f64, plateau_height: f64, ramp_width: f64) -> Self {
        Self {
            position: (x, z),
            plateau_radius,
            plateau_height,
            ramp_width,
        }
    }

    /// Plateau centre as a vector (x = world X, y = world Z).
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.position.0, self.position.1)
    }

    /// Outer edge of the ramp band.
    pub fn reach(&self) -> f64 {
        self.plateau_radius + self.ramp_width
    }

    fn validate(&self, index: usize) -> Result<(), TerrainError> {
        let fail = |reason| Err(TerrainError::InvalidFeature { index, reason });
        let values = [
            self.position.0,
            self.position.1,
            self.plateau_radius,
            self.plateau_height,
            self.ramp_width,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return fail("all fields must be finite");
        }
        if self.plateau_radius < 0.0 {
            return fail("plateau_radius must not be negative");
        }
        if self.ramp_width < 0.0 {
            return fail("ramp_width must not be negative");
        }
        Ok(())
    }

    /// Blends `h` toward the plateau height by distance `d` from the centre.
    fn blend(&self, h: f64, d: f64) -> f64 {
        if d <= self.plateau_radius || self.ramp_width <= 0.0 {
            return self.plateau_height;
        }
        let t = ((d - self.plateau_radius) / self.ramp_width).clamp(0.0, 1.0);
        self.plateau_height + (h - self.plateau_height) * t
    }
}

/// Deterministic voxel-island terrain.
///
/// Immutable after construction; share it by reference (or `Arc`) between
/// every body in the world.
#[derive(Debug, Clone)]
pub struct HeightField {
    noise: NoiseField,
    profile: BiomeProfile,
    size: f64,
    max_radius: f64,
    segments: u32,
    features: Vec<Feature>,
    max_height: f64,
}

impl HeightField {
    /// Builds an [`Biome::Island`] height field.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not finite and positive or a feature is malformed.
    /// Use [`HeightField::with_biome`] to handle the error instead.
    pub fn new(seed: u64, size: f64, features: Vec<Feature>) -> Self {
        Self::with_biome(seed, size, features, Biome::Island).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Builds one of the preset biomes, deriving a biome-specific noise seed.
    pub fn with_biome(
        seed: u64,
        size: f64,
        features: Vec<Feature>,
        biome: Biome,
    ) -> Result<Self, TerrainError> {
        Self::with_profile(biome.derive_seed(seed), size, features, biome.profile())
    }

    /// Builds a height field from an explicit profile. `seed` keys the noise directly.
    pub fn with_profile(
        seed: u64,
        size: f64,
        features: Vec<Feature>,
        profile: BiomeProfile,
    ) -> Result<Self, TerrainError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(TerrainError::InvalidSize(size));
        }
        profile.validate()?;
        for (index, feature) in features.iter().enumerate() {
            feature.validate(index)?;
        }

        let step = profile.voxel_step;
        let upper = features
            .iter()
            .map(|f| f.plateau_height)
            .fold(profile.base_elevation + profile.relief(), f64::max)
            .max(profile.seafloor);
        // Bounds sit on terraces so clamping never breaks quantization.
        let max_height = (upper / step).ceil() * step;

        let max_radius = size * profile.radius_fraction;
        let segments = profile.segments;

        debug!(
            "height field `{}`: seed={seed} size={size} max_radius={max_radius} \
             bounds=[{}, {max_height}] features={}",
            profile.name,
            profile.seafloor,
            features.len()
        );

        Ok(Self {
            noise: NoiseField::new(seed),
            profile,
            size,
            max_radius,
            segments,
            features,
            max_height,
        })
    }

    /// Overrides the baked-mesh resolution.
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments.max(1);
        self
    }

    /// Side of the square world, in world units.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Nominal coastline radius before wobble.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Default grid resolution for baked meshes.
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Plateau anchors, in construction order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// The profile this field was built from.
    pub fn profile(&self) -> &BiomeProfile {
        &self.profile
    }

    /// The noise field behind the relief and the coastline.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Lowest height ever returned: the seafloor.
    pub fn min_height(&self) -> f64 {
        self.profile.seafloor
    }

    /// Highest height ever returned.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Coastline radius along the direction of `(x, z)`.
    pub fn mask_radius(&self, x: f64, z: f64) -> f64 {
        let p = &self.profile;
        let wobble = self.noise.sample(
            x * p.mask_frequency + MASK_OFFSET.0,
            z * p.mask_frequency + MASK_OFFSET.1,
        );
        self.max_radius * (1.0 + wobble * p.mask_wobble)
    }

    /// Road weight in `[0, 1]`, zero outside the island.
    pub fn path_weight(&self, x: f64, z: f64) -> f64 {
        if x.hypot(z) > self.mask_radius(x, z) {
            return 0.0;
        }
        self.profile.paths.weight(x, z, self.max_radius)
    }

    /// Unquantized height: the full pipeline minus the voxel step.
    pub fn raw_height(&self, x: f64, z: f64) -> f64 {
        let p = &self.profile;
        let dist = x.hypot(z);
        let mask = self.mask_radius(x, z);
        if !(dist <= mask) {
            // Also catches NaN input.
            return p.seafloor;
        }

        let mut octaves = p.octaves.iter().map(|o| {
            o.amplitude
                * self
                    .noise
                    .sample(x * o.frequency + o.offset, z * o.frequency + o.offset)
        });
        let broad = octaves.next().unwrap_or(0.0);
        let detail: f64 = octaves.sum();

        // Roads keep the broad shape but lose the detail octaves.
        let road = p.paths.weight(x, z, self.max_radius);
        let mut h = p.base_elevation + broad + detail * (1.0 - road);

        let falloff = (1.0 - dist / mask).max(0.0).powf(p.falloff_exponent);
        h *= falloff;

        if let Some((feature, d)) = self.nearest_feature(x, z) {
            h = feature.blend(h, d);
        }

        h.clamp(p.seafloor, self.max_height)
    }

    /// Nearest feature whose ramp band reaches `(x, z)`, with its distance.
    fn nearest_feature(&self, x: f64, z: f64) -> Option<(&Feature, f64)> {
        let point = DVec2::new(x, z);
        self.features
            .iter()
            .map(|f| (f, f.center().distance(point)))
            .filter(|(f, d)| *d < f.reach() || *d <= f.plateau_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl Terrain for HeightField {
    fn height(&self, x: f64, z: f64) -> f64 {
        self.profile.quantize(self.raw_height(x, z))
    }

    fn smooth_height(&self, x: f64, z: f64) -> f64 {
        self.raw_height(x, z)
    }

    fn normal_epsilon(&self) -> f64 {
        self.profile.normal_epsilon
    }

    fn is_path(&self, x: f64, z: f64) -> bool {
        self.path_weight(x, z) > 0.5
    }
}

/// Level ground at a fixed height; handy for arenas and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlatGround {
    pub height: f64,
}

impl FlatGround {
    /// Creates level ground at `height`.
    pub fn new(height: f64) -> Self {
        Self { height }
    }
}

impl Terrain for FlatGround {
    fn height(&self, _x: f64, _z: f64) -> f64 {
        self.height
    }

    fn normal(&self, _x: f64, _z: f64) -> DVec3 {
        DVec3::Y
    }

    fn sea_level(&self) -> f64 {
        f64::NEG_INFINITY
    }
}
