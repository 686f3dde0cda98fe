//! Physics-facing ground sampling.
//!
//! Render geometry may be stepped; physics contact height must not be.
//! [`SurfaceSampler`] always reads [`Terrain::smooth_height`], never the
//! voxel-quantized [`Terrain::height`].

use bevy::math::DVec3;

use crate::terrain::{DEFAULT_NORMAL_EPSILON, Terrain, stencil_normal};

/// Ground height and orientation under a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub height: f64,
    pub normal: DVec3,
}

/// Smoothed height/normal queries over a shared terrain.
///
/// The stencil width is per sampler so wide creatures can average over a
/// larger footprint than the player.
#[derive(Clone, Copy)]
pub struct SurfaceSampler<'a> {
    terrain: &'a dyn Terrain,
    stencil: f64,
}

impl<'a> SurfaceSampler<'a> {
    /// Stencil used when the terrain reports an unusable one.
    pub const DEFAULT_STENCIL: f64 = DEFAULT_NORMAL_EPSILON;

    /// Samples `terrain` with its own [`Terrain::normal_epsilon`], so
    /// [`SurfaceSampler::normal`] agrees with [`Terrain::normal`] until a
    /// stencil is set explicitly.
    pub fn new(terrain: &'a dyn Terrain) -> Self {
        let epsilon = terrain.normal_epsilon();
        let stencil = if epsilon.is_finite() && epsilon > 0.0 {
            epsilon
        } else {
            Self::DEFAULT_STENCIL
        };
        Self { terrain, stencil }
    }

    /// Sets the finite-difference half-width. Non-positive values are ignored.
    pub fn with_stencil(mut self, epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            self.stencil = epsilon;
        }
        self
    }

    /// Current finite-difference half-width.
    pub fn stencil(&self) -> f64 {
        self.stencil
    }

    /// The terrain being sampled.
    pub fn terrain(&self) -> &'a dyn Terrain {
        self.terrain
    }

    /// Smooth height and normal at `(x, z)`.
    pub fn sample_smooth(&self, x: f64, z: f64) -> SurfaceSample {
        SurfaceSample {
            height: self.terrain.smooth_height(x, z),
            normal: self.normal(x, z),
        }
    }

    /// Unit normal of the smooth surface at `(x, z)`.
    pub fn normal(&self, x: f64, z: f64) -> DVec3 {
        stencil_normal(|x, z| self.terrain.smooth_height(x, z), x, z, self.stencil)
    }

    /// Angle between the ground normal and world up, in radians.
    pub fn slope(&self, x: f64, z: f64) -> f64 {
        self.normal(x, z).y.clamp(-1.0, 1.0).acos()
    }
}

impl std::fmt::Debug for SurfaceSampler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceSampler")
            .field("stencil", &self.stencil)
            .finish_non_exhaustive()
    }
}
