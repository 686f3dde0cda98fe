//! Static obstacle collision in the horizontal plane.
//!
//! Trees, ruins and obelisks are tall compared to any body, so obstacles and
//! bodies are both treated as vertical cylinders collapsed to circles. The
//! world is gathered once at build time and only read afterwards.

use bevy::log::debug;
use bevy::math::DVec2;

use crate::error::TerrainError;

/// Extra separation added by [`PushOut::apply`] so a re-query is clear.
pub const CONTACT_SKIN: f64 = 1e-6;

/// A static obstacle footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionSphere {
    /// World-space `(x, z)`.
    pub center: DVec2,
    pub radius: f64,
}

impl CollisionSphere {
    /// Creates an obstacle centred at world `(x, z)`.
    pub fn new(x: f64, z: f64, radius: f64) -> Self {
        Self {
            center: DVec2::new(x, z),
            radius,
        }
    }

    fn validate(&self, index: usize) -> Result<(), TerrainError> {
        if !self.center.is_finite() {
            return Err(TerrainError::InvalidSphere {
                index,
                reason: "center must be finite",
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(TerrainError::InvalidSphere {
                index,
                reason: "radius must be finite and positive",
            });
        }
        Ok(())
    }
}

/// Minimal separation out of the deepest overlapping obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushOut {
    /// Unit vector from the obstacle towards the candidate.
    pub normal: DVec2,
    pub depth: f64,
    /// Index of the obstacle in [`CollisionWorld::spheres`].
    pub sphere: usize,
}

impl PushOut {
    /// Moves `candidate` out of the obstacle along the separation normal.
    pub fn apply(&self, candidate: DVec2) -> DVec2 {
        candidate + self.normal * (self.depth + CONTACT_SKIN)
    }

    /// Removes the into-obstacle component of `velocity`.
    ///
    /// Velocity already moving away is returned unchanged.
    pub fn slide(&self, velocity: DVec2) -> DVec2 {
        let into = velocity.dot(self.normal);
        if into < 0.0 {
            velocity - self.normal * into
        } else {
            velocity
        }
    }
}

/// Flat list of static obstacles.
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    spheres: Vec<CollisionSphere>,
}

impl CollisionWorld {
    /// # Panics
    ///
    /// Panics if any sphere has a non-finite centre or a non-positive radius.
    /// Use [`CollisionWorld::try_new`] to handle the error instead.
    pub fn new(spheres: Vec<CollisionSphere>) -> Self {
        Self::try_new(spheres).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Builds a world, rejecting the first malformed sphere.
    pub fn try_new(spheres: Vec<CollisionSphere>) -> Result<Self, TerrainError> {
        for (index, sphere) in spheres.iter().enumerate() {
            sphere.validate(index)?;
        }
        debug!("collision world: {} spheres", spheres.len());
        Ok(Self { spheres })
    }

    /// Adds an obstacle while the world is still being built.
    pub fn push(&mut self, sphere: CollisionSphere) -> Result<(), TerrainError> {
        sphere.validate(self.spheres.len())?;
        self.spheres.push(sphere);
        Ok(())
    }

    /// Adds several obstacles, stopping at the first malformed one.
    pub fn extend(
        &mut self,
        spheres: impl IntoIterator<Item = CollisionSphere>,
    ) -> Result<(), TerrainError> {
        spheres.into_iter().try_for_each(|s| self.push(s))
    }

    /// All obstacles in insertion order.
    pub fn spheres(&self) -> &[CollisionSphere] {
        &self.spheres
    }

    /// Number of obstacles.
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Whether the world has no obstacles.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Finds the deepest overlap between a circle at `candidate` and any obstacle.
    ///
    /// When several obstacles overlap, the one with the largest penetration
    /// depth wins; ties keep the earlier sphere.
    pub fn resolve(&self, candidate: DVec2, entity_radius: f64) -> Option<PushOut> {
        let mut best: Option<PushOut> = None;

        for (index, sphere) in self.spheres.iter().enumerate() {
            let reach = entity_radius + sphere.radius;
            let offset = candidate - sphere.center;
            let dist_sq = offset.length_squared();
            if dist_sq >= reach * reach {
                continue;
            }

            let dist = dist_sq.sqrt();
            let depth = reach - dist;
            if best.is_some_and(|b| b.depth >= depth) {
                continue;
            }

            // Dead centre has no direction; push along +X.
            let normal = if dist > f64::EPSILON {
                offset / dist
            } else {
                DVec2::X
            };
            best = Some(PushOut {
                normal,
                depth,
                sphere: index,
            });
        }

        best
    }

    /// Repeatedly pushes `candidate` out until it is clear or the budget runs out.
    ///
    /// Handles clusters where leaving one obstacle lands in another.
    pub fn separate(&self, mut candidate: DVec2, entity_radius: f64, max_iterations: usize) -> DVec2 {
        for _ in 0..max_iterations {
            match self.resolve(candidate, entity_radius) {
                Some(push) => candidate = push.apply(candidate),
                None => break,
            }
        }
        candidate
    }
}
