//! Procedural voxel islands and grounded-entity motion for Bevy.
//!
//! The crate has a pure double-precision core and a thin Bevy layer on top.
//!
//! # Core
//!
//! - **Noise**: seeded 2D Perlin noise ([`NoiseField`]).
//! - **Terrain**: [`HeightField`] builds a bounded island from noise octaves,
//!   a wobbly coastline mask, carved roads, temple plateaus ([`Feature`]) and
//!   voxel terraces. Three presets are available through [`Biome`].
//! - **Surface sampling**: [`SurfaceSampler`] reads the *unstepped* height and
//!   normal for physics, so bodies glide over terraces instead of bouncing.
//! - **Obstacles**: [`CollisionWorld`] resolves circle overlaps against static
//!   obstacles, reporting the deepest penetration as a [`PushOut`].
//! - **Bodies**: [`GroundedBody`] is the shared motion model for the player
//!   and every creature: gravity, jumps, friction, sliding collisions, ground
//!   snap and slope lean. [`Wanderer`] drives creatures around the island.
//!
//! # Bevy layer
//!
//! - **Mesh baking**: [`HeightFieldMeshBuilder`] turns a height field into a
//!   Bevy [`Mesh`](bevy::prelude::Mesh) with area-weighted normals.
//! - **Splat textures**: [`SplatWeights`] classifies sand, grass, rock and
//!   road; [`splat_to_image`] uploads them as an RGBA8 texture.
//! - **Plugin**: [`IslandGroundPlugin`] integrates every [`GroundedBody`] each
//!   frame and mirrors it into its `Transform`.
//! - **Physics colliders** (optional, `physics` feature): Avian3D
//!   heightfield and obstacle colliders via [`collider`].
//!
//! # Example
//!
//! ```ignore
//! use bevy::math::DVec2;
//! use bevy_isle_ground::{
//!     CollisionSphere, CollisionWorld, Feature, GroundedBody, HeightField, SurfaceSampler,
//! };
//!
//! let field = HeightField::new(42, 5000.0, vec![Feature::new(100.0, 100.0, 50.0, 150.0, 40.0)]);
//! let world = CollisionWorld::new(vec![CollisionSphere::new(300.0, 0.0, 15.0)]);
//! let surface = SurfaceSampler::new(&field);
//!
//! let mut player = GroundedBody::new(DVec2::new(0.0, 500.0), &field);
//! player.integrate(1.0 / 60.0, DVec2::new(0.0, 1.0), false, &surface, &world);
//! ```

pub mod biome;
pub mod body;
pub mod collision;
pub mod error;
pub mod mesher;
pub mod noise;
pub mod plugin;
pub mod splat;
pub mod surface;
pub mod terrain;
pub mod wander;

#[cfg(feature = "physics")]
pub mod collider;

pub use biome::{Biome, BiomeProfile, Octave, PathLayout};
pub use body::{BodyConfig, GroundedBody, LocomotionMode, MotionProfile};
pub use collision::{CollisionSphere, CollisionWorld, PushOut};
pub use error::TerrainError;
pub use mesher::HeightFieldMeshBuilder;
pub use noise::{NoiseField, NoiseSeed};
pub use plugin::{IslandColliders, IslandGroundPlugin, IslandTerrain, MoveIntent};
pub use splat::{GroundMaterialSettings, SplatTexture, SplatWeights, splat_to_image, sync_splat_texture};
pub use surface::{SurfaceSample, SurfaceSampler};
pub use terrain::{Feature, FlatGround, HeightField, Terrain, stencil_normal};
pub use wander::Wanderer;

#[cfg(feature = "physics")]
pub use collider::{build_heightfield_collider, obstacle_colliders};
