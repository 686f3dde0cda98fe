//! Avian3D physics colliders for the island.
//!
//! [`build_heightfield_collider`] bakes the smooth ground into an Avian3D
//! `Collider::heightfield`, and [`obstacle_colliders`] turns the
//! [`CollisionWorld`] spheres into tall cylinders, for scenes that also run
//! rigid bodies next to the grounded-body model.

use avian3d::prelude::Collider;
use bevy::prelude::*;

use crate::collision::CollisionWorld;
use crate::terrain::{HeightField, Terrain};

/// Cylinder height used for obstacle colliders.
const OBSTACLE_HEIGHT: f32 = 400.0;

/// Builds an Avian3D `Collider::heightfield` from the smooth island height.
///
/// The collider is centred at the origin of its local space, spanning
/// `[-size/2, size/2]` on X and Z, matching the baked mesh so both can share
/// an identity `Transform`. Samples use [`Terrain::smooth_height`] so rigid
/// bodies meet the same unstepped ground the grounded bodies do.
///
/// # Panics
///
/// Panics if `segments` is zero.
///
/// # Example
///
/// ```ignore
/// use bevy_isle_ground::{HeightField, build_heightfield_collider};
///
/// let field = HeightField::new(42, 5000.0, Vec::new());
/// let collider = build_heightfield_collider(&field, 128);
/// // commands.spawn((collider, RigidBody::Static));
/// ```
pub fn build_heightfield_collider(field: &HeightField, segments: u32) -> Collider {
    assert!(segments >= 1, "heightfield collider needs at least one segment");

    let side = segments as usize + 1;
    let size = field.size();
    let step = size / segments as f64;
    let origin = -size * 0.5;

    // Avian's 3D heightfield expects `heights[row][col]` where:
    //   rows  → subdivisions along X
    //   cols  → subdivisions along Z
    let heights: Vec<Vec<f32>> = (0..side)
        .map(|x| {
            (0..side)
                .map(|z| {
                    field.smooth_height(origin + x as f64 * step, origin + z as f64 * step) as f32
                })
                .collect()
        })
        .collect();

    let scale = Vec3::new(size as f32, 1.0, size as f32);
    Collider::heightfield(heights, scale)
}

/// One static cylinder per obstacle, with the `Transform` that places it.
pub fn obstacle_colliders(world: &CollisionWorld, terrain: &dyn Terrain) -> Vec<(Transform, Collider)> {
    world
        .spheres()
        .iter()
        .map(|sphere| {
            let base = terrain.smooth_height(sphere.center.x, sphere.center.y) as f32;
            let transform = Transform::from_xyz(
                sphere.center.x as f32,
                base + OBSTACLE_HEIGHT * 0.5,
                sphere.center.y as f32,
            );
            (transform, Collider::cylinder(sphere.radius as f32, OBSTACLE_HEIGHT))
        })
        .collect()
}
