//! Bevy wiring for the island world.
//!
//! Insert an [`IslandTerrain`] (and optionally [`IslandColliders`]) resource,
//! add [`IslandGroundPlugin`], then spawn entities carrying a
//! [`GroundedBody`], a [`MoveIntent`] and a `Transform`. Creatures that also
//! carry a [`Wanderer`] steer themselves.

use std::sync::Arc;

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::body::GroundedBody;
use crate::collision::CollisionWorld;
use crate::surface::SurfaceSampler;
use crate::terrain::HeightField;
use crate::wander::Wanderer;

/// Shared, read-only terrain for the current world.
#[derive(Resource, Clone)]
pub struct IslandTerrain(pub Arc<HeightField>);

impl IslandTerrain {
    /// Wraps `field` for sharing across systems.
    pub fn new(field: HeightField) -> Self {
        Self(Arc::new(field))
    }
}

/// Static obstacles gathered when the world was built.
#[derive(Resource, Default)]
pub struct IslandColliders(pub CollisionWorld);

/// Per-tick movement request for a [`GroundedBody`].
///
/// `direction.x` is world X, `direction.y` is world Z. `jump` is consumed by
/// the tick that reads it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MoveIntent {
    pub direction: DVec2,
    pub jump: bool,
}

/// Registers the body and wanderer systems.
pub struct IslandGroundPlugin;

impl Plugin for IslandGroundPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (drive_wanderers, integrate_grounded_bodies)
                .chain()
                .run_if(resource_exists::<IslandTerrain>),
        );
    }
}

/// Writes each wanderer's intent for this frame.
pub fn drive_wanderers(
    time: Res<Time>,
    terrain: Res<IslandTerrain>,
    mut creatures: Query<(&mut Wanderer, &GroundedBody, &mut MoveIntent)>,
) {
    let dt = time.delta_secs_f64();
    for (mut wanderer, body, mut intent) in &mut creatures {
        intent.direction = wanderer.steer(dt, body, terrain.0.as_ref());
    }
}

/// Integrates every body and mirrors the result into its `Transform`.
pub fn integrate_grounded_bodies(
    time: Res<Time>,
    terrain: Res<IslandTerrain>,
    colliders: Option<Res<IslandColliders>>,
    mut bodies: Query<(&mut GroundedBody, Option<&mut MoveIntent>, &mut Transform)>,
) {
    let dt = time.delta_secs_f64();
    if dt <= 0.0 {
        return;
    }
    let no_obstacles = CollisionWorld::default();
    let world = colliders.as_deref().map_or(&no_obstacles, |c| &c.0);

    for (mut body, intent, mut transform) in &mut bodies {
        let surface = SurfaceSampler::new(terrain.0.as_ref()).with_stencil(body.config().stencil);
        let (direction, jump) = intent
            .as_deref()
            .map_or((DVec2::ZERO, false), |i| (i.direction, i.jump));

        body.integrate(dt, direction, jump, &surface, world);

        if let Some(mut intent) = intent
            && intent.jump
        {
            intent.jump = false;
        }

        transform.translation = body.position().as_vec3();
        transform.rotation = body.transform_rotation().as_quat();
    }
}
