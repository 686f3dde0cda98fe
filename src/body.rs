//! Grounded bodies: the shared motion model for the player and every creature.
//!
//! One [`GroundedBody`] per entity, integrated once per tick against a
//! [`SurfaceSampler`] and a [`CollisionWorld`]. Only the numbers in
//! [`BodyConfig`] differ between a player, a dinosaur and a mythical monster.
//!
//! Each tick runs, in order:
//!
//! 1. jump impulse (grounded bodies only)
//! 2. gravity
//! 3. horizontal acceleration, soft speed cap and frame-rate independent friction
//! 4. obstacle check; blocked moves slide along the obstacle instead of stopping
//! 5. commit the horizontal move
//! 6. sample the smooth ground under the new position
//! 7. vertical integration with ground snap
//! 8. slope lean and heading follow

use bevy::log::debug;
use bevy::math::{DQuat, DVec2, DVec3};
use bevy::prelude::Component;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::collision::CollisionWorld;
use crate::error::TerrainError;
use crate::surface::SurfaceSampler;
use crate::terrain::Terrain;

/// Obstacle push-out passes after a slide.
const MAX_SEPARATION_PASSES: usize = 4;

/// Horizontal speeds below this are zeroed so friction settles to rest.
const REST_SPEED: f64 = 1e-3;

/// Horizontal speed below which the heading stops following velocity.
const HEADING_MIN_SPEED: f64 = 0.5;

/// Locomotion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocomotionMode {
    #[default]
    Grounded,
    Airborne,
    /// On the board: grounded, with the mounted profile's constants.
    Mounted,
}

/// Movement constants for one gear (on foot or mounted).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionProfile {
    /// Horizontal acceleration from full intent, units/s².
    pub acceleration: f64,
    pub max_speed: f64,
    /// Decay rate (1/s) of speed in excess of `max_speed`.
    pub speed_damping: f64,
    /// Fraction of horizontal velocity kept per 60 fps frame.
    pub friction: f64,
    /// Height of the body origin above the ground contact.
    pub foot_offset: f64,
    /// Fraction of `acceleration` available while airborne.
    pub air_control: f64,
}

impl MotionProfile {
    fn validate(&self) -> Result<(), TerrainError> {
        let values = [
            self.acceleration,
            self.max_speed,
            self.speed_damping,
            self.friction,
            self.foot_offset,
            self.air_control,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TerrainError::InvalidBody("motion profile values must be finite"));
        }
        if self.acceleration < 0.0 || self.speed_damping < 0.0 {
            return Err(TerrainError::InvalidBody(
                "acceleration and speed_damping must not be negative",
            ));
        }
        if self.max_speed <= 0.0 {
            return Err(TerrainError::InvalidBody("max_speed must be positive"));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(TerrainError::InvalidBody("friction must lie in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.air_control) {
            return Err(TerrainError::InvalidBody("air_control must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Construction-time constants for a grounded body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    /// Collision circle radius.
    pub radius: f64,
    /// Vertical acceleration, negative.
    pub gravity: f64,
    pub jump_impulse: f64,
    /// A grounded body stays grounded when it ends up at most this far above the ground.
    pub ground_snap: f64,
    /// Fraction of the tangential velocity kept when sliding along an obstacle.
    pub restitution: f64,
    /// Slope lean follow rate, 1/s.
    pub lean_rate: f64,
    /// Minimum slerp fraction applied on the landing tick.
    pub landing_lean: f64,
    /// Heading follow rate, 1/s.
    pub turn_rate: f64,
    /// Surface normal stencil half-width.
    pub stencil: f64,
    pub walking: MotionProfile,
    /// `None` for bodies that cannot mount.
    #[serde(default)]
    pub mounted: Option<MotionProfile>,
}

impl BodyConfig {
    /// On-foot explorer with a mountable board.
    pub fn player() -> Self {
        Self {
            radius: 3.5,
            gravity: -140.0,
            jump_impulse: 60.0,
            ground_snap: 1.5,
            restitution: 0.85,
            lean_rate: 8.0,
            landing_lean: 0.5,
            turn_rate: 12.0,
            stencil: 2.5,
            walking: MotionProfile {
                acceleration: 220.0,
                max_speed: 45.0,
                speed_damping: 6.0,
                friction: 0.9,
                foot_offset: 0.0,
                air_control: 0.35,
            },
            mounted: Some(MotionProfile {
                acceleration: 320.0,
                max_speed: 90.0,
                speed_damping: 3.0,
                friction: 0.96,
                foot_offset: 2.5,
                air_control: 0.5,
            }),
        }
    }

    /// Heavy creature: wide footprint, no jump, no mount.
    pub fn dinosaur() -> Self {
        Self {
            radius: 9.0,
            gravity: -140.0,
            jump_impulse: 0.0,
            ground_snap: 3.0,
            restitution: 0.6,
            lean_rate: 4.0,
            landing_lean: 0.3,
            turn_rate: 3.0,
            stencil: 6.0,
            walking: MotionProfile {
                acceleration: 120.0,
                max_speed: 30.0,
                speed_damping: 6.0,
                friction: 0.9,
                foot_offset: 0.0,
                air_control: 0.1,
            },
            mounted: None,
        }
    }

    /// Mid-sized creature with floaty gravity and a jump.
    pub fn mythical() -> Self {
        Self {
            radius: 6.0,
            gravity: -90.0,
            jump_impulse: 50.0,
            ground_snap: 2.0,
            restitution: 0.75,
            lean_rate: 5.0,
            landing_lean: 0.4,
            turn_rate: 5.0,
            stencil: 4.0,
            walking: MotionProfile {
                acceleration: 160.0,
                max_speed: 38.0,
                speed_damping: 5.0,
                friction: 0.91,
                foot_offset: 0.0,
                air_control: 0.25,
            },
            mounted: None,
        }
    }

    /// Rejects non-finite, out-of-range or sign-flipped constants.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let values = [
            self.radius,
            self.gravity,
            self.jump_impulse,
            self.ground_snap,
            self.restitution,
            self.lean_rate,
            self.landing_lean,
            self.turn_rate,
            self.stencil,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TerrainError::InvalidBody("body config values must be finite"));
        }
        if self.radius <= 0.0 {
            return Err(TerrainError::InvalidBody("radius must be positive"));
        }
        if self.gravity >= 0.0 {
            return Err(TerrainError::InvalidBody("gravity must be negative"));
        }
        if self.jump_impulse < 0.0 || self.ground_snap < 0.0 {
            return Err(TerrainError::InvalidBody(
                "jump_impulse and ground_snap must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(TerrainError::InvalidBody("restitution must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.landing_lean) {
            return Err(TerrainError::InvalidBody("landing_lean must lie in [0, 1]"));
        }
        if self.lean_rate < 0.0 || self.turn_rate < 0.0 {
            return Err(TerrainError::InvalidBody("follow rates must not be negative"));
        }
        if self.stencil <= 0.0 {
            return Err(TerrainError::InvalidBody("stencil must be positive"));
        }
        self.walking.validate()?;
        if let Some(mounted) = &self.mounted {
            mounted.validate()?;
        }
        Ok(())
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self::player()
    }
}

/// Per-entity motion state.
#[derive(Component, Debug, Clone)]
pub struct GroundedBody {
    position: DVec3,
    /// Slope tilt relative to world up; heading is kept separately.
    orientation: DQuat,
    heading: f64,
    vertical_velocity: f64,
    horizontal_velocity: DVec2,
    grounded: bool,
    mode: LocomotionMode,
    mounted: bool,
    config: BodyConfig,
}

impl GroundedBody {
    /// Spawns a player-configured body standing on the terrain at `spawn_xz`.
    ///
    /// `spawn_xz.x` is world X and `spawn_xz.y` is world Z.
    pub fn new(spawn_xz: DVec2, terrain: &dyn Terrain) -> Self {
        // Presets are valid by construction.
        Self::spawn(spawn_xz, terrain, BodyConfig::player())
    }

    /// Spawns a body with explicit constants.
    pub fn with_config(
        spawn_xz: DVec2,
        terrain: &dyn Terrain,
        config: BodyConfig,
    ) -> Result<Self, TerrainError> {
        config.validate()?;
        Ok(Self::spawn(spawn_xz, terrain, config))
    }

    fn spawn(spawn_xz: DVec2, terrain: &dyn Terrain, config: BodyConfig) -> Self {
        let ground = SurfaceSampler::new(terrain)
            .with_stencil(config.stencil)
            .sample_smooth(spawn_xz.x, spawn_xz.y);

        Self {
            position: DVec3::new(
                spawn_xz.x,
                ground.height + config.walking.foot_offset,
                spawn_xz.y,
            ),
            orientation: DQuat::from_rotation_arc(DVec3::Y, ground.normal),
            heading: 0.0,
            vertical_velocity: 0.0,
            horizontal_velocity: DVec2::ZERO,
            grounded: true,
            mode: LocomotionMode::Grounded,
            mounted: false,
            config,
        }
    }

    /// World-space position of the body origin.
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Slope tilt relative to world up.
    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    /// Yaw around world up, radians; zero faces -Z.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Full render rotation: slope tilt applied on top of the heading.
    pub fn transform_rotation(&self) -> DQuat {
        self.orientation * DQuat::from_rotation_y(self.heading)
    }

    /// Whether the body rested on the ground after the last tick.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Current locomotion state.
    pub fn mode(&self) -> LocomotionMode {
        self.mode
    }

    /// Whether the mounted profile is selected, grounded or not.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Full velocity, with the vertical component in `y`.
    pub fn velocity(&self) -> DVec3 {
        DVec3::new(
            self.horizontal_velocity.x,
            self.vertical_velocity,
            self.horizontal_velocity.y,
        )
    }

    /// Horizontal velocity (x = world X, y = world Z).
    pub fn horizontal_velocity(&self) -> DVec2 {
        self.horizontal_velocity
    }

    /// Vertical speed, positive upward.
    pub fn vertical_velocity(&self) -> f64 {
        self.vertical_velocity
    }

    /// Constants the body was built with.
    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    /// Collision circle radius.
    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    /// Constants for the current gear.
    pub fn profile(&self) -> &MotionProfile {
        match (&self.config.mounted, self.mounted) {
            (Some(mounted), true) => mounted,
            _ => &self.config.walking,
        }
    }

    /// Height of the body origin above the ground contact for the active profile.
    pub fn foot_offset(&self) -> f64 {
        self.profile().foot_offset
    }

    /// Mounts or dismounts. Returns whether anything changed.
    ///
    /// Position is untouched; the new foot offset takes effect on the next
    /// tick. An airborne body lands in the requested gear.
    pub fn set_mounted(&mut self, mounted: bool) -> bool {
        if mounted == self.mounted {
            return false;
        }
        if mounted && self.config.mounted.is_none() {
            debug!("mount rejected: body has no mounted profile");
            return false;
        }
        self.mounted = mounted;
        if self.grounded {
            self.mode = self.landed_mode();
        }
        true
    }

    /// Flips the mount; returns whether the state changed.
    pub fn toggle_mount(&mut self) -> bool {
        self.set_mounted(!self.mounted)
    }

    /// Moves the body without integrating; it falls from there on the next tick.
    pub fn teleport(&mut self, position: DVec3) {
        self.position = position;
        self.vertical_velocity = 0.0;
        self.horizontal_velocity = DVec2::ZERO;
        self.grounded = false;
        self.mode = LocomotionMode::Airborne;
    }

    /// Adds an external velocity change, e.g. knockback.
    pub fn impulse(&mut self, delta_v: DVec3) {
        if !delta_v.is_finite() {
            return;
        }
        self.horizontal_velocity += DVec2::new(delta_v.x, delta_v.z);
        self.vertical_velocity += delta_v.y;
        if delta_v.y > 0.0 && self.grounded {
            self.grounded = false;
            self.mode = LocomotionMode::Airborne;
        }
    }

    /// Advances the body by `dt` seconds.
    ///
    /// `intent` is the desired horizontal direction (x = world X, y = world Z);
    /// its length is ignored. Non-positive or non-finite `dt` is a no-op.
    pub fn integrate(
        &mut self,
        dt: f64,
        intent: DVec2,
        jump: bool,
        surface: &SurfaceSampler,
        world: &CollisionWorld,
    ) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let profile = *self.profile();

        if jump && self.grounded {
            self.vertical_velocity = self.config.jump_impulse;
            self.grounded = false;
            self.mode = LocomotionMode::Airborne;
        }

        self.vertical_velocity += self.config.gravity * dt;

        let mut velocity = self.steer(intent, dt, &profile);

        let start = DVec2::new(self.position.x, self.position.z);
        let mut candidate = start + velocity * dt;
        if let Some(push) = world.resolve(candidate, self.config.radius) {
            velocity = push.slide(velocity) * self.config.restitution;
            candidate = world.separate(start + velocity * dt, self.config.radius, MAX_SEPARATION_PASSES);
        }
        self.horizontal_velocity = velocity;
        self.position.x = candidate.x;
        self.position.z = candidate.y;

        let ground = surface.sample_smooth(candidate.x, candidate.y);
        let rest = ground.height + profile.foot_offset;

        let was_grounded = self.grounded;
        self.position.y += self.vertical_velocity * dt;
        let gap = self.position.y - rest;
        let landed = gap <= 0.0
            || (was_grounded && self.vertical_velocity <= 0.0 && gap <= self.config.ground_snap);

        if landed {
            self.position.y = rest;
            self.vertical_velocity = 0.0;
            self.grounded = true;
            self.mode = self.landed_mode();
        } else {
            self.grounded = false;
            self.mode = LocomotionMode::Airborne;
        }

        let goal = DQuat::from_rotation_arc(DVec3::Y, ground.normal);
        let mut t = follow_fraction(self.config.lean_rate, dt);
        if landed && !was_grounded {
            t = t.max(self.config.landing_lean);
        }
        self.orientation = self.orientation.slerp(goal, t).normalize();

        self.follow_heading(dt);
    }

    fn landed_mode(&self) -> LocomotionMode {
        if self.mounted {
            LocomotionMode::Mounted
        } else {
            LocomotionMode::Grounded
        }
    }

    /// Next horizontal velocity before obstacle checks.
    fn steer(&self, intent: DVec2, dt: f64, profile: &MotionProfile) -> DVec2 {
        let direction = if intent.is_finite() {
            intent.normalize_or_zero()
        } else {
            DVec2::ZERO
        };
        let control = if self.grounded { 1.0 } else { profile.air_control };

        let mut v = self.horizontal_velocity + direction * profile.acceleration * control * dt;

        // Soft cap: excess speed decays instead of being clipped.
        let speed = v.length();
        if speed > profile.max_speed {
            let excess = speed - profile.max_speed;
            let capped = profile.max_speed + excess * (-profile.speed_damping * dt).exp();
            v *= capped / speed;
        }

        v *= profile.friction.powf(dt * 60.0);

        if v.length() < REST_SPEED {
            DVec2::ZERO
        } else {
            v
        }
    }

    fn follow_heading(&mut self, dt: f64) {
        let v = self.horizontal_velocity;
        if v.length() < HEADING_MIN_SPEED {
            return;
        }
        // Zero heading faces -Z, matching Bevy's forward.
        let target = (-v.x).atan2(-v.y);
        let delta = wrap_angle(target - self.heading);
        self.heading = wrap_angle(self.heading + delta * follow_fraction(self.config.turn_rate, dt));
    }
}

/// Fraction of the remaining gap closed in `dt` by an exponential follow at `rate`.
#[inline]
fn follow_fraction(rate: f64, dt: f64) -> f64 {
    1.0 - (-rate * dt).exp()
}

/// Wraps an angle into `(-PI, PI]`.
#[inline]
fn wrap_angle(a: f64) -> f64 {
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
