//! Autonomous roaming intent for creatures.
//!
//! A [`Wanderer`] only produces the horizontal intent a creature's
//! [`GroundedBody`](crate::GroundedBody) is integrated with; the body does the
//! physics. Waypoints are drawn from a seeded ChaCha stream, so a herd
//! spawned with the same seeds roams identically on every run.

use bevy::math::DVec2;
use bevy::prelude::Component;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

use crate::body::GroundedBody;
use crate::terrain::Terrain;

/// Waypoint draws attempted before falling back to home.
const WAYPOINT_ATTEMPTS: usize = 8;

/// Picks dry-land waypoints around a home point and steers toward them.
#[derive(Component, Debug, Clone)]
pub struct Wanderer {
    rng: ChaCha8Rng,
    home: DVec2,
    roam_radius: f64,
    arrive_distance: f64,
    /// Seconds allowed per waypoint before giving up on it.
    patience: f64,
    /// Min/max pause at each waypoint, seconds.
    rest: (f64, f64),
    /// Required height above sea level for a waypoint or the next step.
    shore_margin: f64,
    /// Distance ahead checked for water.
    probe: f64,
    waypoint: Option<DVec2>,
    elapsed: f64,
    resting: f64,
}

impl Wanderer {
    /// Creates a wanderer roaming within `roam_radius` of `home`, keyed by `seed`.
    pub fn new(seed: u64, home: DVec2, roam_radius: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            home,
            roam_radius: roam_radius.abs(),
            arrive_distance: 12.0,
            patience: 20.0,
            rest: (1.0, 4.0),
            shore_margin: 2.0,
            probe: 15.0,
            waypoint: None,
            elapsed: 0.0,
            resting: 0.0,
        }
    }

    /// Distance at which a waypoint counts as reached.
    pub fn with_arrive_distance(mut self, distance: f64) -> Self {
        self.arrive_distance = distance.max(0.0);
        self
    }

    /// Seconds spent chasing one waypoint before drawing another.
    pub fn with_patience(mut self, seconds: f64) -> Self {
        self.patience = seconds.max(0.0);
        self
    }

    /// Pause range at each waypoint. Reversed bounds are swapped.
    pub fn with_rest(mut self, min: f64, max: f64) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rest = (lo.max(0.0), hi.max(0.0));
        self
    }

    /// Centre of the roaming disc.
    pub fn home(&self) -> DVec2 {
        self.home
    }

    /// Current target, if one is drawn.
    pub fn waypoint(&self) -> Option<DVec2> {
        self.waypoint
    }

    /// Whether the creature is pausing at a reached waypoint.
    pub fn is_resting(&self) -> bool {
        self.resting > 0.0
    }

    /// Intent for this tick given the creature's body.
    ///
    /// The intent drops to zero once friction alone would carry the body
    /// into the arrival radius, so creatures coast in instead of overshooting
    /// the waypoint.
    pub fn steer(&mut self, dt: f64, body: &GroundedBody, terrain: &dyn Terrain) -> DVec2 {
        let position = body.position();
        let here = DVec2::new(position.x, position.z);

        if self.resting > 0.0 {
            self.resting -= dt;
            return DVec2::ZERO;
        }

        self.elapsed += dt;
        if self.waypoint.is_none() || self.elapsed > self.patience {
            self.waypoint = Some(self.pick_waypoint(terrain));
            self.elapsed = 0.0;
        }
        let Some(target) = self.waypoint else {
            return DVec2::ZERO;
        };

        let to_target = target - here;
        let remaining = to_target.length();
        if remaining <= self.arrive_distance {
            self.waypoint = None;
            self.resting = self.draw_rest();
            return DVec2::ZERO;
        }

        let direction = to_target / remaining;
        let ahead = here + direction * self.probe;
        if !self.is_dry(terrain, ahead) {
            // Coast ahead: abandon and draw a new waypoint next tick.
            self.waypoint = None;
            return DVec2::ZERO;
        }

        // Aim to stop halfway inside the arrival radius.
        let brake_at = remaining - self.arrive_distance * 0.5;
        if coast_distance(body, direction, dt) >= brake_at {
            return DVec2::ZERO;
        }
        direction
    }

    fn pick_waypoint(&mut self, terrain: &dyn Terrain) -> DVec2 {
        for _ in 0..WAYPOINT_ATTEMPTS {
            let angle = self.rng.gen_range(0.0..TAU);
            // sqrt keeps draws uniform over the disc.
            let r = self.roam_radius * self.rng.gen_range(0.0f64..1.0).sqrt();
            let candidate = self.home + DVec2::new(angle.cos(), angle.sin()) * r;
            if self.is_dry(terrain, candidate) {
                return candidate;
            }
        }
        self.home
    }

    fn draw_rest(&mut self) -> f64 {
        let (lo, hi) = self.rest;
        if hi > lo { self.rng.gen_range(lo..hi) } else { lo }
    }

    fn is_dry(&self, terrain: &dyn Terrain, point: DVec2) -> bool {
        terrain.smooth_height(point.x, point.y) > terrain.sea_level() + self.shore_margin
    }
}

/// Distance friction alone carries `body` along `direction` before it stops.
///
/// Sums the per-tick decay of the closing speed as a geometric series.
fn coast_distance(body: &GroundedBody, direction: DVec2, dt: f64) -> f64 {
    let closing = body.horizontal_velocity().dot(direction).max(0.0);
    let keep = body.profile().friction.powf(dt * 60.0);
    if keep < 1.0 {
        closing * dt * keep / (1.0 - keep)
    } else {
        0.0
    }
}
