//! Satellite integrator
//!
//! Point-mass gravity from the planet, advanced with velocity Verlet
//! (second order, symplectic). Satellites live for the whole session, so the
//! long-run energy behaviour matters more than per-step accuracy.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Orientation used when a satellite has no velocity to face along
pub const FALLBACK_HEADING: DVec3 = DVec3::Z;

/// A gravity source frozen for the duration of one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Gravitational parameter G·M
    pub mu: f64,
    /// Separations below this are treated as this (keeps the 1/r² term finite)
    pub min_separation: f64,
}

impl Attractor {
    /// Gravitational acceleration at `pos`
    #[inline]
    pub fn acceleration_at(&self, pos: DVec3) -> DVec3 {
        let offset = pos - self.position;
        let r = offset.length().max(self.min_separation);
        -self.mu * offset / (r * r * r)
    }

    /// Speed of a circular orbit at distance `r`
    #[inline]
    pub fn circular_speed(&self, r: f64) -> f64 {
        (self.mu / r.max(self.min_separation)).sqrt()
    }
}

/// One velocity-Verlet step under `accel`; returns the new (position, velocity)
#[inline]
pub fn verlet_step(
    pos: DVec3,
    vel: DVec3,
    dt: f64,
    accel: impl Fn(DVec3) -> DVec3,
) -> (DVec3, DVec3) {
    let a0 = accel(pos);
    let new_pos = pos + vel * dt + a0 * (dt * dt / 2.0);
    let a1 = accel(new_pos);
    let new_vel = vel + (a0 + a1) * (dt / 2.0);
    (new_pos, new_vel)
}

/// Facing direction for a velocity
#[inline]
pub fn heading_for(vel: DVec3) -> DVec3 {
    vel.try_normalize().unwrap_or(FALLBACK_HEADING)
}

/// A swarm member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: u32,
    /// World-frame position
    pub pos: DVec3,
    /// World-frame velocity
    pub vel: DVec3,
    /// Unit facing vector, recomputed every step
    pub heading: DVec3,
}

impl Satellite {
    pub fn new(id: u32, pos: DVec3, vel: DVec3) -> Self {
        Self {
            id,
            pos,
            vel,
            heading: heading_for(vel),
        }
    }

    /// Place a satellite at `offset` from the body on a circular orbit whose
    /// velocity is along `tangent` (normalized here), carried along with the body.
    pub fn circular(id: u32, body: &Attractor, offset: DVec3, tangent: DVec3) -> Self {
        let speed = body.circular_speed(offset.length());
        let direction = tangent.try_normalize().unwrap_or(FALLBACK_HEADING);
        Self::new(id, body.position + offset, body.velocity + direction * speed)
    }

    /// Advance position and velocity together by `dt`
    pub fn step(&mut self, body: &Attractor, dt: f64) {
        let (pos, vel) = verlet_step(self.pos, self.vel, dt, |p| body.acceleration_at(p));
        self.pos = pos;
        self.vel = vel;
        self.heading = heading_for(self.vel);
    }

    /// Position relative to the body (what the renderer draws)
    pub fn relative_position(&self, body: &Attractor) -> DVec3 {
        self.pos - body.position
    }

    /// Distance from the body's centre
    pub fn altitude_from_center(&self, body: &Attractor) -> f64 {
        self.relative_position(body).length()
    }

    /// Specific orbital energy relative to the body (v²/2 - μ/r)
    pub fn specific_energy(&self, body: &Attractor) -> f64 {
        let rel_vel = self.vel - body.velocity;
        let r = self.altitude_from_center(body).max(body.min_separation);
        rel_vel.length_squared() / 2.0 - body.mu / r
    }
}
