//! Planet kinematics
//!
//! The planet follows an exact circle around the star at the origin, in the
//! XZ plane. Position and velocity are closed-form functions of simulation
//! time, so the one body everything else is measured against never
//! accumulates integration error.

use std::f64::consts::{PI, TAU};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::satellite::Attractor;
use crate::settings::PhysicsConfig;

/// Orbital phase (radians) at time `t`. Starts at π and decreases.
#[inline]
pub fn orbital_phase(t: f64, period: f64) -> f64 {
    -t.rem_euclid(period) * TAU / period + PI
}

/// Position on the orbit circle at time `t`
#[inline]
pub fn orbit_position(t: f64, radius: f64, period: f64) -> DVec3 {
    let phase = orbital_phase(t, period);
    radius * DVec3::new(phase.cos(), 0.0, phase.sin())
}

/// Velocity along the orbit circle at time `t` (d/dt of `orbit_position`)
#[inline]
pub fn orbit_velocity(t: f64, radius: f64, period: f64) -> DVec3 {
    let phase = orbital_phase(t, period);
    let angular_rate = -TAU / period;
    radius * angular_rate * DVec3::new(-phase.sin(), 0.0, phase.cos())
}

/// The orbited body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub radius: f64,
    pub mass: f64,
    /// Gravitational parameter G·M
    pub mu: f64,
    pub orbital_radius: f64,
    pub orbital_period: f64,
    pub spin_period: f64,
    /// Separation clamp for the gravity term
    pub min_separation: f64,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Orbital phase (radians)
    pub phase: f64,
    /// Self-rotation about +Y (radians, display only)
    pub spin: f64,
}

impl Planet {
    pub fn new(physics: &PhysicsConfig) -> Self {
        let mut planet = Self {
            radius: physics.planet_radius,
            mass: physics.planet_mass,
            mu: physics.planet_mu(),
            orbital_radius: physics.planet_orbital_radius,
            orbital_period: physics.planet_orbital_period,
            spin_period: physics.planet_spin_period,
            min_separation: physics.min_separation,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            phase: 0.0,
            spin: 0.0,
        };
        planet.update(0.0);
        planet
    }

    /// Move the planet to where it is at simulation time `t`
    pub fn update(&mut self, t: f64) {
        self.phase = orbital_phase(t, self.orbital_period);
        self.position = orbit_position(t, self.orbital_radius, self.orbital_period);
        self.velocity = orbit_velocity(t, self.orbital_radius, self.orbital_period);
        self.spin = (t * TAU / self.spin_period).rem_euclid(TAU);
    }

    /// Speed along the orbit (constant)
    pub fn orbital_speed(&self) -> f64 {
        TAU * self.orbital_radius / self.orbital_period
    }

    /// Frozen gravity source for one tick
    pub fn attractor(&self) -> Attractor {
        Attractor {
            position: self.position,
            velocity: self.velocity,
            mu: self.mu,
            min_separation: self.min_separation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const R: f64 = 1e6;
    const T: f64 = 1800.0;

    #[test]
    fn test_starts_at_negative_x() {
        let planet = Planet::new(&PhysicsConfig::default());
        assert!((planet.phase - PI).abs() < 1e-12);
        assert!((planet.position - DVec3::new(-planet.orbital_radius, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(planet.spin, 0.0);
    }

    #[test]
    fn test_quarter_period() {
        // Phase drops by π/2 after a quarter lap
        let p = orbit_position(T / 4.0, R, T);
        assert!((p - DVec3::new(0.0, 0.0, R)).length() < 1e-6);
    }

    #[test]
    fn test_periodic() {
        let a = orbit_position(123.4, R, T);
        let b = orbit_position(123.4 + 3.0 * T, R, T);
        assert!((a - b).length() < 1e-6);
    }

    #[test]
    fn test_velocity_matches_finite_difference() {
        let t = 321.0;
        let h = 1e-3;
        let numeric = (orbit_position(t + h, R, T) - orbit_position(t - h, R, T)) / (2.0 * h);
        let analytic = orbit_velocity(t, R, T);
        assert!((numeric - analytic).length() / analytic.length() < 1e-6);
    }

    #[test]
    fn test_spin_period() {
        let mut planet = Planet::new(&PhysicsConfig::default());
        planet.update(planet.spin_period / 2.0);
        assert!((planet.spin - PI).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_position_on_circle(t in 0.0f64..1e7) {
            let p = orbit_position(t, R, T);
            prop_assert!((p.length() - R).abs() < 1e-6 * R);
            prop_assert_eq!(p.y, 0.0);
        }

        #[test]
        fn prop_velocity_tangent(t in 0.0f64..1e7) {
            let p = orbit_position(t, R, T);
            let v = orbit_velocity(t, R, T);
            let expected_speed = TAU * R / T;
            prop_assert!((v.length() - expected_speed).abs() < 1e-9 * expected_speed);
            prop_assert!(p.normalize().dot(v.normalize()).abs() < 1e-9);
        }
    }
}
