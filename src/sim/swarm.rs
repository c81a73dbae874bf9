//! Swarm collection and spawn policy

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::satellite::{Attractor, Satellite};
use super::state::SimState;
use crate::settings::{SimConfig, SpawnConfig};
use crate::{perpendicular, spherical_to_cartesian};

/// Result of a spawn request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnOutcome {
    Spawned { id: u32 },
    /// Stored energy below the spawn cost; nothing changed
    InsufficientEnergy,
    /// Swarm already at the population cap; nothing changed
    PopulationCapReached,
}

impl SpawnOutcome {
    pub fn is_spawned(&self) -> bool {
        matches!(self, SpawnOutcome::Spawned { .. })
    }
}

/// Ordered, append-only collection of satellites
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Swarm {
    satellites: Vec<Satellite>,
}

impl Swarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Satellite> {
        self.satellites.iter()
    }

    pub fn as_slice(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn get(&self, id: u32) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.id == id)
    }

    pub(crate) fn push(&mut self, satellite: Satellite) {
        self.satellites.push(satellite);
    }

    /// Integrate every satellite against the same body snapshot and `dt`
    pub fn advance(&mut self, body: &Attractor, dt: f64) {
        for satellite in &mut self.satellites {
            satellite.step(body, dt);
        }
    }
}

/// Random spawn offset from the planet centre: on a shell of
/// `planet_radius * shell_radius_factor`, polar angle within the configured
/// band around the orbital plane, any azimuth.
pub fn sample_spawn_offset(rng: &mut impl Rng, planet_radius: f64, spawn: &SpawnConfig) -> DVec3 {
    let polar = (rng.random::<f64>() - 0.5) * spawn.polar_spread + FRAC_PI_2;
    let azimuth = rng.random::<f64>() * TAU;
    spherical_to_cartesian(planet_radius * spawn.shell_radius_factor, polar, azimuth)
}

/// Apply the spawn policy: spend energy and add one satellite on a circular
/// orbit, or reject without side effects.
pub fn request_spawn(state: &mut SimState, config: &SimConfig) -> SpawnOutcome {
    if state.swarm.len() >= config.economy.population_cap as usize {
        log::debug!(
            "Spawn rejected: population cap {} reached",
            config.economy.population_cap
        );
        return SpawnOutcome::PopulationCapReached;
    }
    if !state.resources.try_spend(config.economy.spawn_cost) {
        log::debug!(
            "Spawn rejected: {:.3} MWh stored, {:.3} MWh needed",
            state.resources.stored_energy,
            config.economy.spawn_cost
        );
        return SpawnOutcome::InsufficientEnergy;
    }

    let body = state.planet.attractor();
    let planet_radius = state.planet.radius;
    let offset = sample_spawn_offset(state.rng(), planet_radius, &config.spawn);
    let id = state.next_entity_id();
    let satellite = Satellite::circular(id, &body, offset, perpendicular(offset));
    state.insert_satellite(satellite);

    log::debug!("Spawned satellite {} ({} total)", id, state.swarm.len());
    SpawnOutcome::Spawned { id }
}
