//! Simulation state and render snapshot types

use glam::DVec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::planet::Planet;
use super::satellite::Satellite;
use super::swarm::Swarm;
use crate::resources::ResourceValues;
use crate::settings::SimConfig;

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Seed the spawn RNG was created from
    pub seed: u64,
    /// Simulation time (seconds)
    pub time: f64,
    /// Ticks run so far
    pub ticks: u64,
    pub planet: Planet,
    pub swarm: Swarm,
    /// Resource ledger; published to the reactive cells after each mutation
    pub resources: ResourceValues,
    rng: Pcg32,
    next_id: u32,
}

impl SimState {
    pub fn new(config: &SimConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            seed,
            time: 0.0,
            ticks: 0,
            planet: Planet::new(&config.physics),
            swarm: Swarm::new(),
            resources: ResourceValues::from_config(&config.economy),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Add a satellite without going through the spawn policy (no cost, no cap)
    pub fn insert_satellite(&mut self, satellite: Satellite) {
        self.swarm.push(satellite);
        self.resources.num_satellites = self.swarm.len() as u32;
    }

    /// Everything a renderer needs for the current frame
    pub fn snapshot(&self) -> Snapshot {
        let body = self.planet.attractor();
        Snapshot {
            time: self.time,
            ticks: self.ticks,
            planet: PlanetView {
                position: self.planet.position,
                velocity: self.planet.velocity,
                phase: self.planet.phase,
                spin: self.planet.spin,
                radius: self.planet.radius,
            },
            star_relative_position: -self.planet.position,
            satellites: self
                .swarm
                .iter()
                .map(|s| SatelliteView {
                    id: s.id,
                    position: s.pos,
                    velocity: s.vel,
                    heading: s.heading,
                    relative_position: s.relative_position(&body),
                })
                .collect(),
            resources: self.resources,
        }
    }
}

/// Planet data for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetView {
    pub position: DVec3,
    pub velocity: DVec3,
    pub phase: f64,
    pub spin: f64,
    pub radius: f64,
}

/// Satellite data for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteView {
    pub id: u32,
    pub position: DVec3,
    pub velocity: DVec3,
    pub heading: DVec3,
    /// Position in the planet-centred frame the scene is drawn in
    pub relative_position: DVec3,
}

/// Read-only view of one frame of the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f64,
    pub ticks: u64,
    pub planet: PlanetView,
    /// The star sits at the origin; the scene is drawn around the planet
    pub star_relative_position: DVec3,
    pub satellites: Vec<SatelliteView>,
    pub resources: ResourceValues,
}
