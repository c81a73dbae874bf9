//! Simulation session
//!
//! `Simulation` is the explicit context a host owns for one game session: the
//! configuration, the simulation state and the observable resource cells.
//! Every mutation goes through here so the cells are published exactly once,
//! after the values for a tick or spawn are final.

use crate::resources::Resources;
use crate::settings::{ConfigError, SimConfig};
use crate::sim::{Satellite, SimState, Snapshot, SpawnOutcome, request_spawn, tick};

pub struct Simulation {
    config: SimConfig,
    state: SimState,
    resources: Resources,
}

impl Simulation {
    /// Validate `config` and start a fresh session
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = SimState::new(&config);
        let resources = Resources::new(&state.resources);
        log::info!(
            "Simulation session started (seed {}, spawn cost {} MWh, cap {})",
            state.seed,
            config.economy.spawn_cost,
            config.economy.population_cap
        );
        Ok(Self {
            config,
            state,
            resources,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Observable resource cells (subscribe here; do not set them directly)
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Advance by `dt` seconds and publish the resulting resources
    pub fn advance(&mut self, dt: f64) {
        if let Some(outcome) = tick(&mut self.state, &self.config, dt) {
            log::trace!("Auto spawn: {:?}", outcome);
        }
        self.publish();
    }

    /// Handle a spawn request from the UI. Rejections are silent no-ops.
    pub fn request_spawn(&mut self) -> SpawnOutcome {
        let outcome = request_spawn(&mut self.state, &self.config);
        if outcome.is_spawned() {
            self.publish();
        }
        outcome
    }

    /// Add a satellite bypassing the spawn policy
    pub fn insert_satellite(&mut self, satellite: Satellite) {
        self.state.insert_satellite(satellite);
        self.publish();
    }

    /// Allocate an ID for `insert_satellite`
    pub fn next_entity_id(&mut self) -> u32 {
        self.state.next_entity_id()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    fn publish(&self) {
        self.resources.publish(&self.state.resources);
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("time", &self.state.time)
            .field("ticks", &self.state.ticks)
            .field("satellites", &self.state.swarm.len())
            .field("resources", &self.state.resources)
            .finish()
    }
}
