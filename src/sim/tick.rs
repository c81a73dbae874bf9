//! Simulation tick
//!
//! One call advances the planet, then every satellite, then the economy, all
//! with the same `dt`.

use super::state::SimState;
use super::swarm::{SpawnOutcome, request_spawn};
use crate::consts::SECONDS_PER_HOUR;
use crate::settings::SimConfig;

/// Advance the simulation by `dt` seconds.
///
/// Returns the outcome of the automatic spawn request if one was due.
pub fn tick(state: &mut SimState, config: &SimConfig, dt: f64) -> Option<SpawnOutcome> {
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

    state.time += dt;
    state.ticks += 1;

    // Planet first: everything below sees this tick's planet
    state.planet.update(state.time);

    let auto_spawn = match config.spawn.auto_spawn_every {
        Some(every) if every > 0 && state.ticks % u64::from(every) == 0 => {
            Some(request_spawn(state, config))
        }
        _ => None,
    };

    let body = state.planet.attractor();
    state.swarm.advance(&body, dt);

    update_economy(state, config, dt);

    auto_spawn
}

/// Recompute power from the swarm size and charge storage for `dt` seconds
pub fn update_economy(state: &mut SimState, config: &SimConfig, dt: f64) {
    let resources = &mut state.resources;
    resources.num_satellites = state.swarm.len() as u32;
    resources.power = (f64::from(resources.num_satellites) * config.economy.power_per_satellite)
        .min(resources.max_power);
    resources.charge(resources.power * dt / SECONDS_PER_HOUR);
}
