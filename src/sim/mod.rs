//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform concerns:
//! - Caller-supplied `dt` only (the clock bounds it)
//! - Seeded RNG only
//! - Stable iteration order (insertion order)

pub mod planet;
pub mod satellite;
pub mod state;
pub mod swarm;
pub mod tick;

pub use planet::{Planet, orbit_position, orbit_velocity, orbital_phase};
pub use satellite::{Attractor, FALLBACK_HEADING, Satellite, heading_for, verlet_step};
pub use state::{PlanetView, SatelliteView, SimState, Snapshot};
pub use swarm::{SpawnOutcome, Swarm, request_spawn, sample_spawn_offset};
pub use tick::{tick, update_economy};
