//! Orbital Swarm - an idle game about power satellites around a small planet
//!
//! Core modules:
//! - `sim`: Simulation (planet kinematics, satellite integration, swarm and economy)
//! - `store`: Reactive single-value cells observed by the HUD/renderer
//! - `resources`: The named resource cells (power, energy, satellite count)
//! - `clock`: Frame-paced tick driver
//! - `settings`: Data-driven physics/economy configuration
//! - `simulation`: The session context tying all of the above together

pub mod clock;
pub mod resources;
pub mod settings;
pub mod sim;
pub mod simulation;
pub mod store;

pub use clock::{ClockState, TickDriver};
pub use resources::{ResourceValues, Resources};
pub use settings::{ConfigError, ConfigPreset, SimConfig};
pub use simulation::Simulation;
pub use store::{ReactiveCell, Subscription};

use glam::DVec3;

/// Game configuration constants (defaults for `SimConfig`)
pub mod consts {
    /// Gravitational constant (game units, not SI)
    pub const G: f64 = 1e5;

    /// Planet defaults
    pub const PLANET_RAD: f64 = 1e4;
    pub const PLANET_MASS: f64 = 1e8;
    pub const PLANET_ORBIT_RAD: f64 = 1e6;
    /// Half an hour per lap around the star
    pub const PLANET_ORBITAL_PERIOD: f64 = 60.0 * 60.0 * 0.5;
    /// One full self-rotation per minute (display only)
    pub const PLANET_SPIN_PERIOD: f64 = 60.0;

    /// Star defaults (the star sits at the origin)
    pub const STAR_RAD: f64 = 7e4;
    pub const STAR_MASS: f64 = 1e9;

    /// Resource defaults. Power is in megawatts, energy in megawatt-hours.
    pub const MAX_POWER: f64 = 200_000.0;
    pub const MAX_STORED_ENERGY: f64 = 50_000.0;
    pub const POWER_PER_SATELLITE: f64 = 1.0;
    pub const SPAWN_COST: f64 = 1.0;
    pub const POPULATION_CAP: u32 = 500;

    /// Seconds per hour; power (MW) * dt (s) / this = energy (MWh)
    pub const SECONDS_PER_HOUR: f64 = 3600.0;

    /// Spawn shell radius as a multiple of planet radius
    pub const SPAWN_SHELL_FACTOR: f64 = 1.5;
    /// Width of the polar-angle cone satellites spawn in, centred on the orbital plane
    pub const SPAWN_POLAR_SPREAD: f64 = 3.14;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f64 = 0.016;
}

/// Convert spherical (r, polar, azimuth) to cartesian with +Y as the pole
#[inline]
pub fn spherical_to_cartesian(r: f64, polar: f64, azimuth: f64) -> DVec3 {
    DVec3::new(
        r * polar.sin() * azimuth.cos(),
        r * polar.cos(),
        r * polar.sin() * azimuth.sin(),
    )
}

/// Unit vector perpendicular to `v` in the horizontal (XZ) plane, turning the
/// same way as the planet's orbit. Falls back to another axis when `v` is vertical.
#[inline]
pub fn perpendicular(v: DVec3) -> DVec3 {
    DVec3::Y
        .cross(v)
        .try_normalize()
        .or_else(|| DVec3::X.cross(v).try_normalize())
        .unwrap_or(DVec3::X)
}
