//! Simulation configuration
//!
//! Physical constants, economy balance and clock limits. Every field has a
//! default so partial JSON files are accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating a `SimConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Balance presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConfigPreset {
    #[default]
    Standard,
    /// Free spawning and full storage, for trying out the swarm
    Sandbox,
}

impl ConfigPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigPreset::Standard => "Standard",
            ConfigPreset::Sandbox => "Sandbox",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "default" => Some(ConfigPreset::Standard),
            "sandbox" => Some(ConfigPreset::Sandbox),
            _ => None,
        }
    }
}

/// Bodies and gravity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravitational_constant: f64,
    pub planet_radius: f64,
    pub planet_mass: f64,
    /// Distance from the star (origin) to the planet
    pub planet_orbital_radius: f64,
    /// Seconds per lap around the star
    pub planet_orbital_period: f64,
    /// Seconds per self-rotation (display only)
    pub planet_spin_period: f64,
    pub star_radius: f64,
    pub star_mass: f64,
    /// Smallest satellite-planet separation used in the gravity term
    pub min_separation: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: G,
            planet_radius: PLANET_RAD,
            planet_mass: PLANET_MASS,
            planet_orbital_radius: PLANET_ORBIT_RAD,
            planet_orbital_period: PLANET_ORBITAL_PERIOD,
            planet_spin_period: PLANET_SPIN_PERIOD,
            star_radius: STAR_RAD,
            star_mass: STAR_MASS,
            min_separation: PLANET_RAD,
        }
    }
}

impl PhysicsConfig {
    /// Gravitational parameter μ = G·M of the planet
    pub fn planet_mu(&self) -> f64 {
        self.gravitational_constant * self.planet_mass
    }
}

/// Resource balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub initial_power: f64,
    pub max_power: f64,
    pub initial_stored_energy: f64,
    pub max_stored_energy: f64,
    /// Megawatts generated by each satellite
    pub power_per_satellite: f64,
    /// Megawatt-hours taken from storage per spawned satellite
    pub spawn_cost: f64,
    pub population_cap: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_power: 0.0,
            max_power: MAX_POWER,
            // Enough for the first satellite
            initial_stored_energy: SPAWN_COST,
            max_stored_energy: MAX_STORED_ENERGY,
            power_per_satellite: POWER_PER_SATELLITE,
            spawn_cost: SPAWN_COST,
            population_cap: POPULATION_CAP,
        }
    }
}

/// Where and how often new satellites appear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Spawn shell radius as a multiple of planet radius
    pub shell_radius_factor: f64,
    /// Width (radians) of the polar-angle band, centred on the orbital plane
    pub polar_spread: f64,
    /// Issue a spawn request every N ticks (None = only on explicit request)
    pub auto_spawn_every: Option<u32>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            shell_radius_factor: SPAWN_SHELL_FACTOR,
            polar_spread: SPAWN_POLAR_SPREAD,
            auto_spawn_every: None,
        }
    }
}

/// Frame clock limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest `dt` (seconds) a single frame may feed the simulation
    pub max_frame_dt: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub economy: EconomyConfig,
    pub spawn: SpawnConfig,
    pub clock: ClockConfig,
    /// RNG seed for spawn sampling (None = random per session)
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Create a config from a preset
    pub fn from_preset(preset: ConfigPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a preset on top of the current values
    pub fn apply_preset(&mut self, preset: ConfigPreset) {
        match preset {
            ConfigPreset::Standard => {}
            ConfigPreset::Sandbox => {
                self.economy.spawn_cost = 0.0;
                self.economy.initial_stored_energy = self.economy.max_stored_energy;
            }
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON config file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write this config as JSON
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json_string()?)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        positive("physics.gravitational_constant", p.gravitational_constant)?;
        positive("physics.planet_radius", p.planet_radius)?;
        positive("physics.planet_mass", p.planet_mass)?;
        positive("physics.planet_orbital_radius", p.planet_orbital_radius)?;
        positive("physics.planet_orbital_period", p.planet_orbital_period)?;
        positive("physics.planet_spin_period", p.planet_spin_period)?;
        positive("physics.star_radius", p.star_radius)?;
        positive("physics.star_mass", p.star_mass)?;
        positive("physics.min_separation", p.min_separation)?;

        let e = &self.economy;
        non_negative("economy.initial_power", e.initial_power)?;
        non_negative("economy.max_power", e.max_power)?;
        non_negative("economy.initial_stored_energy", e.initial_stored_energy)?;
        non_negative("economy.max_stored_energy", e.max_stored_energy)?;
        non_negative("economy.power_per_satellite", e.power_per_satellite)?;
        non_negative("economy.spawn_cost", e.spawn_cost)?;
        if e.initial_stored_energy > e.max_stored_energy {
            return Err(ConfigError::Invalid {
                field: "economy.initial_stored_energy",
                reason: format!("exceeds max_stored_energy ({})", e.max_stored_energy),
            });
        }
        if e.initial_power > e.max_power {
            return Err(ConfigError::Invalid {
                field: "economy.initial_power",
                reason: format!("exceeds max_power ({})", e.max_power),
            });
        }

        let s = &self.spawn;
        positive("spawn.shell_radius_factor", s.shell_radius_factor)?;
        if !(0.0..=std::f64::consts::PI).contains(&s.polar_spread) {
            return Err(ConfigError::Invalid {
                field: "spawn.polar_spread",
                reason: format!("{} is outside [0, π]", s.polar_spread),
            });
        }
        if s.auto_spawn_every == Some(0) {
            return Err(ConfigError::Invalid {
                field: "spawn.auto_spawn_every",
                reason: "interval must be at least one tick".to_string(),
            });
        }

        positive("clock.max_frame_dt", self.clock.max_frame_dt)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} must be finite and > 0", value),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} must be finite and >= 0", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        SimConfig::default().validate().unwrap();
        SimConfig::from_preset(ConfigPreset::Sandbox)
            .validate()
            .unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            SimConfig::from_json_str(r#"{ "economy": { "spawn_cost": 5.0 }, "seed": 7 }"#).unwrap();
        assert_eq!(config.economy.spawn_cost, 5.0);
        assert_eq!(config.economy.population_cap, POPULATION_CAP);
        assert_eq!(config.physics, PhysicsConfig::default());
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimConfig::from_preset(ConfigPreset::Sandbox);
        let json = config.to_json_string().unwrap();
        assert_eq!(SimConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_period() {
        let err = SimConfig::from_json_str(r#"{ "physics": { "planet_orbital_period": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "physics.planet_orbital_period",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_overfull_storage() {
        let mut config = SimConfig::default();
        config.economy.initial_stored_energy = config.economy.max_stored_energy + 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            SimConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(ConfigPreset::from_str("SANDBOX"), Some(ConfigPreset::Sandbox));
        assert_eq!(ConfigPreset::from_str("default"), Some(ConfigPreset::Standard));
        assert_eq!(ConfigPreset::from_str("hard"), None);
        assert_eq!(ConfigPreset::Sandbox.as_str(), "Sandbox");
    }

    #[test]
    fn test_mu() {
        assert_eq!(PhysicsConfig::default().planet_mu(), G * PLANET_MASS);
    }
}
