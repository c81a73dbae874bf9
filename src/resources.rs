//! Named game resources
//!
//! The simulation keeps a plain `ResourceValues` ledger and, once a tick or
//! spawn has finished mutating it, publishes the changed fields into the
//! `Resources` cells so observers only ever see finalized values.

use serde::{Deserialize, Serialize};

use crate::settings::EconomyConfig;
use crate::store::ReactiveCell;

/// Resource ledger (megawatts / megawatt-hours)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceValues {
    pub power: f64,
    pub max_power: f64,
    pub stored_energy: f64,
    pub max_stored_energy: f64,
    pub num_satellites: u32,
}

impl ResourceValues {
    pub fn from_config(economy: &EconomyConfig) -> Self {
        let mut values = Self {
            power: economy.initial_power,
            max_power: economy.max_power,
            stored_energy: economy.initial_stored_energy,
            max_stored_energy: economy.max_stored_energy,
            num_satellites: 0,
        };
        values.clamp();
        values
    }

    /// Re-establish `0 <= power <= max_power` and `0 <= stored_energy <= max_stored_energy`
    pub fn clamp(&mut self) {
        self.power = self.power.clamp(0.0, self.max_power.max(0.0));
        self.stored_energy = self
            .stored_energy
            .clamp(0.0, self.max_stored_energy.max(0.0));
    }

    /// Add energy, saturating at capacity
    pub fn charge(&mut self, energy: f64) {
        self.stored_energy = (self.stored_energy + energy).min(self.max_stored_energy);
        self.clamp();
    }

    /// Take `cost` from storage if there is enough; returns whether it was paid
    pub fn try_spend(&mut self, cost: f64) -> bool {
        if self.stored_energy < cost {
            return false;
        }
        self.stored_energy -= cost;
        self.clamp();
        true
    }

    /// Fraction of storage filled (0 when capacity is zero)
    pub fn storage_ratio(&self) -> f64 {
        if self.max_stored_energy <= 0.0 {
            0.0
        } else {
            (self.stored_energy / self.max_stored_energy).clamp(0.0, 1.0)
        }
    }
}

/// Observable resource cells for HUD and renderer
#[derive(Debug)]
pub struct Resources {
    pub power: ReactiveCell<f64>,
    pub max_power: ReactiveCell<f64>,
    pub stored_energy: ReactiveCell<f64>,
    pub max_stored_energy: ReactiveCell<f64>,
    pub num_satellites: ReactiveCell<u32>,
}

impl Resources {
    pub fn new(values: &ResourceValues) -> Self {
        Self {
            power: ReactiveCell::new(values.power),
            max_power: ReactiveCell::new(values.max_power),
            stored_energy: ReactiveCell::new(values.stored_energy),
            max_stored_energy: ReactiveCell::new(values.max_stored_energy),
            num_satellites: ReactiveCell::new(values.num_satellites),
        }
    }

    /// Push changed fields to their cells. Unchanged fields are not re-sent.
    ///
    /// Every cell holds its new value before any subscriber runs, so an
    /// observer of one field reading another never sees a half-published ledger.
    pub fn publish(&self, values: &ResourceValues) {
        self.max_power.replace(values.max_power);
        self.max_stored_energy.replace(values.max_stored_energy);
        self.num_satellites.replace(values.num_satellites);
        self.power.replace(values.power);
        self.stored_energy.replace(values.stored_energy);

        self.max_power.notify();
        self.max_stored_energy.notify();
        self.num_satellites.notify();
        self.power.notify();
        self.stored_energy.notify();
    }

    /// Read all cells back into a ledger
    pub fn values(&self) -> ResourceValues {
        ResourceValues {
            power: self.power.get(),
            max_power: self.max_power.get(),
            stored_energy: self.stored_energy.get(),
            max_stored_energy: self.max_stored_energy.get(),
            num_satellites: self.num_satellites.get(),
        }
    }
}
