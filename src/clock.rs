//! Frame-paced tick driver
//!
//! The host calls `frame` once per rendered frame with a monotonic timestamp
//! (seconds). While running, each frame becomes exactly one simulation tick
//! whose `dt` is the wall-clock delta clamped to `max_step`, so a stalled or
//! backgrounded tab cannot feed the integrator one enormous step.

use serde::{Deserialize, Serialize};

use crate::settings::ClockConfig;
use crate::simulation::Simulation;

/// Frame deltas above this are reported as stalls
const STALL_THRESHOLD: f64 = 1.0;

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClockState {
    /// No tick loop running
    Idle,
    /// Ticking; `last_frame` is None until the first frame after start
    Running { last_frame: Option<f64> },
}

#[derive(Debug, Clone)]
pub struct TickDriver {
    state: ClockState,
    max_step: f64,
    focused: bool,
    ticks: u64,
}

impl TickDriver {
    pub fn new(max_step: f64) -> Self {
        Self {
            state: ClockState::Idle,
            max_step,
            focused: true,
            ticks: 0,
        }
    }

    pub fn from_config(clock: &ClockConfig) -> Self {
        Self::new(clock.max_frame_dt)
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Ticks driven since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Idle → Running. The next frame only records its timestamp.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.state = ClockState::Running { last_frame: None };
        log::info!("Clock started");
    }

    /// Running → Idle. Later frames are ignored until `start`.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.state = ClockState::Idle;
        log::info!("Clock stopped after {} ticks", self.ticks);
    }

    /// Unfocused frames keep the baseline moving but do not tick
    pub fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            log::debug!("Clock focus: {}", focused);
        }
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Consume a frame timestamp; returns the bounded `dt` to tick with, if any
    pub fn next_dt(&mut self, now: f64) -> Option<f64> {
        let ClockState::Running { last_frame } = self.state else {
            return None;
        };
        self.state = ClockState::Running {
            last_frame: Some(now),
        };

        let last = last_frame?;
        if !self.focused {
            return None;
        }

        let raw = now - last;
        if !raw.is_finite() || raw < 0.0 {
            log::warn!("Clock went backwards ({:.3}s); ticking with dt = 0", raw);
            return Some(0.0);
        }
        if raw > STALL_THRESHOLD {
            log::warn!(
                "Frame stalled for {:.2}s; clamped to {}s",
                raw,
                self.max_step
            );
        }
        Some(raw.min(self.max_step))
    }

    /// Drive one frame of `sim`; returns the `dt` it was ticked with
    pub fn frame(&mut self, now: f64, sim: &mut Simulation) -> Option<f64> {
        let dt = self.next_dt(now)?;
        sim.advance(dt);
        self.ticks += 1;
        Some(dt)
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::from_config(&ClockConfig::default())
    }
}
