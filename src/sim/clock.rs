//! Fixed-timestep scheduler
//!
//! The host feeds wall-clock frame deltas in; the clock answers how many
//! logical ticks to run. Rendering reads the world after those ticks, so it
//! always sees a fully settled state.

use log::warn;

use crate::consts::MAX_FRAME_DT;
use crate::settings::SimConfig;

#[derive(Debug, Clone)]
pub struct SimulationClock {
    tick_dt: f32,
    max_substeps: u32,
    accumulator: f32,
    total_ticks: u64,
}

impl SimulationClock {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            tick_dt: config.tick_seconds(),
            max_substeps: config.max_substeps,
            accumulator: 0.0,
            total_ticks: 0,
        }
    }

    /// Seconds per tick
    pub fn tick_dt(&self) -> f32 {
        self.tick_dt
    }

    /// Ticks handed out since creation
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Add a frame's elapsed time and return the number of ticks to run.
    ///
    /// Deltas are clamped to [`MAX_FRAME_DT`]; backlog beyond the substep
    /// cap is dropped so a slow frame never snowballs.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut ticks = 0;
        while self.accumulator >= self.tick_dt && ticks < self.max_substeps {
            self.accumulator -= self.tick_dt;
            ticks += 1;
        }

        if self.accumulator >= self.tick_dt {
            warn!(
                "dropping {:.1} ms of simulation backlog",
                self.accumulator * 1000.0
            );
            self.accumulator %= self.tick_dt;
        }

        self.total_ticks += u64::from(ticks);
        ticks
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.tick_dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
