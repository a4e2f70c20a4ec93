//! Real time to fixed sub-steps

use crate::config::ClockConfig;

/// Accumulates elapsed wall-clock time and hands out fixed sub-steps
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    sim_dt: f32,
    max_frame_time: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FixedStepClock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            sim_dt: config.sim_dt,
            max_frame_time: config.max_frame_time,
            max_substeps: config.max_substeps,
            accumulator: 0.0,
        }
    }

    #[inline]
    pub fn sim_dt(&self) -> f32 {
        self.sim_dt
    }

    /// Add `elapsed` seconds and return how many sub-steps to run now
    ///
    /// Long frames are clipped, and backlog beyond `max_substeps` is dropped
    /// to prevent a spiral of death.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let elapsed = if elapsed > self.max_frame_time {
            log::warn!(
                "Frame took {:.3}s, clipping to {:.3}s",
                elapsed,
                self.max_frame_time
            );
            self.max_frame_time
        } else {
            elapsed.max(0.0)
        };
        self.accumulator += elapsed;

        let mut substeps = 0;
        while self.accumulator >= self.sim_dt && substeps < self.max_substeps {
            self.accumulator -= self.sim_dt;
            substeps += 1;
        }

        if self.accumulator >= self.sim_dt {
            let dropped = (self.accumulator / self.sim_dt).floor();
            log::warn!("Dropping {dropped} physics sub-steps");
            self.accumulator -= dropped * self.sim_dt;
        }

        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
