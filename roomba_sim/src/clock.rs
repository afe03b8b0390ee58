//! Fixed-step clock
//!
//! Turns variable render-frame deltas into a whole number of fixed physics ticks.
//! Leftover time carries into the next frame; time beyond the per-frame catch-up limit
//! is dropped so a slow frame cannot snowball into ever longer frames.

use anyhow::{ensure, Result};
use tracing::warn;

/// Rounding slack so that e.g. three 1/150 s frames still add up to one 1/50 s tick
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct FixedStepClock {
    fixed_dt: f64,
    accumulator: f64,
    max_ticks_per_frame: u32,
    total_ticks: u64,
    dropped: f64,
}

impl FixedStepClock {
    /// `fixed_dt` must be positive and finite
    pub fn new(fixed_dt: f32, max_ticks_per_frame: u32) -> Result<Self> {
        ensure!(
            fixed_dt.is_finite() && fixed_dt > 0.0,
            "fixed tick length must be positive and finite, got {}",
            fixed_dt
        );
        Ok(Self {
            fixed_dt: fixed_dt as f64,
            accumulator: 0.0,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            total_ticks: 0,
            dropped: 0.0,
        })
    }

    /// Feed one render frame and get the number of physics ticks to run for it
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt < 0.0 {
            warn!(frame_dt, "invalid frame delta ignored");
            return 0;
        }

        self.accumulator += frame_dt as f64;

        let mut ticks = 0;
        while self.accumulator + EPSILON >= self.fixed_dt && ticks < self.max_ticks_per_frame {
            self.accumulator -= self.fixed_dt;
            ticks += 1;
        }
        self.accumulator = self.accumulator.max(0.0);

        if self.accumulator + EPSILON >= self.fixed_dt {
            let excess = ((self.accumulator + EPSILON) / self.fixed_dt).floor() * self.fixed_dt;
            self.accumulator = (self.accumulator - excess).max(0.0);
            self.dropped += excess;
            warn!(
                dropped_ms = excess * 1000.0,
                max_ticks = self.max_ticks_per_frame,
                "frame too long, dropping simulation time"
            );
        }

        self.total_ticks += ticks as u64;
        ticks
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt as f32
    }

    /// Fraction of a tick waiting in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0) as f32
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Simulated seconds so far
    pub fn sim_time(&self) -> f64 {
        self.total_ticks as f64 * self.fixed_dt
    }

    /// Seconds discarded by the catch-up limit
    pub fn dropped_time(&self) -> f64 {
        self.dropped
    }
}
