//! Simulated time.
//!
//! Bursts are "executed" by sleeping for `units * tick`. Timestamps are
//! wall-clock offsets from the simulation epoch.

use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    epoch: Instant,
    tick: Duration,
}

impl SimClock {
    /// Starts the clock now.
    pub fn new(tick: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            tick,
        }
    }

    /// Time since the epoch.
    pub fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Wall-clock length of one burst unit.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Wall-clock length of `units` burst units.
    pub fn span(&self, units: u64) -> Duration {
        self.tick
            .saturating_mul(u32::try_from(units).unwrap_or(u32::MAX))
    }

    /// Blocks the calling worker for `units` burst units.
    pub fn simulate(&self, units: u64) {
        let span = self.span(units);
        if !span.is_zero() {
            thread::sleep(span);
        }
    }
}
