//! Fixed-timestep simulation clock.
//!
//! This module turns the irregular wall-clock time between frames into a whole number of
//! simulation ticks, so that motion advances at the same rate no matter how often the interface
//! redraws.

use std::time::Duration;

use color_eyre::eyre::{bail, Result};

/// Default number of simulation ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Longest frame the clock accounts for.
///
/// Anything beyond this is dropped so that a stalled terminal doesn't make the agent teleport
/// once it wakes up again.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

/// Accumulator for fixed-rate ticks.
///
/// This structure holds the budget of unprocessed time. Each call to
/// [`advance`](FixedTimestep::advance) adds a frame's elapsed time and hands back how many whole
/// ticks fit into the budget, keeping the remainder for the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedTimestep {
    /// Duration of a single tick.
    tick: Duration,
    /// Time accumulated but not yet consumed by ticks.
    budget: Duration,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1) / DEFAULT_TICK_RATE,
            budget: Duration::ZERO,
        }
    }
}

impl FixedTimestep {
    /// Creates a clock running at `rate` ticks per second.
    ///
    /// # Errors
    ///
    /// This function returns an error if the rate is zero.
    pub fn new(rate: u32) -> Result<Self> {
        if rate == 0 {
            bail!("tick rate must be positive");
        }

        Ok(Self {
            tick: Duration::from_secs(1) / rate,
            budget: Duration::ZERO,
        })
    }

    /// Returns the duration of a single tick.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Returns the time accumulated but not yet consumed.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Adds a frame's elapsed time and returns how many ticks to run.
    ///
    /// The elapsed time is clamped to [`MAX_FRAME_TIME`] first. Ticks are only taken while the
    /// budget strictly exceeds a tick, so a budget of exactly one tick waits for the next frame.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.budget += elapsed.min(MAX_FRAME_TIME);

        let mut ticks = 0;
        while self.budget > self.tick {
            self.budget -= self.tick;
            ticks += 1;
        }

        ticks
    }

    /// Drops any accumulated time.
    pub fn reset(&mut self) {
        self.budget = Duration::ZERO;
    }
}
