//! Monotonic time sources
//!
//! AI timers read time only through [`Clock`], so a run is replayable from a
//! seed and an input log.

use serde::{Deserialize, Serialize};

use crate::consts::MS_PER_TICK;

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Clock derived from the simulation tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedStepClock {
    pub ticks: u64,
    pub ms_per_tick: u64,
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(MS_PER_TICK)
    }
}

impl FixedStepClock {
    pub fn new(ms_per_tick: u64) -> Self {
        Self {
            ticks: 0,
            ms_per_tick,
        }
    }

    /// Advance by one simulation tick
    pub fn step(&mut self) {
        self.ticks += 1;
    }
}

impl Clock for FixedStepClock {
    fn now_ms(&self) -> u64 {
        self.ticks * self.ms_per_tick
    }
}

/// Hand-driven clock for tests and tools
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn at(now: u64) -> Self {
        Self { now }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }

    /// Jump forward to `now`; never moves backwards
    pub fn set(&mut self, now: u64) {
        self.now = self.now.max(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}
