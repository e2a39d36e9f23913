//! Day/night cycle, counted in room ticks.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Day,
    Night,
}

impl Phase {
    pub fn toggled(self) -> Self {
        match self {
            Phase::Day => Phase::Night,
            Phase::Night => Phase::Day,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Day => "day",
            Phase::Night => "night",
        })
    }
}

/// Flips the phase every `ticks_per_phase` ticks. A length of zero
/// freezes the cycle.
#[derive(Debug, Clone)]
pub struct PhaseClock {
    phase: Phase,
    started_at: u64,
    ticks_per_phase: u64,
}

impl PhaseClock {
    pub fn new(ticks_per_phase: u64) -> Self {
        Self {
            phase: Phase::Day,
            started_at: 0,
            ticks_per_phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Tick at which the current phase began.
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn ticks_per_phase(&self) -> u64 {
        self.ticks_per_phase
    }

    /// Moves the clock to `tick`, returning the new phase if it flipped.
    pub fn advance(&mut self, tick: u64) -> Option<Phase> {
        if self.ticks_per_phase == 0 {
            return None;
        }
        if tick.saturating_sub(self.started_at) < self.ticks_per_phase {
            return None;
        }
        self.set(self.phase.toggled(), tick);
        Some(self.phase)
    }

    pub(crate) fn set(&mut self, phase: Phase, tick: u64) {
        self.phase = phase;
        self.started_at = tick;
    }
}
