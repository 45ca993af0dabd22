//! Exploration rate schedule.
use serde::{Deserialize, Serialize};

/// Configuration of [`EpsilonSchedule`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonConfig {
    /// Exploration rate of the first episode.
    pub init: f64,

    /// Multiplicative decay applied after every episode.
    pub decay: f64,

    /// Lower bound of the exploration rate.
    pub min: f64,
}

impl Default for EpsilonConfig {
    fn default() -> Self {
        Self {
            init: 1.0,
            decay: 0.995,
            min: 0.01,
        }
    }
}

/// Per-episode multiplicative decay of the exploration rate,
/// `eps <- max(min, eps * decay)`.
#[derive(Debug, Clone)]
pub struct EpsilonSchedule {
    eps: f64,
    decay: f64,
    min: f64,
}

impl EpsilonSchedule {
    /// Creates a schedule starting at `config.init`.
    pub fn new(config: &EpsilonConfig) -> Self {
        Self {
            eps: config.init.max(config.min),
            decay: config.decay,
            min: config.min,
        }
    }

    /// Current exploration rate.
    pub fn value(&self) -> f64 {
        self.eps
    }

    /// Decays the exploration rate at the end of an episode.
    pub fn decay(&mut self) -> f64 {
        self.eps = (self.eps * self.decay).max(self.min);
        self.eps
    }
}
