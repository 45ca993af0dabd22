//! Scheduling the exponent of importance weight for PER.
use serde::{Deserialize, Serialize};

/// Scheduler of the exponent of importance weight for PER.
///
/// `beta` grows linearly from `beta_0` to `beta_final` over `n_learns_final`
/// learning updates and stays there.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct IwScheduler {
    /// Initial value of $\beta$.
    pub beta_0: f32,

    /// Final value of $\beta$.
    pub beta_final: f32,

    /// Learning updates when beta reaches its final value.
    pub n_learns_final: usize,

    /// Current learning updates.
    pub n_learns: usize,
}

impl IwScheduler {
    /// Creates a scheduler.
    pub fn new(beta_0: f32, beta_final: f32, n_learns_final: usize) -> Self {
        Self {
            beta_0,
            beta_final,
            n_learns_final,
            n_learns: 0,
        }
    }

    /// Gets the exponent of importance sampling weight.
    pub fn beta(&self) -> f32 {
        let n_learns = self.n_learns;
        if n_learns >= self.n_learns_final {
            self.beta_final
        } else {
            let d = self.beta_final - self.beta_0;
            self.beta_0 + d * (n_learns as f32 / self.n_learns_final as f32)
        }
    }

    /// Counts a learning update.
    pub fn add_n_learns(&mut self) {
        self.n_learns += 1;
    }
}
