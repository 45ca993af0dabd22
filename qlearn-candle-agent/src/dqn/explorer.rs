//! Exploration strategy of DQN.
use anyhow::Result;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Epsilon-greedy explorer for DQN.
///
/// The exploration rate is given on every call; its schedule is owned by the
/// caller.
pub struct EpsilonGreedy {
    n_actions: usize,
    rng: SmallRng,
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new(n_actions: usize, seed: u64) -> Self {
        Self {
            n_actions,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Takes an action.
    ///
    /// With probability `eps` a uniformly random action is returned and `greedy`
    /// is not evaluated. Otherwise the result of `greedy` is returned.
    pub fn action<F>(&mut self, eps: f64, greedy: F) -> Result<usize>
    where
        F: FnOnce() -> Result<usize>,
    {
        if self.rng.gen::<f64>() < eps {
            Ok(self.rng.gen_range(0..self.n_actions))
        } else {
            greedy()
        }
    }
}
