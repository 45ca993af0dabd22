//! Environment.
use anyhow::Result;

/// Represents an environment with a discrete action space.
pub trait Env {
    /// Observation of the environment.
    type Obs: Clone;

    /// Number of actions.
    fn action_dim(&self) -> usize;

    /// Starts a new episode and returns its initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    fn step(&mut self, act: usize) -> Result<Step<Self::Obs>>;
}

/// Observation, reward and episode flags emitted by [`Env::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct Step<O> {
    /// Observation after the step.
    pub obs: O,

    /// Reward.
    pub reward: f32,

    /// The episode reached a terminal state.
    pub is_terminated: bool,

    /// The episode was cut by the environment without reaching a terminal state.
    pub is_truncated: bool,
}

impl<O> Step<O> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: O, reward: f32, is_terminated: bool, is_truncated: bool) -> Self {
        Self {
            obs,
            reward,
            is_terminated,
            is_truncated,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}
