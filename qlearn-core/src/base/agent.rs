//! Agent.
use anyhow::Result;
use std::path::Path;

/// A value-learning agent acting on states of type `S` with discrete actions.
///
/// The agent owns its replay buffer and both parameter sets (online and target).
/// A call to [`Agent::step`] completes ingestion and, when scheduled, one learning
/// update before returning.
pub trait Agent<S> {
    /// Selects an action for `state`.
    ///
    /// With probability `epsilon` a uniformly random action in `[0, action_dim)`
    /// is returned, otherwise the greedy action of the online network.
    fn act(&mut self, state: &S, epsilon: f64) -> Result<usize>;

    /// Ingests a transition and learns if the schedule says so.
    ///
    /// Returns `Some(loss)` when a learning update happened and `None` otherwise.
    fn step(
        &mut self,
        state: S,
        action: usize,
        reward: f32,
        next_state: S,
        is_terminated: bool,
    ) -> Result<Option<f32>>;

    /// Sets the importance-sampling exponent used by subsequent learning updates.
    ///
    /// Agents without prioritized replay ignore it.
    fn set_beta(&mut self, beta: f32);

    /// Saves the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
