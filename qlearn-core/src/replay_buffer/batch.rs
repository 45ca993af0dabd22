//! Batch of transitions sampled from a replay buffer.
use crate::Transition;

/// Transitions sampled from a replay buffer.
///
/// `ix_sample`, `prob` and `weight` are present only for batches drawn by the
/// prioritized sampler. `ix_sample` must be handed back to
/// [`ReplayBuffer::update_priority`](super::ReplayBuffer::update_priority)
/// together with the TD errors of the same batch.
#[derive(Debug, Clone)]
pub struct TransitionBatch<S, A> {
    /// Sampled transitions, in sampling order.
    pub transitions: Vec<Transition<S, A>>,

    /// Slot indices of the sampled transitions.
    pub ix_sample: Option<Vec<usize>>,

    /// Sampling probabilities `p_i / total_priority`.
    pub prob: Option<Vec<f32>>,

    /// Normalized importance-sampling weights.
    pub weight: Option<Vec<f32>>,
}

impl<S, A> TransitionBatch<S, A> {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Returns the rewards.
    pub fn reward(&self) -> Vec<f32> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    /// Returns termination flags as `0`/`1`.
    pub fn is_terminated(&self) -> Vec<i8> {
        self.transitions
            .iter()
            .map(|t| t.is_terminated as i8)
            .collect()
    }

    /// Decomposes the batch into its columns.
    ///
    /// Returns states, actions, next states, rewards, termination flags,
    /// slot indices and importance weights.
    #[allow(clippy::type_complexity)]
    pub fn unpack(
        self,
    ) -> (
        Vec<S>,
        Vec<A>,
        Vec<S>,
        Vec<f32>,
        Vec<i8>,
        Option<Vec<usize>>,
        Option<Vec<f32>>,
    ) {
        let n = self.transitions.len();
        let mut state = Vec::with_capacity(n);
        let mut action = Vec::with_capacity(n);
        let mut next_state = Vec::with_capacity(n);
        let mut reward = Vec::with_capacity(n);
        let mut is_terminated = Vec::with_capacity(n);

        for t in self.transitions.into_iter() {
            state.push(t.state);
            action.push(t.action);
            next_state.push(t.next_state);
            reward.push(t.reward);
            is_terminated.push(t.is_terminated as i8);
        }

        (
            state,
            action,
            next_state,
            reward,
            is_terminated,
            self.ix_sample,
            self.weight,
        )
    }
}
