//! Transition.

/// A single environment step `(s_t, a_t, r_t, s_t+1, terminal_t)`.
///
/// Transitions are immutable once stored in a replay buffer. `S` and `A` are
/// opaque to the buffer; the agent decides how to turn them into tensors.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<S, A> {
    /// State before the step.
    pub state: S,

    /// Action taken.
    pub action: A,

    /// Reward of the step.
    pub reward: f32,

    /// State after the step.
    pub next_state: S,

    /// Whether `next_state` is terminal. Bootstrapping stops here.
    pub is_terminated: bool,
}

impl<S, A> Transition<S, A> {
    /// Constructs a transition.
    pub fn new(state: S, action: A, reward: f32, next_state: S, is_terminated: bool) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            is_terminated,
        }
    }
}
