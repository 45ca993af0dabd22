//! Replay buffer with optional prioritized sampling.
mod sum_tree;
use super::{PerConfig, ReplayBufferConfig, TransitionBatch, TransitionStore};
use crate::{error::ReplayError, Transition};
use log::{info, trace};
use rand::{rngs::StdRng, SeedableRng};
pub use sum_tree::{SumTree, WeightNormalizer};

fn build_sum_tree(capacity: usize, per_config: &PerConfig) -> SumTree {
    SumTree::new(
        capacity,
        per_config.alpha,
        per_config.eps,
        per_config.normalize,
    )
}

/// A replay buffer of transitions `(s, a, r, s', terminal)`.
///
/// Sampling is uniform with replacement unless the buffer was built with a
/// [`PerConfig`], in which case every stored slot carries a priority in a
/// [`SumTree`] and batches come with sampling probabilities and importance
/// weights.
pub struct ReplayBuffer<S, A> {
    store: TransitionStore<S, A>,

    /// Random number generator for sampling.
    rng: StdRng,

    /// Priority index, if prioritized replay is enabled.
    sum_tree: Option<SumTree>,
}

impl<S, A> ReplayBuffer<S, A>
where
    S: Clone,
    A: Clone,
{
    /// Creates a replay buffer with the given configuration.
    pub fn build(config: &ReplayBufferConfig) -> Self {
        let capacity = config.capacity;
        let sum_tree = config
            .per_config
            .as_ref()
            .map(|per_config| build_sum_tree(capacity, per_config));
        info!(
            "Construct replay buffer with capacity = {}, prioritized = {}",
            capacity,
            sum_tree.is_some()
        );

        Self {
            store: TransitionStore::new(capacity),
            rng: StdRng::seed_from_u64(config.seed),
            sum_tree,
        }
    }

    /// Adds a transition, overwriting the oldest one if the buffer is full.
    ///
    /// Returns the slot the transition was written to. In a prioritized buffer
    /// the slot gets the maximum priority seen so far; a slot the priority index
    /// cannot hold is reported as [`ReplayError::IndexOutOfRange`].
    pub fn push(&mut self, tr: Transition<S, A>) -> Result<usize, ReplayError> {
        let ix = self.store.add(tr);
        if let Some(sum_tree) = &mut self.sum_tree {
            sum_tree.insert(ix, None)?;
        }
        Ok(ix)
    }

    /// Returns the current number of transitions in the buffer.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Returns `true` if the buffer samples by priority.
    pub fn is_prioritized(&self) -> bool {
        self.sum_tree.is_some()
    }

    /// Returns the transition in slot `ix`.
    pub fn get(&self, ix: usize) -> Option<&Transition<S, A>> {
        self.store.get(ix)
    }

    /// Iterates over stored transitions in slot order.
    pub fn iter_slots(&self) -> impl Iterator<Item = &Transition<S, A>> {
        self.store.iter_slots()
    }

    /// Priority of slot `ix`, `None` for a uniform buffer or an empty slot.
    pub fn priority(&self, ix: usize) -> Option<f32> {
        self.sum_tree.as_ref().and_then(|t| t.priority(ix))
    }

    /// Sum of all priorities, `None` for a uniform buffer.
    pub fn total_priority(&self) -> Option<f32> {
        self.sum_tree.as_ref().map(|t| t.total())
    }

    /// Samples a batch of transitions.
    ///
    /// `beta` is the importance-sampling exponent for the current learning
    /// step; it is ignored by a uniform buffer.
    ///
    /// Fails with [`ReplayError::InsufficientData`] if fewer than `size`
    /// transitions are stored.
    pub fn batch(&mut self, size: usize, beta: f32) -> Result<TransitionBatch<S, A>, ReplayError> {
        match &self.sum_tree {
            None => {
                let ixs = self.store.sample_uniform(size, &mut self.rng)?;
                Ok(TransitionBatch {
                    transitions: self.store.gather(&ixs),
                    ix_sample: None,
                    prob: None,
                    weight: None,
                })
            }
            Some(sum_tree) => {
                let (ixs, prob) = sum_tree.sample(size, &mut self.rng)?;
                let weight = sum_tree.weights(&ixs, &prob, beta)?;
                trace!("Sampled slots {:?} with weights {:?}", ixs, weight);
                Ok(TransitionBatch {
                    transitions: self.store.gather(&ixs),
                    ix_sample: Some(ixs),
                    prob: Some(prob),
                    weight: Some(weight),
                })
            }
        }
    }

    /// Updates priorities of sampled slots from their TD errors.
    ///
    /// Every index is checked before any priority changes. Does nothing for a
    /// uniform buffer.
    pub fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<(), ReplayError> {
        let sum_tree = match &mut self.sum_tree {
            None => return Ok(()),
            Some(sum_tree) => sum_tree,
        };
        if ixs.len() != td_errs.len() {
            return Err(ReplayError::LengthMismatch {
                n_ixs: ixs.len(),
                n_td_errs: td_errs.len(),
            });
        }
        for &ix in ixs.iter() {
            sum_tree.check_index(ix)?;
        }
        for (&ix, &td_err) in ixs.iter().zip(td_errs.iter()) {
            sum_tree.update(ix, td_err)?;
        }
        Ok(())
    }
}
